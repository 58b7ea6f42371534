pub mod planner;
pub mod prompt;

pub use planner::PlanningAgent;
pub use prompt::SystemPrompt;
