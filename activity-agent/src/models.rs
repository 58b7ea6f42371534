use serde::{Deserialize, Serialize};

// API Request/Response models
#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    #[serde(default)]
    pub city: String,
}

/// Payload of `GET /get-activity`. `plan` and `error` are mutually exclusive,
/// which is why the fields are private and only the two constructors exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    city: String,
    greeting: Option<String>,
    plan: Option<String>,
    error: Option<String>,
}

impl PlanResponse {
    pub fn planned(city: impl Into<String>, greeting: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            greeting: Some(greeting.into()),
            plan: Some(plan.into()),
            error: None,
        }
    }

    pub fn failed(city: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            greeting: None,
            plan: None,
            error: Some(error.into()),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_deref()
    }

    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// Agent communication models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The model produced a final answer.
    Success(String),
    /// The loop stopped without a final answer; carries a diagnostic dump.
    Empty(String),
    /// The run could not complete.
    Failure(String),
}

impl AgentOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AgentOutcome::Success(_) => "success",
            AgentOutcome::Empty(_) => "empty",
            AgentOutcome::Failure(_) => "failure",
        }
    }
}
