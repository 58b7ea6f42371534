use crate::agents::PlanningAgent;
use crate::config::Config;
use crate::metrics::Metrics;
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

const CITY_PLACEHOLDER: &str = "{city}";

/// Everything a request handler needs. Built once before the server starts
/// and shared read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    agent: Option<Arc<PlanningAgent>>,
    greeting_template: Arc<str>,
    metrics: Metrics,
}

impl AppState {
    pub fn new(agent: Option<PlanningAgent>, greeting_template: &str, metrics: Metrics) -> Self {
        Self {
            agent: agent.map(Arc::new),
            greeting_template: Arc::from(greeting_template),
            metrics,
        }
    }

    /// Builds the planner from configuration. A planner that cannot be built
    /// leaves the service running in a not-ready state.
    pub fn from_config(config: &Config) -> Result<Self> {
        let agent = match PlanningAgent::from_config(config) {
            Ok(agent) => {
                info!("Planner agent initialized");
                Some(agent)
            }
            Err(e) => {
                error!(
                    "Planner agent failed to initialize: {:#}. Endpoints will return 503 until this is fixed.",
                    e
                );
                None
            }
        };
        Ok(Self::new(agent, &config.greeting_template, Metrics::new()?))
    }

    pub fn agent(&self) -> Option<&PlanningAgent> {
        self.agent.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.agent.is_some()
    }

    pub fn greeting_for(&self, city: &str) -> String {
        self.greeting_template.replace(CITY_PLACEHOLDER, city)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
