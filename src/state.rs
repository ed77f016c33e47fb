use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config, coverage::CoverageTracker, gateway::ModelGateway, quiz::registry::SessionRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub gateway: ModelGateway,
    pub sessions: Arc<SessionRegistry>,
    pub coverage: Arc<CoverageTracker>,
    pub config: Config,
}

impl FromRef<AppState> for ModelGateway {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl FromRef<AppState> for Arc<SessionRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<CoverageTracker> {
    fn from_ref(state: &AppState) -> Self {
        state.coverage.clone()
    }
}

