use std::sync::Arc;

use axum::{ routing::{ get, post }, Router };

pub mod alerts;

use crate::services::AlertRuleService;

#[derive(Clone)]
pub struct AppState {
    pub alert_rule_service: Arc<AlertRuleService>,
}

impl AppState {
    pub fn new(alert_rule_service: Arc<AlertRuleService>) -> Self {
        Self { alert_rule_service }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/alerts/rules", get(alerts::list_rules).post(alerts::create_rule))
        .route(
            "/api/alerts/rules/{id}",
            get(alerts::get_rule).patch(alerts::toggle_rule).delete(alerts::delete_rule)
        )
        .route("/api/alerts/parse", post(alerts::parse_rule))
        .route("/api/alerts/events", get(alerts::list_events))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
