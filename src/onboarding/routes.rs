//! REST endpoints for onboarding status and the current user profile.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::context::SessionContext;
use super::controller::WorkflowSnapshot;
use super::session::OnboardingSession;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub session: Arc<OnboardingSession>,
    pub context: SessionContext,
}

/// Onboarding status returned by the REST endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub onboarding_completed: bool,
    #[serde(flatten)]
    pub workflow: WorkflowSnapshot,
}

/// GET /api/onboarding/status
///
/// Returns the current stage, countdown, and last error. Never includes the
/// passcode.
async fn get_status(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let workflow = state.session.snapshot().await;
    Json(OnboardingStatus {
        onboarding_completed: state.context.is_onboarded().await,
        workflow,
    })
}

/// GET /api/onboarding/profile
///
/// Returns the published user profile, or 404 before onboarding completes.
async fn get_profile(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let profile = state.context.current().await;
    if profile.is_complete() {
        Json(profile).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No profile exists yet"})),
        )
            .into_response()
    }
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/profile", get(get_profile))
        .with_state(state)
}
