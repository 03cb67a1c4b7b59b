use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenVerifier;
use crate::database::models::LocalDeliveryUnit;
use crate::middleware::auth::resolve_auth_context;
use crate::services::LocalDeliveryUnitService;

pub mod local_delivery_units;
pub mod probation_area_codes;
pub mod probation_areas;

#[derive(Clone)]
pub struct AppState {
    pub service: LocalDeliveryUnitService,
    pub verifier: Arc<TokenVerifier>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Reference data reads
        .route("/local-delivery-units", get(local_delivery_units::get_all))
        .route("/probation-area-codes", get(probation_area_codes::get_all))
        .route(
            "/probation-areas/:probationAreaCode",
            get(probation_areas::get_probation_area),
        )
        .route(
            "/probation-areas/:probationAreaCode/local-delivery-units/:localDeliveryUnitCode",
            get(probation_areas::get_local_delivery_unit),
        )
        // Mailbox writes
        .route(
            "/probation-areas/:probationAreaCode/local-delivery-units/:localDeliveryUnitCode/functional-mailbox",
            put(probation_areas::set_functional_mailbox)
                .delete(probation_areas::delete_functional_mailbox),
        )
        .route(
            "/probation-areas/:probationAreaCode/local-delivery-units/:localDeliveryUnitCode/teams/:teamCode/functional-mailbox",
            put(probation_areas::set_team_functional_mailbox)
                .delete(probation_areas::delete_team_functional_mailbox),
        )
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), resolve_auth_context))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "probation-teams-api",
        "version": version,
        "description": "Reference data API for probation team functional mailboxes",
        "endpoints": {
            "localDeliveryUnits": "/local-delivery-units",
            "probationAreaCodes": "/probation-area-codes",
            "probationArea": "/probation-areas/{probationAreaCode}",
            "localDeliveryUnit": "/probation-areas/{probationAreaCode}/local-delivery-units/{localDeliveryUnitCode}",
            "lduFunctionalMailbox": "/probation-areas/{probationAreaCode}/local-delivery-units/{localDeliveryUnitCode}/functional-mailbox",
            "teamFunctionalMailbox": "/probation-areas/{probationAreaCode}/local-delivery-units/{localDeliveryUnitCode}/teams/{teamCode}/functional-mailbox",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.service.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "error": e.to_string(),
            })),
        ),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbationTeamDto {
    pub functional_mailbox: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDeliveryUnitDto {
    pub probation_area_code: String,
    pub local_delivery_unit_code: String,
    pub functional_mailbox: Option<String>,
    pub probation_teams: BTreeMap<String, ProbationTeamDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbationAreaDto {
    pub probation_area_code: String,
    pub local_delivery_units: BTreeMap<String, LocalDeliveryUnitDto>,
}

impl From<LocalDeliveryUnit> for LocalDeliveryUnitDto {
    fn from(ldu: LocalDeliveryUnit) -> Self {
        Self {
            probation_area_code: ldu.probation_area_code,
            local_delivery_unit_code: ldu.local_delivery_unit_code,
            functional_mailbox: ldu.functional_mailbox,
            probation_teams: ldu
                .probation_teams
                .into_iter()
                .map(|(code, team)| {
                    (code, ProbationTeamDto { functional_mailbox: team.functional_mailbox })
                })
                .collect(),
        }
    }
}
