use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::services::{DeleteOutcome, SetOutcome};

use super::{AppState, LocalDeliveryUnitDto, ProbationAreaDto};

/// GET /probation-areas/:probationAreaCode
pub async fn get_probation_area(
    State(state): State<AppState>,
    Path(probation_area_code): Path<String>,
) -> Result<Json<ProbationAreaDto>, ApiError> {
    let ldus = state.service.probation_area(&probation_area_code).await?;

    let local_delivery_units = ldus
        .into_iter()
        .map(|ldu| (ldu.local_delivery_unit_code.clone(), LocalDeliveryUnitDto::from(ldu)))
        .collect();

    Ok(Json(ProbationAreaDto {
        probation_area_code,
        local_delivery_units,
    }))
}

/// GET /probation-areas/:probationAreaCode/local-delivery-units/:localDeliveryUnitCode
pub async fn get_local_delivery_unit(
    State(state): State<AppState>,
    Path((probation_area_code, local_delivery_unit_code)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let found = state
        .service
        .local_delivery_unit(&probation_area_code, &local_delivery_unit_code)
        .await?;

    Ok(match found {
        Some(ldu) => Json(LocalDeliveryUnitDto::from(ldu)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

/// PUT …/local-delivery-units/:localDeliveryUnitCode/functional-mailbox
///
/// The body is a bare JSON string holding the proposed address.
pub async fn set_functional_mailbox(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((probation_area_code, local_delivery_unit_code)): Path<(String, String)>,
    Json(proposed_functional_mailbox): Json<String>,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .service
        .set_functional_mailbox(
            &auth,
            &probation_area_code,
            &local_delivery_unit_code,
            &proposed_functional_mailbox,
        )
        .await?;

    Ok(set_outcome_status(outcome))
}

/// DELETE …/local-delivery-units/:localDeliveryUnitCode/functional-mailbox
pub async fn delete_functional_mailbox(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((probation_area_code, local_delivery_unit_code)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .service
        .delete_functional_mailbox(&auth, &probation_area_code, &local_delivery_unit_code)
        .await?;

    Ok(delete_outcome_status(outcome))
}

/// PUT …/teams/:teamCode/functional-mailbox
pub async fn set_team_functional_mailbox(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((probation_area_code, local_delivery_unit_code, team_code)): Path<(String, String, String)>,
    Json(proposed_functional_mailbox): Json<String>,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .service
        .set_team_functional_mailbox(
            &auth,
            &probation_area_code,
            &local_delivery_unit_code,
            &team_code,
            &proposed_functional_mailbox,
        )
        .await?;

    Ok(set_outcome_status(outcome))
}

/// DELETE …/teams/:teamCode/functional-mailbox
pub async fn delete_team_functional_mailbox(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((probation_area_code, local_delivery_unit_code, team_code)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .service
        .delete_team_functional_mailbox(
            &auth,
            &probation_area_code,
            &local_delivery_unit_code,
            &team_code,
        )
        .await?;

    Ok(delete_outcome_status(outcome))
}

fn set_outcome_status(outcome: SetOutcome) -> StatusCode {
    match outcome {
        SetOutcome::Created => StatusCode::CREATED,
        SetOutcome::Updated | SetOutcome::NoChange => StatusCode::NO_CONTENT,
    }
}

fn delete_outcome_status(outcome: DeleteOutcome) -> StatusCode {
    match outcome {
        DeleteOutcome::Deleted => StatusCode::NO_CONTENT,
        DeleteOutcome::NotFound => StatusCode::NOT_FOUND,
    }
}
