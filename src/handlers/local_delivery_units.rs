use axum::{extract::State, Extension, Json};

use crate::auth::{AuthContext, VIEW_PROBATION_TEAMS};
use crate::error::ApiError;

use super::{AppState, LocalDeliveryUnitDto};

/// GET /local-delivery-units - every LDU with its teams
pub async fn get_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<LocalDeliveryUnitDto>>, ApiError> {
    if !auth.has_role(VIEW_PROBATION_TEAMS) {
        return Err(ApiError::Forbidden);
    }

    let ldus = state.service.local_delivery_units().await?;
    Ok(Json(ldus.into_iter().map(LocalDeliveryUnitDto::from).collect()))
}
