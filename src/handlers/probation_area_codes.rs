use axum::{extract::State, Extension, Json};

use crate::auth::{AuthContext, VIEW_PROBATION_TEAMS};
use crate::error::ApiError;

use super::AppState;

/// GET /probation-area-codes - distinct area codes, sorted ascending
pub async fn get_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<String>>, ApiError> {
    if !auth.has_role(VIEW_PROBATION_TEAMS) {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(state.service.probation_area_codes().await?))
}
