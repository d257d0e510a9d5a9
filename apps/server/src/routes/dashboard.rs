use axum::extract::State;
use axum::Json;
use caja_core::report::Dashboard;
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::startup::AppState;

/// `GET /dashboard`, windows measured from the current UTC time.
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> ApiResult<Json<Dashboard>> {
    let report = state.db.reports().dashboard(Utc::now()).await?;
    Ok(Json(report))
}
