//! 课表查询处理器

use axum::{Json, extract::State};
use booking_engine::models::ClassSessionWithCount;
use tracing::instrument;

use crate::dto::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

/// 列出可预约的未来场次（公开接口）
#[instrument(skip(state))]
pub async fn list_classes(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ClassSessionWithCount>>>> {
    let sessions = state.query_service.list_upcoming_classes().await?;
    Ok(Json(ApiResponse::success(sessions)))
}
