//! Fallback handler: every request not served by a fixed route goes through the router.

use crate::error::AppError;
use crate::extractors::HttpRequest;
use crate::response::ResponsePayload;
use crate::state::AppState;
use axum::extract::State;

pub async fn dispatch(
    State(state): State<AppState>,
    HttpRequest(request): HttpRequest,
) -> Result<ResponsePayload, AppError> {
    state.app.handle(request).await
}
