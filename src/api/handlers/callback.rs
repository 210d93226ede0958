use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::info;

use crate::api::{state::AppState, types::*};
use crate::error::MaestroError;

/// POST /agent_callback (alias /agent_response)
///
/// Agents report their final reply here once they finish a prompt.
pub async fn agent_callback(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CallbackRequest>, JsonRejection>,
) -> ApiResult<Json<CallbackAck>> {
    let Json(request) =
        payload.map_err(|e| api_error(MaestroError::InvalidPayload(e.body_text())))?;
    let callback = request.validate().map_err(api_error)?;

    state
        .store
        .record_response(&callback.agent_id, &callback.prompt, &callback.response)
        .await
        .map_err(api_error)?;

    info!(agent_id = %callback.agent_id, "Recorded agent reply");

    Ok(Json(CallbackAck {
        status: "success".to_string(),
    }))
}
