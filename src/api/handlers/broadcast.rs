use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use tracing::info;

use crate::api::{dashboard::render_dashboard, state::AppState, types::*};
use crate::error::MaestroError;

const BROADCAST_NOTE: &str =
    "Dispatched to all agents. Replies show up here once each agent calls back.";

/// A prompt submitted either as JSON or from the dashboard's HTML form
pub enum PromptSubmission {
    Json(PromptRequest),
    Form(PromptRequest),
}

#[async_trait]
impl<S> FromRequest<S> for PromptSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(body) = Form::<PromptRequest>::from_request(req, state)
                .await
                .map_err(|e| api_error(MaestroError::InvalidPayload(e.body_text())))?;
            Ok(Self::Form(body))
        } else {
            let Json(body) = Json::<PromptRequest>::from_request(req, state)
                .await
                .map_err(|e| api_error(MaestroError::InvalidPayload(e.body_text())))?;
            Ok(Self::Json(body))
        }
    }
}

/// POST /send_prompt -- send to every agent and wait for their immediate replies
pub async fn send_prompt(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PromptRequest>, JsonRejection>,
) -> ApiResult<Json<SendPromptResponse>> {
    let Json(request) =
        payload.map_err(|e| api_error(MaestroError::InvalidPayload(e.body_text())))?;
    let command = request.validate(&state.chains).map_err(api_error)?;

    let report = state
        .dispatcher
        .broadcast(&command.prompt, command.chain)
        .await;
    info!(
        broadcast_id = %report.broadcast_id,
        delivered = report.delivered(),
        failed = report.failed(),
        "Prompt sent to agents"
    );

    Ok(Json(SendPromptResponse::from(report)))
}

/// POST /broadcast -- dispatch in the background and acknowledge right away
pub async fn broadcast(
    State(state): State<AppState>,
    submission: PromptSubmission,
) -> ApiResult<Response> {
    let (request, from_form) = match submission {
        PromptSubmission::Json(r) => (r, false),
        PromptSubmission::Form(r) => (r, true),
    };
    let command = request.validate(&state.chains).map_err(api_error)?;

    state
        .store
        .record_broadcast(&command.prompt, BROADCAST_NOTE)
        .await;
    let (broadcast_id, _task) = state
        .dispatcher
        .spawn_broadcast(&command.prompt, command.chain);

    if from_form {
        let snapshot = state.store.snapshot().await;
        let page = render_dashboard(
            state.roster(),
            &snapshot,
            &state.chains,
            Some("Command broadcast successfully! Replies appear as agents call back."),
        );
        return Ok(Html(page).into_response());
    }

    Ok(Json(BroadcastAck {
        status: "dispatched".to_string(),
        broadcast_id,
        agents: state.roster().ids(),
        note: BROADCAST_NOTE.to_string(),
    })
    .into_response())
}
