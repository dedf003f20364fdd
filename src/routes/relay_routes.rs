use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use tracing::error;

use crate::errors::AppError;
use crate::models::ChatRequest;
use crate::service::relay_service::RelayService;

/// POST `/legal-chat` — relays `{ messages }` upstream and streams the reply
/// back as `text/event-stream`.
pub async fn legal_chat_handler(
    State(svc): State<RelayService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let api_key = svc.credential().map_err(|err| {
        error!("Error in legal-chat relay: {err}");
        err
    })?;

    let Json(request) = payload.map_err(|rejection| {
        error!("Rejected chat request: {}", rejection.body_text());
        AppError::from(rejection)
    })?;

    svc.relay(api_key, request.messages).await.map_err(|err| {
        error!("Error in legal-chat relay: {err}");
        err
    })
}
