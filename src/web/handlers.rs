use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::relay::AdviceRelay;
use crate::web::models::{AskRequest, AskResponse, ErrorDetail};

pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({ "ok": true, "message": "API ready" }))
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Relays the transcript and always answers 200 with either the model's
/// reply or a warning string; only malformed input is refused.
pub async fn ask(relay: web::Data<AdviceRelay>, req: web::Json<AskRequest>) -> impl Responder {
    let request_id = Uuid::new_v4();

    if let Err(detail) = req.validate() {
        warn!("Ask request {} rejected: {}", request_id, detail);
        return HttpResponse::UnprocessableEntity().json(ErrorDetail { detail });
    }

    info!("Ask request {}: {} messages", request_id, req.messages.len());
    let answer = relay.get_advice(&req.messages).await;
    info!("Ask request {} answered ({} characters)", request_id, answer.len());

    HttpResponse::Ok().json(AskResponse { answer })
}

/// Unparseable or mistyped bodies become 422 with a `detail` field.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let detail = err.to_string();
    warn!("Rejected request body: {}", detail);
    let response = HttpResponse::UnprocessableEntity().json(ErrorDetail { detail });
    InternalError::from_response(err, response).into()
}
