use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::error::RelayError;
use crate::relay;
use crate::web::models::ChatRequest;
use crate::AppState;

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat relay endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, RelayError> {
    let response = relay::handle(&data.upstream, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

// Malformed or mistyped bodies are reported like field violations (422), not as 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| RelayError::from_payload(&err).into())
}
