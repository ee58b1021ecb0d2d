use actix_web::http::{header, Method};
use actix_web::{middleware, web, HttpRequest, HttpResponse};
use anyhow::Context;
use futures_util::StreamExt;

use crate::dispatch::Mailer;
use crate::models::{EmailRequest, ErrorResponse};

pub const SEND_EMAIL_PATH: &str = "/send-email";

const MISSING_FIELDS: &str = "Missing required fields: to and message are required";

pub struct AppState {
    pub mailer: Mailer,
    pub default_subject: String,
    pub dev_mode: bool,
}

/// CORS headers attached to every response.
pub fn cors() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Request-Method", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

/// Every request goes through [`relay`], which does its own method and
/// route checks so a wrong method answers 405 before a wrong path answers
/// 404.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.default_service(web::to(relay));
}

pub async fn relay(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    if *req.method() == Method::OPTIONS {
        return HttpResponse::Ok().finish();
    }

    if *req.method() != Method::POST {
        log::warn!("Rejected {} {}: method not allowed", req.method(), req.path());
        return HttpResponse::MethodNotAllowed().json(ErrorResponse::new("Method not allowed"));
    }

    if req.path() != SEND_EMAIL_PATH {
        log::warn!("Rejected POST {}: not found", req.path());
        return HttpResponse::NotFound().json(ErrorResponse::new("Not found"));
    }

    match send_email(&req, payload, &state).await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Error processing request: {:#}", e);
            let details = state.dev_mode.then(|| format!("{e:#}"));
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Internal server error").with_details(details))
        }
    }
}

/// Body handling for `POST /send-email`. Errors returned from here become
/// a 500.
async fn send_email(
    req: &HttpRequest,
    mut payload: web::Payload,
    state: &AppState,
) -> anyhow::Result<HttpResponse> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| anyhow::anyhow!("failed to read request body: {e}"))?;
        body.extend_from_slice(&chunk);
    }

    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if !is_json {
        log::warn!("Rejected POST {}: unsupported content type", SEND_EMAIL_PATH);
        return Ok(HttpResponse::UnsupportedMediaType()
            .json(ErrorResponse::new("Content-Type must be application/json")));
    }

    let body: serde_json::Value =
        serde_json::from_slice(&body).context("request body is not valid JSON")?;
    let request = EmailRequest::from_value(&body)?;

    let Some(email) = request.validate(&state.default_subject) else {
        log::warn!("Rejected POST {}: missing required fields", SEND_EMAIL_PATH);
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(MISSING_FIELDS)));
    };

    let result = state
        .mailer
        .send_email(&email.to, &email.subject, &email.message)
        .await;

    Ok(HttpResponse::Ok().json(result))
}
