//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use rulestream_core::RuleError;
use rulestream_telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::auth::AuthError;
use crate::state::AppState;
use crate::store::StoreError;

pub async fn health() -> &'static str {
    "OK"
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound("Metrics are disabled".to_string()))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
    pub active_sessions: u64,
    pub rule_error_rate: f64,
    pub rules: usize,
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let counters = state.metrics.snapshot();
    Json(StatsResponse {
        active_sessions: counters.active_sessions(),
        rule_error_rate: counters.rule_error_rate(),
        rules: state.store.len(),
        counters,
    })
}

#[derive(Debug, Deserialize)]
pub struct EvalRequest {
    pub rule: String,
    #[serde(rename = "str")]
    pub subject: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvalResponse {
    pub rule: String,
    pub result: bool,
}

/// Evaluate a single rule against a single subject
pub async fn eval(
    State(state): State<AppState>,
    payload: Result<Json<EvalRequest>, JsonRejection>,
) -> Result<Json<EvalResponse>, AppError> {
    let Json(req) = payload?;
    match rulestream_dsl::evaluate(&req.rule, &req.subject) {
        Ok(result) => {
            state.metrics.record_evaluations(1, 0);
            debug!("Evaluated '{}' => {}", req.rule, result);
            Ok(Json(EvalResponse {
                rule: req.rule,
                result,
            }))
        }
        Err(e) => {
            state.metrics.record_evaluations(1, 1);
            Err(e.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RuleRequest {
    #[serde(rename = "ruleName")]
    pub rule_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRuleRequest {
    #[serde(rename = "ruleName")]
    pub rule_name: String,
    #[serde(rename = "updatedRule")]
    pub updated_rule: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleResponse {
    pub message: String,
    pub rule: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRuleResponse {
    pub message: String,
    #[serde(rename = "deletedRule")]
    pub deleted_rule: String,
}

/// Reject requests without a valid admin bearer token
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(e) = state.gate.authorize(request.headers()) {
        warn!("Rejected admin request to {}: {}", request.uri().path(), e);
        return Err(e.into());
    }
    Ok(next.run(request).await)
}

pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.store.list())
}

pub async fn create_rule(
    State(state): State<AppState>,
    payload: Result<Json<RuleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RuleResponse>), AppError> {
    let Json(req) = payload?;
    state.store.create(&req.rule_name)?;
    let rule = req.rule_name.trim().to_string();
    info!("Rule created: {}", rule);

    Ok((
        StatusCode::CREATED,
        Json(RuleResponse {
            message: "Rule created".to_string(),
            rule,
        }),
    ))
}

pub async fn update_rule(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRuleRequest>, JsonRejection>,
) -> Result<Json<RuleResponse>, AppError> {
    let Json(req) = payload?;
    state.store.update(&req.rule_name, &req.updated_rule)?;
    let rule = req.updated_rule.trim().to_string();
    info!("Rule updated: {} -> {}", req.rule_name.trim(), rule);

    Ok(Json(RuleResponse {
        message: "Rule updated".to_string(),
        rule,
    }))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    payload: Result<Json<RuleRequest>, JsonRejection>,
) -> Result<Json<DeleteRuleResponse>, AppError> {
    let Json(req) = payload?;
    let deleted_rule = state.store.delete(&req.rule_name)?;
    info!("Rule deleted: {}", deleted_rule);

    Ok(Json(DeleteRuleResponse {
        message: "Rule deleted".to_string(),
        deleted_rule,
    }))
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request body could not be read or decoded
    InvalidRequest(StatusCode, String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    InvalidRule(String),
    Internal(String),
}

impl From<RuleError> for AppError {
    fn from(err: RuleError) -> Self {
        AppError::InvalidRule(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::RuleExists(_) => AppError::Conflict(message),
            StoreError::RuleNotFound(_) => AppError::NotFound(message),
            StoreError::InvalidRule(e) => e.into(),
            StoreError::Io(_) | StoreError::Parse(_) => AppError::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::InvalidRequest(status, msg) => (status, "invalid_request_error", msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "authentication_error", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found_error", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict_error", msg),
            AppError::InvalidRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_rule_error", msg)
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status_codes() {
        let cases = [
            (StoreError::RuleExists("r".into()), StatusCode::CONFLICT),
            (StoreError::RuleNotFound("r".into()), StatusCode::NOT_FOUND),
            (
                StoreError::InvalidRule(RuleError::UnknownFunction("foo".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        let response = AppError::from(AuthError::InvalidToken).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_eval_request_field_names() {
        let req: EvalRequest =
            serde_json::from_str(r#"{"rule": "sum() > 4", "str": "banana"}"#).unwrap();
        assert_eq!(req.subject, "banana");

        let update: UpdateRuleRequest =
            serde_json::from_str(r#"{"ruleName": "a", "updatedRule": "b"}"#).unwrap();
        assert_eq!(update.updated_rule, "b");
    }
}
