//! Tool listing and invocation over HTTP.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use stockpulse_tools::{definitions, ToolDefinition, ToolResponse};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

pub(super) async fn list_tools(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<ToolDefinition>>> {
    Json(ApiResponse {
        data: definitions(),
        meta: ResponseMeta::new(req_id.0),
    })
}

/// `POST /api/v1/tools/{name}`. The body is the argument object; an empty
/// body means no arguments.
pub(super) async fn invoke_tool(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<ToolResponse>>, ApiError> {
    let args = parse_body(&body).map_err(|e| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            format!("request body is not valid JSON: {e}"),
        )
    })?;

    match state.toolbox.invoke(&name, &args).await {
        ToolResponse::Failure { kind, reason } => Err(ApiError::new(req_id.0, kind, reason)),
        response => Ok(Json(ApiResponse {
            data: response,
            meta: ResponseMeta::new(req_id.0),
        })),
    }
}

fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body)
}
