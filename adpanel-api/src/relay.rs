//! Same-origin relay for the vMix control API
//!
//! Browsers cannot call vMix across origins, so the front end calls this
//! endpoint instead and the server makes the real request. Only a fixed
//! set of query parameters is forwarded: `ip`, `port`, and either
//! `getState` or `function`/`input`/`value`. The raw upstream body comes
//! back wrapped in a JSON envelope.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use adpanel_core::models::DEFAULT_VMIX_PORT;
use adpanel_core::vmix::is_valid_host;

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RelayParams {
    pub ip: Option<String>,
    pub port: Option<String>,
    #[serde(rename = "getState")]
    pub get_state: Option<String>,
    pub function: Option<String>,
    pub input: Option<String>,
    pub value: Option<String>,
}

/// Relay response envelope. `response` carries the raw vMix body.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub url: String,
    #[serde(rename = "httpCode", skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/relay", get(relay))
}

async fn relay(State(state): State<AppState>, Query(params): Query<RelayParams>) -> Response {
    let Some(ip) = params
        .ip
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return failure(
            StatusCode::BAD_REQUEST,
            "Missing required parameter: ip",
            String::new(),
        );
    };
    if !is_valid_host(ip) {
        return failure(
            StatusCode::BAD_REQUEST,
            "Invalid IP address format",
            String::new(),
        );
    }

    let port = clamp_port(params.port.as_deref());
    let get_state = params.get_state.is_some();
    let function = params
        .function
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if !get_state && function.is_none() {
        return failure(
            StatusCode::BAD_REQUEST,
            "Missing required parameter: function",
            String::new(),
        );
    }

    let url = match build_url(ip, port, get_state, function, &params) {
        Ok(url) => url,
        Err(message) => return failure(StatusCode::BAD_REQUEST, &message, String::new()),
    };

    match state.client.get_raw(&url).await {
        Ok((http_code, body)) => {
            // Whatever vMix answered is forwarded as-is; the caller
            // inspects the body and the upstream code.
            let envelope = RelayEnvelope {
                success: true,
                response: Some(body),
                error: None,
                url,
                http_code: Some(http_code),
            };
            (StatusCode::OK, Json(envelope)).into_response()
        }
        Err(e) => failure(
            StatusCode::BAD_GATEWAY,
            &format!("Connection failed: {e}"),
            url,
        ),
    }
}

fn build_url(
    ip: &str,
    port: u16,
    get_state: bool,
    function: Option<&str>,
    params: &RelayParams,
) -> Result<String, String> {
    let base = format!("http://{ip}:{port}/api/");
    let mut url = url::Url::parse(&base).map_err(|e| format!("Invalid target URL: {e}"))?;

    if !get_state {
        let mut pairs = url.query_pairs_mut();
        if let Some(function) = function {
            pairs.append_pair("Function", function);
        }
        if let Some(input) = params.input.as_deref().filter(|s| !s.is_empty()) {
            pairs.append_pair("Input", input);
        }
        if let Some(value) = params.value.as_deref().filter(|s| !s.is_empty()) {
            pairs.append_pair("Value", value);
        }
    }

    Ok(url.to_string())
}

/// Parse and clamp a port parameter, falling back to the vMix default.
fn clamp_port(raw: Option<&str>) -> u16 {
    match raw.map(str::trim).and_then(|s| s.parse::<u32>().ok()) {
        Some(port) if (1..=65535).contains(&port) => port as u16,
        _ => DEFAULT_VMIX_PORT,
    }
}

fn failure(status: StatusCode, message: &str, url: String) -> Response {
    let envelope = RelayEnvelope {
        success: false,
        response: None,
        error: Some(message.to_string()),
        url,
        http_code: None,
    };
    (status, Json(envelope)).into_response()
}
