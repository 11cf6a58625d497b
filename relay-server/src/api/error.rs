use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use ea_bridge_protocol::ProtocolError;

const ERROR_TYPE_BASE: &str = "https://ea-signal-bridge.example.com/errors";

/// RFC 9457 Problem Details
/// https://www.rfc-editor.org/rfc/rfc9457.html
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short summary; the status code's canonical reason
    pub title: String,

    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    fn for_status(kind: &str, status: StatusCode, fallback_title: &str) -> Self {
        Self::new(
            format!("{}/{}", ERROR_TYPE_BASE, kind),
            status.canonical_reason().unwrap_or(fallback_title),
            status,
        )
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// No `X-API-Key` header (401)
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::for_status("unauthorized", StatusCode::UNAUTHORIZED, "Unauthorized")
            .with_detail(detail)
    }

    /// Key presented but not accepted (403)
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::for_status("forbidden", StatusCode::FORBIDDEN, "Forbidden").with_detail(detail)
    }

    /// Body, envelope or query failed validation (422)
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::for_status(
            "validation",
            StatusCode::UNPROCESSABLE_ENTITY,
            "Unprocessable Entity",
        )
        .with_detail(detail)
    }

    /// Server cannot authenticate anyone, e.g. no API keys configured (500)
    pub fn misconfigured(detail: impl Into<String>) -> Self {
        Self::for_status(
            "misconfigured",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .with_detail(detail)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::for_status("not-found", StatusCode::NOT_FOUND, "Not Found")
            .with_detail(format!("{} not found", resource.into()))
    }
}

impl From<ProtocolError> for ProblemDetails {
    fn from(err: ProtocolError) -> Self {
        Self::unprocessable(err.to_string())
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(self)).into_response();

        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("ApiKey"));
        }

        response
    }
}

pub type ApiResult<T> = Result<T, ProblemDetails>;
