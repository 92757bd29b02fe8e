//! Request handling: the single `POST /v1/filter` route.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::IntoResponse,
    response::Response,
    Json,
};
use filterer_core::Error;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Clone, Debug, Deserialize)]
pub struct FilterRequest {
    pub field_set: String,
    pub expr: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FilterResponse {
    #[serde(rename = "where")]
    pub where_clause: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// `Json<T>` that reports a malformed body as this crate's `ErrorResponse`
/// shape instead of Axum's default plaintext rejection.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!(error = %rejection, "malformed request body");
                Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_json",
                    rejection.to_string(),
                ))
            }
        }
    }
}

/// Compile a filter expression against a configured field set.
pub async fn filter(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<FilterRequest>,
) -> Response {
    let Some(schema) = state.schema(&request.field_set) else {
        warn!(field_set = %request.field_set, "unknown field set");
        return error_response(
            StatusCode::BAD_REQUEST,
            "unknown_field_set",
            format!("unknown field set: {}", request.field_set),
        );
    };

    match filterer_core::compile(&request.expr, schema) {
        Ok((clause, args)) => {
            info!(field_set = %request.field_set, "compiled filter");
            let body = FilterResponse {
                where_clause: format!("WHERE: {clause}, ARGS: {args:?}"),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            warn!(error = %err, "filter compile failed");
            error_response(status_code(&err), error_kind(&err), err.to_string())
        }
    }
}

fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: kind.to_string(),
            message,
        }),
    )
        .into_response()
}

/// Map a core error to a transport status. This mapping deliberately lives
/// here, not in `filterer-core`, the same way the teacher keeps
/// `Error::status_code` out of its SQL/plan crates.
fn status_code(err: &Error) -> StatusCode {
    match err {
        Error::ParseError(_)
        | Error::DepthExceeded { .. }
        | Error::UnsupportedExpression(_)
        | Error::UnsupportedOperation { .. }
        | Error::UnsupportedNestedMultiArg
        | Error::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
        Error::UnknownFieldType(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::ParseError(_) => "parse_error",
        Error::DepthExceeded { .. } => "depth_exceeded",
        Error::UnsupportedExpression(_) => "unsupported_expression",
        Error::UnsupportedOperation { .. } => "unsupported_operation",
        Error::UnsupportedNestedMultiArg => "unsupported_nested_multi_arg",
        Error::InvalidTimestamp(_) => "invalid_timestamp",
        Error::UnknownFieldType(_) => "unknown_field_type",
    }
}
