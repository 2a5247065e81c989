//! Mapping of GitHub HTTP responses to platform errors.

use chrono::{DateTime, Duration, Utc};

use crate::http::{HttpError, HttpResponse};
use crate::platform::PlatformError;

use super::types::ApiErrorBody;

/// Fallback wait when a rate-limit response carries no reset hint.
const DEFAULT_RATE_LIMIT_WAIT_SECS: i64 = 60;

/// Whether a 403/429 response is a rate-limit signal rather than a permission error.
fn is_rate_limit_response(response: &HttpResponse) -> bool {
    if response.status != 403 && response.status != 429 {
        return false;
    }
    response.header("x-ratelimit-remaining") == Some("0")
        || response.header("retry-after").is_some()
}

/// When the rate limit window reopens, from `retry-after` or `x-ratelimit-reset`.
fn rate_limit_reset(response: &HttpResponse) -> DateTime<Utc> {
    if let Some(secs) = response
        .header("retry-after")
        .and_then(|v| v.trim().parse::<i64>().ok())
    {
        return Utc::now() + Duration::seconds(secs);
    }

    response
        .header("x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
        .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_RATE_LIMIT_WAIT_SECS))
}

fn error_body(response: &HttpResponse) -> Option<ApiErrorBody> {
    serde_json::from_slice(&response.body).ok()
}

fn error_message(response: &HttpResponse) -> String {
    error_body(response)
        .map(|b| b.message)
        .unwrap_or_else(|| response.text())
}

/// Turn a non-2xx response into a [`PlatformError`]; 2xx passes through.
///
/// `resource` names what was requested, for `NotFound` messages.
pub fn error_for_status(response: HttpResponse, resource: &str) -> Result<HttpResponse, PlatformError> {
    if response.is_success() {
        return Ok(response);
    }

    if is_rate_limit_response(&response) {
        return Err(PlatformError::RateLimited {
            reset_at: rate_limit_reset(&response),
        });
    }

    Err(match response.status {
        401 => PlatformError::AuthRequired,
        404 => PlatformError::not_found(resource),
        422 if error_body(&response).is_some_and(|b| b.is_name_taken()) => {
            PlatformError::already_exists(resource)
        }
        status => PlatformError::api(format!("{status}: {}", error_message(&response))),
    })
}

impl From<HttpError> for PlatformError {
    fn from(err: HttpError) -> Self {
        PlatformError::network(err.to_string())
    }
}
