//! Status classification for completed round trips.

use uuid::Uuid;

use crate::error::{ApiError, StatusError};
use crate::executor::ExecutionOutcome;
use crate::http::{HttpRequest, HttpResponse};

/// Map a completed response to the caller-facing outcome.
///
/// Only the literal 200 counts as success; 201, 204 and every other status
/// become `ApiError::HttpError`, which keeps the response and the request
/// that produced it.
pub fn classify(
    response: HttpResponse,
    request: HttpRequest,
    request_id: Uuid,
) -> ExecutionOutcome {
    if response.is_ok() {
        return Ok(response);
    }
    Err(ApiError::HttpError(Box::new(StatusError {
        response,
        request,
        request_id,
    })))
}
