//! Request execution with deadline, cancellation and GET retries.
//!
//! Each attempt moves `Idle -> Dispatched -> {Completed, TimedOut}`. With a
//! deadline configured the attempt runs on its own task and races a timer;
//! if the timer wins the attempt's `CancellationToken` is cancelled so the
//! transport drops the connection, and the task is drained in the background.
//! Without a deadline the attempt runs inline.
//!
//! GET requests are retried after transport failures only, sequentially,
//! with `RETRY_DELAY` between attempts. Timeouts and status errors end the
//! call. Other methods are never retried.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, Span};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::materialize::materialize;
use crate::options::{Options, RETRY_DELAY};
use crate::request::DraftRequest;
use crate::response::classify;
use crate::transport::{Transport, TransportError};

/// A usable response (status 200), or a classified error. A non-200
/// response is still reachable through `ApiError::response`.
pub type ExecutionOutcome = Result<HttpResponse, ApiError>;

/// Runs materialized requests through a `Transport`.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Materialize `draft` for `method` and run it under the draft's options.
    #[instrument(
        name = "api_request",
        skip(self, draft),
        fields(
            request_id = %draft.id(),
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            attempt = tracing::field::Empty,
        )
    )]
    pub async fn execute(&self, method: HttpMethod, draft: &DraftRequest) -> ExecutionOutcome {
        let request = materialize(method, draft.url(), draft)?;
        Span::current().record("http.url", request.url.as_str());

        let options = *draft.options();
        let mut attempts = 1;
        let mut result = self.attempt(&request, &options).await;

        if method.is_retryable() {
            while attempts <= options.retries {
                match &result {
                    Err(err) if err.is_retryable() => {
                        debug!(
                            attempt = attempts,
                            error = %err,
                            "retrying after transport failure"
                        )
                    }
                    _ => break,
                }
                tokio::time::sleep(RETRY_DELAY).await;
                attempts += 1;
                result = self.attempt(&request, &options).await;
            }
        }
        Span::current().record("attempt", attempts);

        let response = result?;
        Span::current().record("http.status_code", response.status);
        classify(response, request, draft.id())
    }

    async fn attempt(
        &self,
        request: &HttpRequest,
        options: &Options,
    ) -> Result<HttpResponse, ApiError> {
        let Some(deadline) = options.timeout() else {
            let response = self
                .transport
                .send(request.clone(), CancellationToken::new())
                .await?;
            return Ok(response);
        };

        let cancel = CancellationToken::new();
        let mut task = tokio::spawn({
            let transport = Arc::clone(&self.transport);
            let request = request.clone();
            let cancel = cancel.clone();
            async move { transport.send(request, cancel).await }
        });

        tokio::select! {
            joined = &mut task => match joined {
                Ok(result) => Ok(result?),
                Err(err) => Err(TransportError::Aborted(err.to_string()).into()),
            },
            _ = tokio::time::sleep(deadline) => {
                debug!(
                    timeout_ms = options.timeout_ms,
                    url = %request.url,
                    "deadline elapsed, cancelling request"
                );
                cancel.cancel();
                tokio::spawn(drain(task));
                Err(ApiError::Timeout { duration_ms: options.timeout_ms })
            }
        }
    }
}

/// Wait out an abandoned attempt so its outcome is logged, not lost.
async fn drain(task: JoinHandle<Result<HttpResponse, TransportError>>) {
    match task.await {
        Ok(Ok(response)) => {
            debug!(status = response.status, "abandoned request completed after deadline")
        }
        Ok(Err(err)) => debug!(error = %err, "abandoned request stopped"),
        Err(err) => debug!(error = %err, "abandoned request task failed"),
    }
}
