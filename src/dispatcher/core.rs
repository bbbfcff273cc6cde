use may::coroutine;
use may::sync::mpsc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::RequestError;
use crate::handler::CompiledHandler;
use crate::middleware::Middleware;
use crate::response::MethodResult;
use crate::transport::{RequestContext, ResponseHandle};

/// What one dispatched request resolves to: the method result, or the
/// classified failure for the transport's error channel.
pub type DispatchOutcome = Result<MethodResult, RequestError>;

/// One request in flight to a handler coroutine, with the channel the
/// outcome comes back on.
pub struct DispatchJob {
    /// Parsed request.
    pub request: Arc<RequestContext>,
    /// Response handle the compiled handler may hand to the method.
    pub response: ResponseHandle,
    /// Channel for sending the outcome back to the dispatcher.
    pub reply_tx: mpsc::Sender<DispatchOutcome>,
}

/// Channel sender that feeds a handler coroutine.
pub type HandlerSender = mpsc::Sender<DispatchJob>;

/// Routes requests to registered handler coroutines.
///
/// Each compiled handler runs in its own coroutine, fed by an MPSC channel;
/// the dispatcher holds the senders, keyed by handler name, plus the
/// middleware applied around every dispatch. Registration happens at
/// startup, strictly after metadata accumulation and handler compilation;
/// the map is read-only while requests flow.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, HandlerSender>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            middlewares: Vec::new(),
        }
    }

    /// Add middleware to the pipeline. Middleware runs in insertion order.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Names of every registered handler.
    pub fn handler_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Register a compiled handler under the given name, spawning its
    /// coroutine. Re-registering a name drops the old sender, which closes
    /// the old coroutine's channel and lets it exit.
    ///
    /// # Safety
    ///
    /// Spawning via `may::coroutine::Builder::spawn` is unsafe in the `may`
    /// runtime. The caller must ensure the runtime is initialized and that
    /// registration happens during startup, before requests are dispatched.
    pub unsafe fn register(&mut self, name: &str, handler: CompiledHandler) {
        let (tx, rx) = mpsc::channel::<DispatchJob>();
        let name = name.to_string();

        if self.handlers.remove(&name).is_some() {
            warn!(handler = %name, "replaced existing handler, old coroutine will exit");
        }

        let handler_name = name.clone();
        let spawn_result = coroutine::Builder::new()
            .stack_size(may::config().get_stack_size())
            .spawn(move || {
                debug!(handler = %handler_name, "handler coroutine start");
                for job in rx.iter() {
                    let DispatchJob {
                        request,
                        response,
                        reply_tx,
                    } = job;
                    let outcome =
                        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            handler.invoke(&request, &response)
                        }))
                        .unwrap_or_else(|panic| {
                            error!(
                                handler = %handler_name,
                                request_id = %request.request_id,
                                panic = ?panic,
                                "handler panicked"
                            );
                            Err(RequestError::Invocation(anyhow::anyhow!(
                                "handler `{handler_name}` panicked: {panic:?}"
                            )))
                        });
                    let _ = reply_tx.send(outcome);
                }
            });

        match spawn_result {
            Ok(_) => {
                info!(handler = %name, total_handlers = self.handlers.len() + 1, "handler registered");
                self.handlers.insert(name, tx);
            }
            Err(e) => {
                error!(handler = %name, error = %e, "failed to spawn handler coroutine");
            }
        }
    }

    /// Dispatch a request to the named handler and wait for its outcome.
    ///
    /// Returns `None` when no handler is registered under the name. The
    /// `after` middleware hook runs only on successful outcomes; failures go
    /// back to the caller for the error channel.
    #[must_use]
    pub fn dispatch(
        &self,
        name: &str,
        request: Arc<RequestContext>,
        response: ResponseHandle,
    ) -> Option<DispatchOutcome> {
        let tx = match self.handlers.get(name) {
            Some(tx) => tx,
            None => {
                error!(handler = %name, "handler not found");
                return None;
            }
        };

        let mut early: Option<MethodResult> = None;
        for mw in &self.middlewares {
            if early.is_none() {
                early = mw.before(&request);
            } else {
                mw.before(&request);
            }
        }

        let (outcome, latency) = match early {
            Some(result) => (Ok(result), Duration::ZERO),
            None => {
                let (reply_tx, reply_rx) = mpsc::channel();
                let start = Instant::now();
                let job = DispatchJob {
                    request: Arc::clone(&request),
                    response,
                    reply_tx,
                };
                if tx.send(job).is_err() {
                    error!(handler = %name, "failed to send request to handler");
                    return None;
                }
                match reply_rx.recv() {
                    Ok(outcome) => (outcome, start.elapsed()),
                    Err(e) => {
                        error!(handler = %name, error = %e, "handler channel closed");
                        return Some(Err(RequestError::Invocation(anyhow::anyhow!(
                            "handler `{name}` is not responding"
                        ))));
                    }
                }
            }
        };

        Some(match outcome {
            Ok(mut result) => {
                for mw in &self.middlewares {
                    mw.after(&request, &mut result, latency);
                }
                Ok(result)
            }
            Err(err) => Err(err),
        })
    }
}
