//! # Transaction Processor
//!
//! Owns the single receive loop and the family/version handler registry.
//!
//! ## Dispatch Outcomes
//!
//! | Handler outcome | Response to validator | Loop |
//! |---|---|---|
//! | `Ok(())` | `ProcessStatus::Ok` | unaffected |
//! | `ApplyError::InvalidTransaction` | rejection with reason | unaffected |
//! | `ApplyError::Internal` | `ProcessStatus::InternalError` | unaffected |
//! | panic | `ProcessStatus::InternalError` | unaffected |

use crate::context::TransactionContext;
use crate::errors::{ApplyError, ProcessorError};
use crate::handler::TransactionHandler;
use async_trait::async_trait;
use futures::FutureExt;
use shared_types::{
    ipc, Envelope, MessageType, PingResponse, ProcessRequest, ProcessResponse, ProcessStatus,
    RegisterRequest, RegisterResponse, RegistrationStatus, UnregisterRequest,
};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tp_messaging::{CorrelationRouter, Duplex, InboundDispatcher};
use tracing::{debug, error, info, warn};

/// How long `stop` waits for the unregister acknowledgement before
/// halting the loop regardless.
const UNREGISTER_PATIENCE: Duration = Duration::from_secs(1);

/// A transaction processor bound to one validator channel.
pub struct TransactionProcessor {
    router: Arc<CorrelationRouter>,
    inbound: mpsc::Receiver<Vec<u8>>,
    handlers: Vec<Arc<dyn TransactionHandler>>,
}

impl TransactionProcessor {
    /// Create a processor over the given channel.
    #[must_use]
    pub fn new(channel: Duplex) -> Self {
        let Duplex { outbound, inbound } = channel;
        Self {
            router: CorrelationRouter::new(outbound),
            inbound,
            handlers: Vec::new(),
        }
    }

    /// Create a processor whose router uses a custom reply timeout.
    #[must_use]
    pub fn with_reply_timeout(channel: Duplex, reply_timeout: Duration) -> Self {
        let Duplex { outbound, inbound } = channel;
        Self {
            router: CorrelationRouter::with_reply_timeout(outbound, reply_timeout),
            inbound,
            handlers: Vec::new(),
        }
    }

    /// Register a handler for dispatch and for validator registration.
    pub fn add_handler(&mut self, handler: Arc<dyn TransactionHandler>) {
        self.handlers.push(handler);
    }

    /// The router this processor feeds.
    #[must_use]
    pub fn router(&self) -> Arc<CorrelationRouter> {
        Arc::clone(&self.router)
    }

    /// Start serving: wire dispatchers, spawn the receive loop, and
    /// register every handler family with the validator.
    ///
    /// The loop is spawned before registration because the registration
    /// acknowledgements themselves arrive through it.
    pub async fn start(self) -> Result<ProcessorHandle, ProcessorError> {
        let Self {
            router,
            mut inbound,
            handlers,
        } = self;

        // Step 1: build the (family, version) dispatch registry.
        let mut registry: HashMap<(String, String), Arc<dyn TransactionHandler>> = HashMap::new();
        for handler in &handlers {
            for version in handler.family_versions() {
                registry.insert((handler.family_name(), version), Arc::clone(handler));
            }
        }

        router.register_dispatcher(
            MessageType::ProcessRequest,
            Arc::new(ProcessDispatcher {
                registry: Arc::new(registry),
            }),
        );
        router.register_dispatcher(MessageType::PingRequest, Arc::new(PingDispatcher));

        // Step 2: the single receive loop. Sole reader of the channel; its
        // only job is to feed frames to the router.
        let loop_router = Arc::clone(&router);
        let receive_loop = tokio::spawn(async move {
            while let Some(frame) = inbound.recv().await {
                loop_router.route_frame(&frame);
            }
            debug!("Validator channel closed, receive loop ending");
        });

        // Step 3: announce every family/version.
        for handler in &handlers {
            let family = handler.family_name();
            let namespaces = handler.namespaces();
            for version in handler.family_versions() {
                let request = RegisterRequest {
                    family: family.clone(),
                    version: version.clone(),
                    namespaces: namespaces.clone(),
                };
                let reply = router
                    .send(MessageType::RegisterRequest, ipc::encode(&request)?)
                    .await?;
                let response: RegisterResponse = ipc::decode(&reply.content)?;

                if response.status != RegistrationStatus::Ok {
                    return Err(ProcessorError::RegistrationRejected { family, version });
                }
                info!(family = %family, version = %version, "Transaction family registered");
            }
        }

        Ok(ProcessorHandle {
            router,
            receive_loop,
        })
    }
}

/// A running processor: the live receive loop plus its router.
pub struct ProcessorHandle {
    router: Arc<CorrelationRouter>,
    receive_loop: JoinHandle<()>,
}

impl ProcessorHandle {
    /// The router feeding this processor.
    #[must_use]
    pub fn router(&self) -> Arc<CorrelationRouter> {
        Arc::clone(&self.router)
    }

    /// Build a state context bound to the given context id.
    #[must_use]
    pub fn context(&self, context_id: impl Into<String>) -> TransactionContext {
        TransactionContext::new(self.router(), context_id)
    }

    /// Run until the validator channel closes.
    pub async fn wait(self) {
        let _ = self.receive_loop.await;
    }

    /// Stop serving: withdraw registrations (best effort), then halt the
    /// receive loop. Already-dispatched handler tasks run to completion;
    /// their replies go nowhere once the transport drops.
    pub async fn stop(self) {
        match ipc::encode(&UnregisterRequest {}) {
            Ok(content) => {
                let unregister = self.router.send(MessageType::UnregisterRequest, content);
                if tokio::time::timeout(UNREGISTER_PATIENCE, unregister)
                    .await
                    .is_err()
                {
                    debug!("Unregister acknowledgement not received before shutdown");
                }
            }
            Err(error) => warn!(%error, "Could not encode unregister request"),
        }

        self.receive_loop.abort();
        info!("Transaction processor stopped");
    }
}

// =============================================================================
// INBOUND DISPATCHERS
// =============================================================================

/// Dispatches process requests to the registered family handler.
struct ProcessDispatcher {
    registry: Arc<HashMap<(String, String), Arc<dyn TransactionHandler>>>,
}

impl ProcessDispatcher {
    /// Run one handler invocation with panic isolation.
    async fn execute(
        &self,
        router: &Arc<CorrelationRouter>,
        request: &ProcessRequest,
    ) -> ProcessResponse {
        let key = (
            request.header.family_name.clone(),
            request.header.family_version.clone(),
        );

        let Some(handler) = self.registry.get(&key) else {
            return ProcessResponse {
                status: ProcessStatus::InvalidTransaction,
                message: format!(
                    "No handler for family {} version {}",
                    key.0, key.1
                ),
            };
        };

        let context = TransactionContext::new(Arc::clone(router), request.context_id.clone());
        let outcome = AssertUnwindSafe(handler.apply(request, &context))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => ProcessResponse {
                status: ProcessStatus::Ok,
                message: String::new(),
            },
            Ok(Err(ApplyError::InvalidTransaction(reason))) => {
                warn!(
                    family = %key.0,
                    context_id = %request.context_id,
                    %reason,
                    "Transaction rejected by handler"
                );
                ProcessResponse {
                    status: ProcessStatus::InvalidTransaction,
                    message: reason,
                }
            }
            Ok(Err(ApplyError::Internal(reason))) => {
                error!(
                    family = %key.0,
                    context_id = %request.context_id,
                    %reason,
                    "Handler failed"
                );
                ProcessResponse {
                    status: ProcessStatus::InternalError,
                    message: reason,
                }
            }
            Err(_) => {
                error!(
                    family = %key.0,
                    context_id = %request.context_id,
                    "Handler panicked"
                );
                ProcessResponse {
                    status: ProcessStatus::InternalError,
                    message: "handler panicked".to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl InboundDispatcher for ProcessDispatcher {
    async fn dispatch(&self, router: Arc<CorrelationRouter>, envelope: Envelope) {
        let response = match ipc::decode::<ProcessRequest>(&envelope.content) {
            Ok(request) => self.execute(&router, &request).await,
            Err(error) => {
                warn!(
                    correlation_id = %envelope.correlation_id,
                    %error,
                    "Undecodable process request"
                );
                ProcessResponse {
                    status: ProcessStatus::InternalError,
                    message: "undecodable process request".to_string(),
                }
            }
        };

        let content = match ipc::encode(&response) {
            Ok(content) => content,
            Err(error) => {
                error!(%error, "Could not encode process response");
                return;
            }
        };

        if let Err(error) = router
            .reply(&envelope, MessageType::ProcessResponse, content)
            .await
        {
            warn!(%error, "Could not transmit process response");
        }
    }
}

/// Answers validator keepalive probes.
struct PingDispatcher;

#[async_trait]
impl InboundDispatcher for PingDispatcher {
    async fn dispatch(&self, router: Arc<CorrelationRouter>, envelope: Envelope) {
        let content = match ipc::encode(&PingResponse {}) {
            Ok(content) => content,
            Err(error) => {
                error!(%error, "Could not encode ping response");
                return;
            }
        };

        if let Err(error) = router
            .reply(&envelope, MessageType::PingResponse, content)
            .await
        {
            debug!(%error, "Could not transmit ping response");
        }
    }
}
