//! # Processor Lifecycle Integration
//!
//! Registration, keepalive, and dispatch outcomes: success, rejection,
//! internal failure, panic isolation, and the independence of unrelated
//! in-flight exchanges.

#[cfg(test)]
mod tests {
    use crate::integration::support::SimulatedValidator;
    use async_trait::async_trait;
    use shared_types::{
        MessageType, PingRequest, PingResponse, ProcessRequest, ProcessResponse, ProcessStatus,
        RegisterRequest, RegisterResponse, RegistrationStatus, StateEntry, StateGetRequest,
        StateGetResponse, StateStatus, TransactionHeader,
    };
    use std::sync::Arc;
    use tp_messaging::Duplex;
    use tp_processor::{
        ApplyError, ProcessorError, ProcessorHandle, TransactionContext, TransactionHandler,
        TransactionProcessor,
    };

    /// Handler whose behavior is scripted by the transaction payload.
    struct ScriptedHandler;

    #[async_trait]
    impl TransactionHandler for ScriptedHandler {
        fn family_name(&self) -> String {
            "intkey".to_string()
        }

        fn family_versions(&self) -> Vec<String> {
            vec!["1.0".to_string()]
        }

        fn namespaces(&self) -> Vec<String> {
            vec!["1cf126".to_string()]
        }

        async fn apply(
            &self,
            request: &ProcessRequest,
            context: &TransactionContext,
        ) -> Result<(), ApplyError> {
            match request.payload.as_slice() {
                b"ok" => Ok(()),
                b"read" => {
                    let state = context
                        .get_state(&["counter".to_string()])
                        .await
                        .map_err(|e| ApplyError::Internal(e.to_string()))?;
                    if state.contains_key("counter") {
                        Ok(())
                    } else {
                        Err(ApplyError::InvalidTransaction("counter not set".to_string()))
                    }
                }
                b"invalid" => Err(ApplyError::InvalidTransaction(
                    "payload rejected".to_string(),
                )),
                b"crash" => Err(ApplyError::Internal("scripted failure".to_string())),
                b"panic" => panic!("scripted panic"),
                other => Err(ApplyError::InvalidTransaction(format!(
                    "unknown payload: {other:?}"
                ))),
            }
        }
    }

    fn process_request(family: &str, payload: &[u8], context_id: &str) -> ProcessRequest {
        ProcessRequest {
            header: TransactionHeader {
                family_name: family.to_string(),
                family_version: "1.0".to_string(),
                signer_public_key: String::new(),
                inputs: vec!["1cf126".to_string()],
                outputs: vec!["1cf126".to_string()],
            },
            payload: payload.to_vec(),
            signature: String::new(),
            context_id: context_id.to_string(),
        }
    }

    /// Accept the registration exchange a started processor initiates.
    async fn accept_registration(validator: &mut SimulatedValidator) -> RegisterRequest {
        let (envelope, request): (_, RegisterRequest) =
            validator.expect(MessageType::RegisterRequest).await;
        validator
            .reply(
                &envelope,
                MessageType::RegisterResponse,
                &RegisterResponse {
                    status: RegistrationStatus::Ok,
                },
            )
            .await;
        request
    }

    /// Start a processor with the scripted handler and complete registration.
    async fn start_with_handler(
        near: Duplex,
        validator: &mut SimulatedValidator,
    ) -> ProcessorHandle {
        crate::integration::support::init_tracing();

        let mut processor = TransactionProcessor::new(near);
        processor.add_handler(Arc::new(ScriptedHandler));

        let starting = tokio::spawn(processor.start());
        accept_registration(validator).await;
        starting.await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_registration_announces_family() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);

        let mut processor = TransactionProcessor::new(near);
        processor.add_handler(Arc::new(ScriptedHandler));
        let starting = tokio::spawn(processor.start());

        let request = accept_registration(&mut validator).await;
        assert_eq!(request.family, "intkey");
        assert_eq!(request.version, "1.0");
        assert_eq!(request.namespaces, vec!["1cf126"]);

        assert!(starting.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_rejected_registration_fails_startup() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);

        let mut processor = TransactionProcessor::new(near);
        processor.add_handler(Arc::new(ScriptedHandler));
        let starting = tokio::spawn(processor.start());

        let (envelope, _request): (_, RegisterRequest) =
            validator.expect(MessageType::RegisterRequest).await;
        validator
            .reply(
                &envelope,
                MessageType::RegisterResponse,
                &RegisterResponse {
                    status: RegistrationStatus::Error,
                },
            )
            .await;

        let result = starting.await.unwrap();
        assert!(matches!(
            result,
            Err(ProcessorError::RegistrationRejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_ping_answered_with_same_correlation_id() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);

        let _handle = TransactionProcessor::new(near).start().await.unwrap();

        let probe = validator
            .request(MessageType::PingRequest, &PingRequest {})
            .await;
        let (envelope, _pong): (_, PingResponse) =
            validator.expect(MessageType::PingResponse).await;

        assert_eq!(envelope.correlation_id, probe.correlation_id);
    }

    #[tokio::test]
    async fn test_successful_handler_acknowledged_after_state_flow() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);
        let handle = start_with_handler(near, &mut validator).await;

        let probe = validator
            .request(
                MessageType::ProcessRequest,
                &process_request("intkey", b"read", "ctx-1"),
            )
            .await;

        // The handler's state read arrives first and is scoped to the
        // request's context id.
        let (envelope, request): (_, StateGetRequest) =
            validator.expect(MessageType::StateGetRequest).await;
        assert_eq!(request.context_id, "ctx-1");
        validator
            .reply(
                &envelope,
                MessageType::StateGetResponse,
                &StateGetResponse {
                    status: StateStatus::Ok,
                    entries: vec![StateEntry {
                        address: "counter".to_string(),
                        data: b"41".to_vec(),
                    }],
                },
            )
            .await;

        let (envelope, response): (_, ProcessResponse) =
            validator.expect(MessageType::ProcessResponse).await;
        assert_eq!(envelope.correlation_id, probe.correlation_id);
        assert_eq!(response.status, ProcessStatus::Ok);

        assert_eq!(handle.router().anomaly_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_transaction_reported_and_processing_continues() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);
        let handle = start_with_handler(near, &mut validator).await;

        validator
            .request(
                MessageType::ProcessRequest,
                &process_request("intkey", b"invalid", "ctx-1"),
            )
            .await;
        let (_, rejection): (_, ProcessResponse) =
            validator.expect(MessageType::ProcessResponse).await;
        assert_eq!(rejection.status, ProcessStatus::InvalidTransaction);
        assert_eq!(rejection.message, "payload rejected");

        // The loop and router are unaffected: the next transaction lands.
        validator
            .request(
                MessageType::ProcessRequest,
                &process_request("intkey", b"ok", "ctx-2"),
            )
            .await;
        let (_, acknowledgement): (_, ProcessResponse) =
            validator.expect(MessageType::ProcessResponse).await;
        assert_eq!(acknowledgement.status, ProcessStatus::Ok);

        assert_eq!(handle.router().anomaly_count(), 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_reports_internal_error_and_survives() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);
        let _handle = start_with_handler(near, &mut validator).await;

        validator
            .request(
                MessageType::ProcessRequest,
                &process_request("intkey", b"panic", "ctx-1"),
            )
            .await;
        let (_, response): (_, ProcessResponse) =
            validator.expect(MessageType::ProcessResponse).await;
        assert_eq!(response.status, ProcessStatus::InternalError);

        validator
            .request(
                MessageType::ProcessRequest,
                &process_request("intkey", b"ok", "ctx-2"),
            )
            .await;
        let (_, acknowledgement): (_, ProcessResponse) =
            validator.expect(MessageType::ProcessResponse).await;
        assert_eq!(acknowledgement.status, ProcessStatus::Ok);
    }

    #[tokio::test]
    async fn test_internal_error_reported_with_reason() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);
        let _handle = start_with_handler(near, &mut validator).await;

        validator
            .request(
                MessageType::ProcessRequest,
                &process_request("intkey", b"crash", "ctx-1"),
            )
            .await;

        let (_, response): (_, ProcessResponse) =
            validator.expect(MessageType::ProcessResponse).await;
        assert_eq!(response.status, ProcessStatus::InternalError);
        assert_eq!(response.message, "scripted failure");
    }

    #[tokio::test]
    async fn test_unknown_family_rejected() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);
        let _handle = start_with_handler(near, &mut validator).await;

        validator
            .request(
                MessageType::ProcessRequest,
                &process_request("unregistered", b"ok", "ctx-1"),
            )
            .await;

        let (_, response): (_, ProcessResponse) =
            validator.expect(MessageType::ProcessResponse).await;
        assert_eq!(response.status, ProcessStatus::InvalidTransaction);
        assert!(response.message.contains("unregistered"));
    }

    #[tokio::test]
    async fn test_rejection_leaves_unrelated_exchange_in_flight() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);
        let handle = start_with_handler(near, &mut validator).await;

        // An unrelated context read goes out first and stays unanswered.
        let context = Arc::new(handle.context("unrelated"));
        let pending_read = {
            let context = Arc::clone(&context);
            tokio::spawn(async move { context.get_state(&["held".to_string()]).await })
        };
        let (held_envelope, held_request): (_, StateGetRequest) =
            validator.expect(MessageType::StateGetRequest).await;

        // A full rejected-transaction cycle happens in the middle.
        validator
            .request(
                MessageType::ProcessRequest,
                &process_request("intkey", b"invalid", "ctx-1"),
            )
            .await;
        let (_, rejection): (_, ProcessResponse) =
            validator.expect(MessageType::ProcessResponse).await;
        assert_eq!(rejection.status, ProcessStatus::InvalidTransaction);

        // The held exchange still resolves.
        validator
            .reply(
                &held_envelope,
                MessageType::StateGetResponse,
                &StateGetResponse {
                    status: StateStatus::Ok,
                    entries: held_request
                        .addresses
                        .iter()
                        .map(|address| StateEntry {
                            address: address.clone(),
                            data: b"still here".to_vec(),
                        })
                        .collect(),
                },
            )
            .await;

        let state = pending_read.await.unwrap().unwrap();
        assert_eq!(state["held"], b"still here".to_vec());
        assert_eq!(handle.router().anomaly_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_sends_unregister_request() {
        let (near, far) = Duplex::pair();
        let mut validator = SimulatedValidator::new(far);
        let handle = start_with_handler(near, &mut validator).await;

        let stopping = tokio::spawn(handle.stop());

        let envelope = validator.recv().await;
        assert_eq!(envelope.message_type, MessageType::UnregisterRequest);

        stopping.await.unwrap();
    }
}
