//! # Integration Test Flows
//!
//! Exercises the full ingest pipeline with real sink implementations:
//! `IngestService` + `StaticSecretStore` from relay-core wired to the
//! `BroadcastBus` and `QueueSink` from relay-bus.
//!
//! ## Flows Tested
//!
//! 1. **Verified webhook → bus**: a correctly signed request is accepted
//!    and every subscriber receives the verbatim payload
//! 2. **Verified webhook → queue**: point-to-point delivery with order
//!    preservation and bounded-capacity failure
//! 3. **Rejections**: stale, tampered, and unsigned requests never reach
//!    a sink, and every fault maps to the agreed status class

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use tokio::sync::Notify;
    use tokio::time::timeout;

    use relay_bus::{BroadcastBus, QueueSink};
    use relay_core::adapters::StaticSecretStore;
    use relay_core::{
        compute_signature, EventSink, IngestResponse, IngestService, RawRequest, RelayConfig,
        SigningSecret, SinkAttributes, SinkError, WebhookIngestApi, SIGNATURE_HEADER,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const BODY: &[u8] = br#"{"id":"evt_1","type":"payment.succeeded"}"#;
    const SECRET_ID: &str = "webhook-signing-secret";
    const SECRET: &str = "whsec_test";

    fn unix_now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64)
    }

    fn signed_request_with(material: &str, timestamp: i64, body: &[u8]) -> RawRequest {
        let secret = SigningSecret::new(SECRET_ID, material);
        let signature = compute_signature(&secret, timestamp, body);
        RawRequest::new(
            vec![(
                SIGNATURE_HEADER.to_string(),
                format!("t={timestamp},v1={signature}"),
            )],
            body.to_vec(),
        )
    }

    fn signed_request(timestamp: i64) -> RawRequest {
        signed_request_with(SECRET, timestamp, BODY)
    }

    /// Sink that parks inside `submit` until released, so a caller can
    /// cancel a request while its delivery is still in flight. Acceptance
    /// is only counted after the park, past the cancellation point.
    struct StallingSink {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        accepted: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl EventSink for StallingSink {
        async fn submit(&self, _: Vec<u8>, _: SinkAttributes) -> Result<(), SinkError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.accepted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn bus_service(bus: Arc<BroadcastBus>) -> IngestService<StaticSecretStore, Arc<BroadcastBus>> {
        IngestService::new(
            RelayConfig::default(),
            StaticSecretStore::new(SECRET_ID, SECRET),
            bus,
        )
    }

    // =============================================================================
    // INTEGRATION TESTS: PIPELINE → BROADCAST BUS
    // =============================================================================

    /// A correctly signed webhook lands on the bus verbatim, with the
    /// origin and event-type routing attributes attached.
    #[tokio::test]
    async fn verified_webhook_reaches_bus_subscriber() {
        let bus = Arc::new(BroadcastBus::new());
        let mut subscriber = bus.subscribe();
        let service = bus_service(bus);

        let response = service.handle(signed_request(unix_now())).await;
        assert_eq!(response, IngestResponse::OK);

        let envelope = timeout(Duration::from_secs(1), subscriber.recv())
            .await
            .expect("subscriber should receive promptly")
            .expect("bus should stay open");

        assert_eq!(envelope.payload, BODY.to_vec());
        assert_eq!(envelope.source, "stripe");
        assert_eq!(envelope.detail_type.as_deref(), Some("payment.succeeded"));
    }

    /// With no subscriber attached, acceptance would mean silent loss, so
    /// the pipeline reports a server error and the sender retries later.
    #[tokio::test]
    async fn bus_without_subscribers_yields_server_error() {
        let bus = Arc::new(BroadcastBus::new());
        let service = bus_service(bus.clone());

        let response = service.handle(signed_request(unix_now())).await;

        assert_eq!(response, IngestResponse::SERVER_ERROR);
        assert_eq!(bus.submitted(), 0);
    }

    /// Two independent requests are verified and forwarded independently;
    /// each gets its own delivery id.
    #[tokio::test]
    async fn independent_requests_get_distinct_delivery_ids() {
        let bus = Arc::new(BroadcastBus::new());
        let mut subscriber = bus.subscribe();
        let service = bus_service(bus);

        let now = unix_now();
        assert_eq!(service.handle(signed_request(now)).await, IngestResponse::OK);
        assert_eq!(service.handle(signed_request(now)).await, IngestResponse::OK);

        let first = subscriber.recv().await.unwrap();
        let second = subscriber.recv().await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.payload, second.payload);
    }

    // =============================================================================
    // INTEGRATION TESTS: PIPELINE → QUEUE
    // =============================================================================

    /// Point-to-point delivery through the bounded queue.
    #[tokio::test]
    async fn verified_webhook_reaches_queue_consumer() {
        let (sink, mut consumer) = QueueSink::with_capacity(8);
        let service = IngestService::new(
            RelayConfig::default(),
            StaticSecretStore::new(SECRET_ID, SECRET),
            sink,
        );

        let response = service.handle(signed_request(unix_now())).await;
        assert_eq!(response, IngestResponse::OK);

        let envelope = consumer.recv().await.unwrap();
        assert_eq!(envelope.payload, BODY.to_vec());
    }

    /// A full queue is an operational fault: 500, retry later.
    #[tokio::test]
    async fn full_queue_yields_server_error() {
        let (sink, _consumer) = QueueSink::with_capacity(1);
        let service = IngestService::new(
            RelayConfig::default(),
            StaticSecretStore::new(SECRET_ID, SECRET),
            sink,
        );

        let now = unix_now();
        assert_eq!(service.handle(signed_request(now)).await, IngestResponse::OK);
        assert_eq!(
            service.handle(signed_request(now)).await,
            IngestResponse::SERVER_ERROR
        );
    }

    // =============================================================================
    // INTEGRATION TESTS: SECRET ROTATION
    // =============================================================================

    /// During rotation the store returns both secrets; a webhook signed
    /// with the old one still verifies.
    #[tokio::test]
    async fn rotation_accepts_webhook_signed_with_old_secret() {
        let bus = Arc::new(BroadcastBus::new());
        let mut subscriber = bus.subscribe();
        let store = StaticSecretStore::new(SECRET_ID, r#"["whsec_new","whsec_old"]"#);
        let service = IngestService::new(RelayConfig::default(), store, bus);

        let request = signed_request_with("whsec_old", unix_now(), BODY);

        assert_eq!(service.handle(request).await, IngestResponse::OK);
        assert_eq!(subscriber.recv().await.unwrap().payload, BODY.to_vec());
    }

    /// A secret retired out of the rotation set stops verifying.
    #[tokio::test]
    async fn retired_secret_no_longer_verifies() {
        let bus = Arc::new(BroadcastBus::new());
        let _subscriber = bus.subscribe();
        let store = StaticSecretStore::new(SECRET_ID, r#"["whsec_new"]"#);
        let service = IngestService::new(RelayConfig::default(), store, bus);

        let request = signed_request_with("whsec_old", unix_now(), BODY);

        assert_eq!(service.handle(request).await, IngestResponse::BAD_REQUEST);
    }

    // =============================================================================
    // INTEGRATION TESTS: REJECTION AND FAULT MAPPING
    // =============================================================================

    /// Replay of a captured request outside the window is refused and
    /// nothing reaches the sink.
    #[tokio::test]
    async fn replayed_webhook_never_reaches_sink() {
        let bus = Arc::new(BroadcastBus::new());
        let _subscriber = bus.subscribe();
        let service = bus_service(bus.clone());

        let stale = unix_now() - 301;
        let response = service.handle(signed_request(stale)).await;

        assert_eq!(response, IngestResponse::BAD_REQUEST);
        assert_eq!(bus.submitted(), 0);
    }

    /// Tampered body, wrong-scheme header, and unsigned request all map
    /// to the same opaque client error.
    #[tokio::test]
    async fn every_client_fault_is_an_opaque_400() {
        let bus = Arc::new(BroadcastBus::new());
        let _subscriber = bus.subscribe();
        let service = bus_service(bus.clone());
        let now = unix_now();

        let mut tampered_body = BODY.to_vec();
        tampered_body[0] ^= 0x01;
        let tampered = RawRequest::new(
            vec![(
                SIGNATURE_HEADER.to_string(),
                signed_request(now).header(SIGNATURE_HEADER).unwrap().to_string(),
            )],
            tampered_body,
        );

        let malformed = RawRequest::new(
            vec![(SIGNATURE_HEADER.to_string(), "v0=legacy-only".to_string())],
            BODY.to_vec(),
        );

        let unsigned = RawRequest::new(Vec::new(), BODY.to_vec());

        for request in [tampered, malformed, unsigned] {
            assert_eq!(service.handle(request).await, IngestResponse::BAD_REQUEST);
        }
        assert_eq!(bus.submitted(), 0);
    }

    /// The configured secret id must exist in the store; a missing secret
    /// is an operational fault, not a client error.
    #[tokio::test]
    async fn missing_secret_yields_server_error() {
        let bus = Arc::new(BroadcastBus::new());
        let _subscriber = bus.subscribe();
        let store = StaticSecretStore::new("some-other-id", SECRET);
        let service = IngestService::new(RelayConfig::default(), store, bus.clone());

        let response = service.handle(signed_request(unix_now())).await;

        assert_eq!(response, IngestResponse::SERVER_ERROR);
        assert_eq!(bus.submitted(), 0);
    }

    /// Aborting a request while its delivery is still in flight must not
    /// surface as success: the sink records no completed acceptance and
    /// no 200 is ever produced for the cancelled request.
    #[tokio::test]
    async fn cancelled_delivery_is_not_reported_as_success() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let accepted = Arc::new(AtomicUsize::new(0));
        let sink = StallingSink {
            entered: entered.clone(),
            release: release.clone(),
            accepted: accepted.clone(),
        };
        let service = Arc::new(IngestService::new(
            RelayConfig::default(),
            StaticSecretStore::new(SECRET_ID, SECRET),
            sink,
        ));

        let task = tokio::spawn({
            let service = service.clone();
            async move { service.handle(signed_request(unix_now())).await }
        });

        // Wait until the request is parked inside the sink, then abort it
        // mid-delivery.
        timeout(Duration::from_secs(1), entered.notified())
            .await
            .expect("delivery should start promptly");
        task.abort();

        let joined = task.await;
        assert!(joined.err().is_some_and(|e| e.is_cancelled()));
        assert_eq!(accepted.load(Ordering::SeqCst), 0);

        // Releasing afterwards must not retroactively complete the
        // cancelled delivery.
        release.notify_one();
        tokio::task::yield_now().await;
        assert_eq!(accepted.load(Ordering::SeqCst), 0);
    }

    /// Cross-check `compute_signature` against an independently built
    /// HMAC-SHA256 of `"{t}.{body}"`, the scheme the sender uses.
    #[tokio::test]
    async fn signature_scheme_matches_independent_hmac() {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        let timestamp = 1_700_000_000i64;
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(BODY);
        let expected = hex::encode(mac.finalize().into_bytes());

        let secret = SigningSecret::new(SECRET_ID, SECRET);
        assert_eq!(compute_signature(&secret, timestamp, BODY), expected);
    }

    /// Concurrent requests share one secret fetch and all verify.
    #[tokio::test]
    async fn concurrent_requests_all_verify() {
        let bus = Arc::new(BroadcastBus::new());
        let mut subscriber = bus.subscribe();
        let service = Arc::new(bus_service(bus));
        let now = unix_now();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            tasks.push(tokio::spawn(
                async move { service.handle(signed_request(now)).await },
            ));
        }

        for task in tasks {
            assert_eq!(task.await.unwrap(), IngestResponse::OK);
        }

        for _ in 0..8 {
            let envelope = subscriber.recv().await.unwrap();
            assert_eq!(envelope.payload, BODY.to_vec());
        }
    }
}
