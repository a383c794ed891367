//! # Registration → Gateway → Bus Flows
//!
//! A registration claims namespaces, the gateway enforces them on queries
//! and fans transactions out onto the bus.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use as_02_registration::{AppServiceRegistration, NamespaceKind};
    use as_03_protocol_gateway::{resolver_fn, ErrCode, ProtocolGateway, Rejection, TransactionOutcome};
    use shared_bus::{handler_fn, Channel, EventDispatcher, HandlerError, InMemoryEventBus};
    use shared_types::{Event, TransactionBody};

    const HS_TOKEN: &str = "hs_token_value";

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn bridge_registration() -> AppServiceRegistration {
        let mut reg = AppServiceRegistration::new(Some("http://bridge.local:8090".into()));
        reg.set_id("irc-bridge");
        reg.set_homeserver_token(HS_TOKEN);
        reg.set_app_service_token("as_token_value");
        reg.set_sender_localpart("ircbot");
        reg.add_regex_pattern(NamespaceKind::Users, "@irc_.*:example\\.org", true)
            .unwrap();
        reg.add_regex_pattern(NamespaceKind::Aliases, "#irc_.*:example\\.org", false)
            .unwrap();
        reg
    }

    fn gateway_for(reg: &AppServiceRegistration) -> (ProtocolGateway, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let gateway = ProtocolGateway::new(reg.homeserver_token().unwrap(), bus.clone())
            .with_user_resolver(resolver_fn(|_: String| async { Ok(()) }))
            .with_alias_resolver(resolver_fn(|_: String| async { Ok(()) }))
            .with_namespaces(reg.namespaces().clone());
        (gateway, bus)
    }

    fn recorder(bus: &InMemoryEventBus, channel: Channel) -> Arc<Mutex<Vec<Value>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe_handler(
            channel,
            handler_fn(move |ev: &Event| {
                sink.lock().push(ev.as_value().clone());
                Ok(())
            }),
        );
        seen
    }

    fn body(value: Value) -> TransactionBody {
        serde_json::from_value(value).unwrap()
    }

    // =============================================================================
    // QUERIES
    // =============================================================================

    #[tokio::test]
    async fn test_queries_follow_claimed_namespaces() {
        let reg = bridge_registration();
        let (gateway, _bus) = gateway_for(&reg);

        assert!(gateway
            .on_user_query("@irc_alice:example.org", Some(HS_TOKEN))
            .await
            .is_ok());
        assert!(gateway
            .on_alias_query("#irc_chan:example.org", Some(HS_TOKEN))
            .await
            .is_ok());

        let err = gateway
            .on_user_query("@alice:example.org", Some(HS_TOKEN))
            .await
            .unwrap_err();
        assert_eq!(err.errcode, ErrCode::NotFound);
    }

    #[tokio::test]
    async fn test_exported_registration_drives_same_gateway() {
        let exported = bridge_registration().export().unwrap();
        let imported = AppServiceRegistration::from_object(&exported).unwrap();
        let (gateway, _bus) = gateway_for(&imported);

        assert!(gateway
            .on_user_query("@irc_bob:example.org", Some(HS_TOKEN))
            .await
            .is_ok());
        assert!(gateway
            .on_user_query("@irc_bob:example.org", Some("as_token_value"))
            .await
            .is_err());
    }

    // =============================================================================
    // TRANSACTIONS
    // =============================================================================

    #[tokio::test]
    async fn test_transaction_fans_out_in_order() {
        let (gateway, bus) = gateway_for(&bridge_registration());
        let all = recorder(&bus, Channel::Event);
        let messages = recorder(&bus, Channel::of_type("m.room.message"));
        let typing = recorder(&bus, Channel::of_ephemeral_type("m.typing"));

        let outcome = gateway
            .on_transaction(
                "t1",
                body(json!({
                    "events": [
                        {"type": "m.room.message", "n": 1},
                        {"n": 2},
                        {"type": "m.room.member", "n": 3},
                        {"type": "m.room.message", "n": 4}
                    ],
                    "de.sorunome.msc2409.ephemeral": [{"type": "m.typing", "n": 5}]
                })),
                Some(HS_TOKEN),
            )
            .await
            .unwrap();

        assert_eq!(outcome, TransactionOutcome::Processed { events: 4, ephemeral: 1 });
        let order: Vec<_> = all.lock().iter().map(|v| v["n"].clone()).collect();
        assert_eq!(order, vec![json!(1), json!(2), json!(3), json!(4)]);
        assert_eq!(messages.lock().len(), 2);
        assert_eq!(typing.lock().len(), 1);
        assert_eq!(gateway.last_processed_txn_id().await.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_replay_is_suppressed_until_next_id() {
        let (gateway, bus) = gateway_for(&bridge_registration());
        let all = recorder(&bus, Channel::Event);
        let batch = || body(json!({"events": [{"type": "m.room.message"}]}));

        for txn_id in ["t1", "t1", "t2", "t1"] {
            gateway
                .on_transaction(txn_id, batch(), Some(HS_TOKEN))
                .await
                .unwrap();
        }

        assert_eq!(all.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_t1_t2_then_t1_replay() {
        let (gateway, bus) = gateway_for(&bridge_registration());
        let all = recorder(&bus, Channel::Event);

        gateway
            .on_transaction("t1", body(json!({"events": [{"n": 1}]})), Some(HS_TOKEN))
            .await
            .unwrap();
        gateway
            .on_transaction("t2", body(json!({"events": [{"n": 2}]})), Some(HS_TOKEN))
            .await
            .unwrap();
        assert_eq!(all.lock().len(), 2);

        let replay = gateway
            .on_transaction("t1", body(json!({"events": [{"n": 3}]})), Some(HS_TOKEN))
            .await
            .unwrap();

        assert_eq!(replay, TransactionOutcome::Replayed);
        let order: Vec<_> = all.lock().iter().map(|v| v["n"].clone()).collect();
        assert_eq!(order, vec![json!(1), json!(2)]);
        assert_eq!(gateway.last_processed_txn_id().await.as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn test_failing_subscriber_does_not_block_commit() {
        let (gateway, bus) = gateway_for(&bridge_registration());
        bus.subscribe_handler(
            Channel::Event,
            handler_fn(|_: &Event| Err(HandlerError::failed("bridge offline"))),
        );
        let healthy = recorder(&bus, Channel::Event);

        let outcome = gateway
            .on_transaction("t1", body(json!({"events": [{"n": 1}]})), Some(HS_TOKEN))
            .await
            .unwrap();

        assert_eq!(outcome, TransactionOutcome::Processed { events: 1, ephemeral: 0 });
        assert_eq!(healthy.lock().len(), 1);
        assert_eq!(bus.handler_failures(), 1);
        assert_eq!(gateway.last_processed_txn_id().await.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_rejected_transaction_leaves_state_untouched() {
        let (gateway, bus) = gateway_for(&bridge_registration());

        let forbidden = gateway
            .on_transaction("t1", body(json!({"events": []})), Some("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(forbidden, Rejection::Api(ref e) if e.errcode == ErrCode::Forbidden));

        let malformed = gateway
            .on_transaction("t1", body(json!({})), Some(HS_TOKEN))
            .await
            .unwrap_err();
        assert!(matches!(malformed, Rejection::Malformed(_)));

        assert_eq!(gateway.last_processed_txn_id().await, None);
        assert_eq!(bus.events_published(), 0);
    }

    #[tokio::test]
    async fn test_token_rotation() {
        let (gateway, _bus) = gateway_for(&bridge_registration());
        gateway.set_homeserver_token("rotated");

        assert!(gateway.authenticate(Some(HS_TOKEN)).is_err());
        assert!(gateway.authenticate(Some("rotated")).is_ok());
    }

    #[tokio::test]
    async fn test_stream_subscription_sees_ephemeral_after_events() {
        let (gateway, bus) = gateway_for(&bridge_registration());
        let mut events = bus.subscribe_stream(Channel::Event);
        let mut ephemeral = bus.subscribe_stream(Channel::Ephemeral);

        gateway
            .on_transaction(
                "t9",
                body(json!({
                    "events": [{"type": "m.room.message"}],
                    "ephemeral": [{"type": "m.receipt"}]
                })),
                Some(HS_TOKEN),
            )
            .await
            .unwrap();

        assert_eq!(
            events.try_recv().unwrap().unwrap().event_type(),
            Some("m.room.message")
        );
        assert_eq!(
            ephemeral.try_recv().unwrap().unwrap().event_type(),
            Some("m.receipt")
        );
        assert!(matches!(events.try_recv(), Ok(None)));
    }
}
