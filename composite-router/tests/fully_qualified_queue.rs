mod support;

use composite_router::{RoutingError, RoutingType};
use integration_test_utils::{numbered_message, sequence_of};
use support::{assert_create_queue_ok, make_broker, make_strict_broker, WAIT};

const ANYCAST_ADDRESS: &str = "address.anycast";

#[tokio::test(flavor = "multi_thread")]
async fn anycast_queues_are_consumed_and_queried_by_fully_qualified_name() {
    let broker = make_broker("fqqn-anycast");
    for queue in ["q1", "q2", "q3"] {
        assert_create_queue_ok(&broker, ANYCAST_ADDRESS, queue, RoutingType::Anycast);
    }

    let consumers: Vec<_> = ["q1", "q2", "q3"]
        .iter()
        .map(|queue| {
            broker
                .create_consumer(&format!("{ANYCAST_ADDRESS}::{queue}"))
                .expect("fully qualified consumer should attach")
        })
        .collect();

    for sequence in 0..3 {
        assert_eq!(
            broker
                .send(ANYCAST_ADDRESS, RoutingType::Anycast, numbered_message(sequence))
                .await,
            Ok(1)
        );
    }

    let mut sequences = Vec::new();
    for consumer in &consumers {
        let message = consumer
            .receive(WAIT)
            .await
            .expect("each queue should get exactly one message");
        sequences.push(sequence_of(&message).expect("sequence property should be set"));
        assert!(consumer.receive_no_wait().await.is_none());
    }
    sequences.sort_unstable();
    assert_eq!(sequences, vec![0, 1, 2]);

    for queue in ["q1", "q2", "q3"] {
        let fqqn = format!("{ANYCAST_ADDRESS}::{queue}");
        let result = broker.query_queue(&fqqn);
        assert!(result.exists);
        assert_eq!(result.name.map(|name| name.to_string()), Some(fqqn));
        assert_eq!(result.address.as_deref(), Some(ANYCAST_ADDRESS));
        assert_eq!(result.routing_type, Some(RoutingType::Anycast));
        assert_eq!(result.message_count, Some(0));
        assert_eq!(result.consumer_count, Some(1));

        let plain = broker.query_queue(queue);
        assert!(plain.exists);
        assert_eq!(plain.name.map(|name| name.to_string()).as_deref(), Some(queue));
        assert_eq!(plain.address.as_deref(), Some(ANYCAST_ADDRESS));
    }
}

#[tokio::test]
async fn address_sends_before_any_consumer_land_one_per_queue() {
    let broker = make_broker("fqqn-send-first");
    for queue in ["q1", "q2", "q3"] {
        assert_create_queue_ok(&broker, ANYCAST_ADDRESS, queue, RoutingType::Anycast);
    }

    for sequence in 0..3 {
        assert_eq!(
            broker
                .send(ANYCAST_ADDRESS, RoutingType::Anycast, numbered_message(sequence))
                .await,
            Ok(1)
        );
    }

    let mut sequences = Vec::new();
    for queue in ["q1", "q2", "q3"] {
        let fqqn = format!("{ANYCAST_ADDRESS}::{queue}");
        assert_eq!(broker.query_queue(&fqqn).message_count, Some(1));

        let consumer = broker
            .create_consumer(&fqqn)
            .expect("fully qualified consumer should attach");
        let message = consumer
            .receive(WAIT)
            .await
            .expect("each queue should hold exactly one message");
        sequences.push(sequence_of(&message).expect("sequence property should be set"));
        assert!(consumer.receive_no_wait().await.is_none());

        let result = broker.query_queue(&fqqn);
        assert!(result.exists);
        assert_eq!(result.name.map(|name| name.to_string()), Some(fqqn));
        assert_eq!(result.message_count, Some(0));
        assert_eq!(
            broker
                .query_queue(queue)
                .name
                .map(|name| name.to_string())
                .as_deref(),
            Some(queue)
        );
    }
    sequences.sort_unstable();
    assert_eq!(sequences, vec![0, 1, 2]);
}

#[tokio::test]
async fn messages_wait_in_the_selected_queue_until_consumed() {
    let broker = make_strict_broker("fqqn-backlog");
    assert_create_queue_ok(&broker, ANYCAST_ADDRESS, "q1", RoutingType::Anycast);
    assert_create_queue_ok(&broker, ANYCAST_ADDRESS, "q2", RoutingType::Anycast);

    for sequence in 0..4 {
        broker
            .send(
                &format!("{ANYCAST_ADDRESS}::q2"),
                RoutingType::Anycast,
                numbered_message(sequence),
            )
            .await
            .expect("send to a fully qualified queue should succeed");
    }

    assert_eq!(broker.query_queue("address.anycast::q2").message_count, Some(4));
    assert_eq!(broker.query_queue("address.anycast::q1").message_count, Some(0));

    let consumer = broker
        .create_consumer("address.anycast::q2")
        .expect("consumer should attach");
    for expected in 0..4 {
        let message = consumer.receive(WAIT).await.expect("backlog should drain");
        assert_eq!(sequence_of(&message), Some(expected));
    }
}

#[tokio::test]
async fn special_queue_names() {
    let broker = make_broker("fqqn-special");
    assert_create_queue_ok(&broker, ANYCAST_ADDRESS, "q1", RoutingType::Anycast);

    let consumer = broker
        .create_consumer("::q1")
        .expect("queue-only name should select the queue");
    assert_eq!(consumer.address(), ANYCAST_ADDRESS);
    assert_eq!(consumer.queue_name(), "q1");

    for malformed in ["q1::", "::"] {
        assert!(matches!(
            broker.create_consumer(malformed),
            Err(RoutingError::InvalidDestination { .. })
        ));
        assert!(matches!(
            broker
                .send(malformed, RoutingType::Anycast, numbered_message(0))
                .await,
            Err(RoutingError::InvalidDestination { .. })
        ));
        assert!(!broker.query_queue(malformed).exists);
    }

    let queue_only = broker.query_queue("::q1");
    assert!(queue_only.exists);
    assert_eq!(
        queue_only.name.map(|name| name.to_string()).as_deref(),
        Some("address.anycast::q1")
    );
    assert_eq!(broker.registry().queue_count(), 1);
}

#[tokio::test]
async fn qualified_name_must_match_the_owning_address() {
    let broker = make_broker("fqqn-mismatch");
    assert_create_queue_ok(&broker, ANYCAST_ADDRESS, "q1", RoutingType::Anycast);
    assert_create_queue_ok(&broker, "address.other", "q2", RoutingType::Anycast);

    assert!(broker
        .create_consumer("address.other::q1")
        .unwrap_err()
        .is_not_found());
    assert!(broker
        .send("address.other::q1", RoutingType::Anycast, numbered_message(0))
        .await
        .unwrap_err()
        .is_not_found());
    assert!(!broker.query_queue("address.other::q1").exists);
    assert!(!broker.query_queue("address.missing::q1").exists);
}
