mod support;

use composite_router::{QueueDeclaration, ResolvedTarget, RoutingError, RoutingType};
use integration_test_utils::{drain, numbered_message, sequence_of};
use std::sync::Arc;
use support::{make_broker, QUIET};
use tokio::task::JoinSet;

const TOPIC: &str = "address.concurrent";
const MESSAGES: usize = 200;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_declarations_of_one_queue_name_have_one_winner() {
    let broker = Arc::new(make_broker("race-declare"));
    let mut tasks = JoinSet::new();

    for index in 0..16 {
        let broker = broker.clone();
        tasks.spawn(async move {
            broker.create_queue(QueueDeclaration::new(
                &format!("address.{index}"),
                "contended",
                RoutingType::Anycast,
            ))
        });
    }

    let mut winners = 0;
    let mut duplicates = 0;
    while let Some(result) = tasks.join_next().await {
        match result.expect("task should not panic") {
            Ok(_) => winners += 1,
            Err(RoutingError::DuplicateQueue { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error {other}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(duplicates, 15);
    assert_eq!(broker.registry().queue_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stable_subscriber_sees_every_message_while_others_churn() {
    let broker = Arc::new(make_broker("race-churn"));
    let stable = broker.subscribe(TOPIC).expect("stable subscription");

    let churn = {
        let broker = broker.clone();
        tokio::spawn(async move {
            for _ in 0..MESSAGES {
                let transient = broker.subscribe(TOPIC).expect("transient subscription");
                let _ = transient.receive_no_wait().await;
                drop(transient);
                tokio::task::yield_now().await;
            }
        })
    };

    let sender = {
        let broker = broker.clone();
        tokio::spawn(async move {
            for sequence in 0..MESSAGES {
                let enqueued = broker
                    .send(TOPIC, RoutingType::Multicast, numbered_message(sequence))
                    .await
                    .expect("multicast send should succeed");
                assert!(enqueued >= 1);
                tokio::task::yield_now().await;
            }
        })
    };

    churn.await.expect("churn task should finish");
    sender.await.expect("sender task should finish");

    let sequences: Vec<_> = drain(&stable, QUIET)
        .await
        .iter()
        .filter_map(|message| sequence_of(message))
        .collect();
    assert_eq!(sequences, (0..MESSAGES).collect::<Vec<_>>());
    assert_eq!(broker.registry().queue_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_partial_bindings() {
    let broker = Arc::new(make_broker("race-readers"));

    let writer = {
        let broker = broker.clone();
        tokio::spawn(async move {
            for round in 0..MESSAGES {
                let queue = format!("q{}", round % 4);
                let _ = broker.create_queue(QueueDeclaration::new(
                    "address.anycast",
                    &queue,
                    RoutingType::Anycast,
                ));
                if round % 2 == 1 {
                    let _ = broker.delete_queue(&queue);
                }
                tokio::task::yield_now().await;
            }
        })
    };

    let resolver = broker.resolver().clone();
    let reader = tokio::spawn(async move {
        let mut hits = 0usize;
        for round in 0..MESSAGES * 4 {
            let name = format!("address.anycast::q{}", round % 4);
            match resolver.resolve(&name, composite_router::Intent::Query) {
                Ok(ResolvedTarget::Queue(binding)) => {
                    assert_eq!(binding.address(), "address.anycast");
                    assert_eq!(binding.fully_qualified_name().to_string(), name);
                    hits += 1;
                }
                Ok(other) => panic!("unexpected target {other:?}"),
                Err(err) => assert!(err.is_not_found()),
            }
            tokio::task::yield_now().await;
        }
        hits
    });

    writer.await.expect("writer should finish");
    let _hits = reader.await.expect("reader should finish");

    for info in broker.registry().addresses() {
        for queue in &info.queue_names {
            let binding = broker
                .registry()
                .binding_by_queue_name(queue)
                .expect("listed queue should be indexed");
            assert_eq!(binding.address(), info.name);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn auto_created_queue_is_recreated_after_auto_delete() {
    let broker = make_broker("race-auto-delete");

    for _ in 0..10 {
        let consumer = broker
            .create_consumer("jobs")
            .expect("auto-created queue should attach");
        assert_eq!(consumer.binding().consumer_count(), 1);
        drop(consumer);
        assert!(!broker.query_queue("jobs").exists);
    }
}
