use composite_router::{Broker, BrokerSettings, QueueBinding, QueueDeclaration, RoutingType};
use integration_test_utils::{init_logging, CountingQueueStore};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const WAIT: Duration = Duration::from_millis(500);
#[allow(dead_code)]
pub(crate) const QUIET: Duration = Duration::from_millis(50);

pub(crate) fn make_broker(name: &str) -> Broker {
    init_logging();
    Broker::new(name, BrokerSettings::default())
}

#[allow(dead_code)]
pub(crate) fn make_strict_broker(name: &str) -> Broker {
    init_logging();
    Broker::new(
        name,
        BrokerSettings {
            auto_create_queues: false,
            auto_create_addresses: false,
            auto_delete_queues: true,
        },
    )
}

#[allow(dead_code)]
pub(crate) fn make_counting_broker(name: &str) -> (Broker, Arc<CountingQueueStore>) {
    init_logging();
    let store = Arc::new(CountingQueueStore::new());
    let broker = Broker::with_store(name, BrokerSettings::default(), store.clone());
    (broker, store)
}

pub(crate) fn assert_create_queue_ok(
    broker: &Broker,
    address: &str,
    queue: &str,
    routing_type: RoutingType,
) -> QueueBinding {
    broker
        .create_queue(QueueDeclaration::new(address, queue, routing_type).durable(true))
        .expect("queue creation should succeed")
}
