//! Canonical structured event names used across `composite-router`.

// Registry and lifecycle events.
pub const ADDRESS_CREATE_OK: &str = "address_create_ok";
pub const ADDRESS_ROUTING_TYPE_MERGED: &str = "address_routing_type_merged";
pub const BINDING_CREATE_OK: &str = "binding_create_ok";
pub const BINDING_CREATE_REJECTED: &str = "binding_create_rejected";
pub const BINDING_REMOVE_OK: &str = "binding_remove_ok";
pub const BINDING_REMOVE_MISSING: &str = "binding_remove_missing";
pub const BINDING_AUTO_DELETE: &str = "binding_auto_delete";
pub const REGISTRY_CLEARED: &str = "registry_cleared";

// Consumer attachment events.
pub const CONSUMER_ATTACH_OK: &str = "consumer_attach_ok";
pub const CONSUMER_ATTACH_REJECTED: &str = "consumer_attach_rejected";
pub const CONSUMER_DETACH: &str = "consumer_detach";

// Resolution events.
pub const RESOLVE_OK: &str = "resolve_ok";
pub const RESOLVE_NOT_FOUND: &str = "resolve_not_found";
pub const RESOLVE_INVALID_DESTINATION: &str = "resolve_invalid_destination";
pub const ANYCAST_SELECT: &str = "anycast_select";

// Delivery and broker facade events.
pub const SEND_DISPATCH: &str = "send_dispatch";
pub const SEND_DROPPED_NO_BINDINGS: &str = "send_dropped_no_bindings";
pub const QUEUE_ENQUEUE: &str = "queue_enqueue";
pub const QUEUE_DISCARD: &str = "queue_discard";
pub const AUTO_CREATE_QUEUE: &str = "auto_create_queue";
pub const AUTO_CREATE_ADDRESS: &str = "auto_create_address";
pub const BROKER_START: &str = "broker_start";
pub const BROKER_SHUTDOWN: &str = "broker_shutdown";
