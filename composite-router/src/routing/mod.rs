//! Name resolution layer.
//!
//! Turns a client-supplied name plus an explicit [`Intent`] into the bindings an
//! operation acts on. Resolution always works on one registry snapshot, so a fan-out
//! target is a point-in-time set that later registry changes do not touch.
//!
//! ```
//! use std::sync::Arc;
//! use composite_router::{BindingRegistry, Intent, ResolvedTarget, RoutingResolver, RoutingType};
//!
//! let registry = Arc::new(BindingRegistry::new());
//! for queue in ["q1", "q2", "q3"] {
//!     registry
//!         .create_binding("address.anycast", queue, RoutingType::Anycast, true)
//!         .unwrap();
//! }
//! let resolver = RoutingResolver::new(registry);
//!
//! // The qualified name picks one specific queue under the address.
//! match resolver.resolve("address.anycast::q2", Intent::Consume).unwrap() {
//!     ResolvedTarget::Queue(binding) => assert_eq!(binding.queue_name(), "q2"),
//!     other => panic!("unexpected target {other:?}"),
//! }
//!
//! // An address-only name cannot be consumed from.
//! assert!(resolver.resolve("address.anycast::", Intent::Consume).is_err());
//! ```

pub(crate) mod resolver;
