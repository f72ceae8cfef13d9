//! Control-plane layer.
//!
//! Owns the address/queue binding table. Reads go through lock-free snapshots held
//! by [`BindingRegistry`]; every mutation is funnelled through the lifecycle guard,
//! which serializes writers, validates names and publishes the next snapshot in one
//! atomic swap.
//!
//! ```
//! use composite_router::{BindingRegistry, RoutingError, RoutingType};
//!
//! let registry = BindingRegistry::new();
//! registry
//!     .create_binding("address.anycast", "q1", RoutingType::Anycast, true)
//!     .unwrap();
//!
//! // Queue names are global: the same name under another address is rejected.
//! assert!(matches!(
//!     registry.create_binding("address.other", "q1", RoutingType::Anycast, true),
//!     Err(RoutingError::DuplicateQueue { .. })
//! ));
//!
//! registry.remove_binding("q1").unwrap();
//! assert!(registry.remove_binding("q1").unwrap_err().is_not_found());
//!
//! // The address stays behind as an empty placeholder.
//! assert!(registry.bindings_for_address("address.anycast").is_empty());
//! ```

pub(crate) mod binding_lifecycle;
pub(crate) mod binding_registry;
