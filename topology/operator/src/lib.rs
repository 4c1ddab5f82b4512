#![warn(clippy::indexing_slicing)]

//! Data model, admission and teardown policy of the `Shovel` custom resource.
//!
//! A shovel moves messages from a source endpoint to a destination endpoint of a RabbitMQ
//! cluster. This crate owns everything that happens to a [`ShovelCrd`](crd::shovel::ShovelCrd)
//! before a reconciler gets to see it:
//!
//! - [`crd`] holds the resource types and the closed enumerations they accept;
//! - [`admission`] fills in defaults and rejects illegal values when the resource is created or
//!   updated;
//! - [`definition`] renders an accepted spec into the parameter document of the broker's
//!   management API.

pub mod admission;
pub mod crd;
pub mod definition;
