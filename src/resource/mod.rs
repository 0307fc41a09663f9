//! Resource reconciliation core
//!
//! This module turns declared add-ons and log drains into Heroku API calls
//! and back into persisted records.
//!
//! # Architecture
//!
//! - [`controller`] - Common controller interface and change classification
//! - [`addon`] / [`drain`] - Per-kind controllers
//! - [`matcher`] - Identity matching used by adoption
//! - [`flatten`] - Config flattening for attribute tables
//! - [`gate`] - Per-account serialization of add-on creation
//! - [`plan_name`] - Plan qualifier normalization
//! - [`model`] - Records, declarations and attribute tables
//!
//! # Example
//!
//! ```ignore
//! use hrec::resource::{AddonController, AddonDeclaration, GateRegistry, ResourceController};
//!
//! async fn provision(client: Arc<dyn AddonApi>, gates: &GateRegistry) -> hrec::Result<()> {
//!     let controller = AddonController::new(client, gates.gate_for("ops@example.com"));
//!     let mut record = controller.desired(&AddonDeclaration::new("app1", "heroku-redis"))?;
//!     controller.create(&mut record).await
//! }
//! ```

pub mod addon;
pub mod controller;
pub mod drain;
pub mod flatten;
pub mod gate;
pub mod matcher;
pub mod model;
pub mod plan_name;

pub use addon::AddonController;
pub use controller::{Change, ResourceController};
pub use drain::DrainController;
pub use flatten::{flatten, unflatten, ConfigEntry, FlatConfig};
pub use gate::{GateRegistry, SerializationGate};
pub use model::{
    AddonDeclaration, AddonRecord, Attributes, DrainDeclaration, DrainRecord, Managed,
    ResourceKind,
};
