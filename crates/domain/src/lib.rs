//! Domain layer for explaincast
//!
//! Contains the scene plan entities, value objects, and domain errors.
//! This layer has no external dependencies and defines the ubiquitous language:
//! a planner produces a `ScenePlan`, each `Scene` carries narration and a
//! kind-specific visual payload, and composition produces a `ComposedVideo`.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
