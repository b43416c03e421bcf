//! Common types for Drydock.
//!
//! This crate provides the small set of types shared by the Drydock crates:
//!
//! - [`BlueprintGuid`] - Deterministic blueprint identifier in canonical GUID form

mod guid;

pub use guid::BlueprintGuid;
