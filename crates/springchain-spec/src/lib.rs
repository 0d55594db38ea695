//! Spring Chain Rig Types
//!
//! This crate provides the data types shared by the spring chain rig generator.
//! Nothing here talks to a host application; every type is plain data that can
//! be serialized with serde.
//!
//! # Overview
//!
//! A spring chain rig turns one connected chain of source bones into five
//! index-aligned derived chains:
//!
//! - **Deform** (`DEF-<name>`) - drives the mesh, blends manual and spring motion
//! - **Spring source** (`MCH-<name>_source`) - rest frame of each spring link
//! - **Spring target** (`MCH-<name>_target`) - carries the spring constraint
//! - **Control** (`<name>`) - what animators pose
//! - **Preview** (`<name>_preview`) - locked, shows the simulated result
//!
//! # Example
//!
//! ```
//! use springchain_spec::{BoneRole, DerivedName, SpringChainParams};
//!
//! let name = DerivedName::from_source(BoneRole::SpringTarget, "ORG-tail.01");
//! assert_eq!(name.to_host_name(), "MCH-tail.01_target");
//! assert_eq!(name.display_name(), "tail.01");
//!
//! let params = SpringChainParams::default();
//! assert!(params.unify_spring_props);
//! assert!(params.validate().is_ok());
//! ```
//!
//! # Modules
//!
//! - [`naming`]: Bone roles and derived bone identities
//! - [`params`]: Generation parameters
//! - [`spring`]: Tunable spring constraint properties
//! - [`knob`]: Custom numeric property declarations
//! - [`driver`]: Driver expressions and variable bindings
//! - [`constraint`]: Bone constraint descriptions
//! - [`widget`], [`locks`], [`collection`]: Display and organization aids
//! - [`error`]: Error types

pub mod collection;
pub mod constraint;
pub mod driver;
pub mod error;
pub mod knob;
pub mod locks;
pub mod naming;
pub mod params;
pub mod spring;
pub mod widget;

// Re-export commonly used types at the crate root
pub use collection::{BoneCollection, BoneCollectionPreset};
pub use constraint::{BoneConstraint, ConstraintKind, TransformSpace};
pub use driver::{Driver, DriverExpr, DriverTarget, DriverVariable, PropertyPath};
pub use error::{CodedError, ParamsError};
pub use knob::{KnobSpec, FOLLOW_SPRING_KNOB};
pub use locks::TransformLocks;
pub use naming::{strip_org, BoneRole, DerivedName};
pub use params::{DeformBlend, PreviewSource, SpringChainParams, MIN_CHAIN_LENGTH};
pub use spring::SpringProperty;
pub use widget::WidgetStyle;
