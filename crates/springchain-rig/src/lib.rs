//! Spring Chain Rig Generator
//!
//! This crate turns a connected chain of bones into a spring-simulated rig
//! with manual controls, a blended deformation chain and a read-only preview
//! chain, and emits the panel script the host uses to expose its knobs.
//!
//! # Overview
//!
//! Generation runs in two phases against a host skeleton:
//!
//! 1. **Edit phase** - duplicate the source chain five times, parent the
//!    copies, align every copy's roll to its source bone
//! 2. **Pose phase** - widgets, locks and collections, custom properties,
//!    constraints and drivers
//!
//! The phases are enforced by [`EditSession`] and [`PoseSession`]: the edit
//! session is consumed by [`EditSession::commit`], so no structural edit can
//! happen once runtime configuration has started.
//!
//! # Unify mode
//!
//! | `unify_spring_props` | Knobs | Spring constraint parameters |
//! |--------|-----------|------|
//! | `true` | 9 shared knobs on the prop bone, 3 factor knobs per spring | Driven: `var` or `var * factor` |
//! | `false` | `follow_spring` only | Set directly, exposed per spring in the UI |
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use springchain_rig::{generate, MemoryArmature};
//! use springchain_spec::SpringChainParams;
//!
//! let mut armature = MemoryArmature::new("Armature");
//! armature
//!     .add_chain(&["ORG-tail.01", "ORG-tail.02", "ORG-tail.03"], None, DVec3::ZERO, DVec3::Y, 0.0)
//!     .unwrap();
//!
//! let scripts = generate(&mut armature, "ORG-tail.01", &SpringChainParams::default()).unwrap();
//! assert_eq!(scripts.len(), 1);
//! assert!(scripts[0].contains("prop_bone = \"ORG-tail.01\""));
//! ```
//!
//! # Hosts
//!
//! Anything implementing [`Armature`] can be rigged. [`MemoryArmature`] is a
//! complete in-memory host that enforces modes and evaluates drivers.
//!
//! # Crate Structure
//!
//! - [`armature`] - Host capability trait
//! - [`session`] - Two-phase edit protocol
//! - [`memory`] - In-memory reference host
//! - [`roll`] - Roll alignment
//! - [`chain`] - Chain duplication
//! - [`topology`] - Parenting and roll alignment of derived chains
//! - [`display`] - Widgets, locks and bone collections
//! - [`properties`] - Knob declaration and driver binding
//! - [`wiring`] - Constraints and drivers
//! - [`ui_script`] - Panel script emission
//! - [`metrics`] - Generation report
//! - [`generator`] - Entry point

pub mod armature;
pub mod chain;
pub mod display;
pub mod error;
pub mod generator;
pub mod memory;
pub mod metrics;
pub mod properties;
pub mod roll;
pub mod session;
pub mod topology;
pub mod ui_script;
pub mod wiring;

pub use armature::{Armature, BoneGeometry, ChildLink, Mode, ParentMode};
pub use chain::{DerivedBone, DerivedChain, DerivedChains};
pub use error::{RigError, RigResult};
pub use generator::{generate, SpringChainRig};
pub use memory::MemoryArmature;
pub use metrics::{RigMetrics, RigReport};
pub use properties::KnobSet;
pub use roll::{align_roll, BoneFrame};
pub use session::{EditSession, PoseSession, SessionStats};
pub use wiring::SpringLookup;
