//! Parent topology of the derived chains.
//!
//! - Control bones form a connected chain hanging from the original parent.
//! - Deform and preview bones have no parent; constraints move them.
//! - Each spring target hangs off its own spring source, and each spring
//!   source after the first hangs off the previous spring target. The spring
//!   displacement of link `i` therefore becomes the rest frame of link `i + 1`.
//! - The first spring source hangs off the original parent.
//!
//! Mechanism links keep their offset so the rest pose is unchanged.

use tracing::debug;

use crate::armature::{Armature, ParentMode};
use crate::chain::DerivedChains;
use crate::error::RigResult;
use crate::roll::align_roll;
use crate::session::EditSession;

/// Establishes parent relationships across and within the derived chains.
pub fn build_topology<A: Armature + ?Sized>(
    session: &mut EditSession<'_, A>,
    chains: &DerivedChains,
    original_parent: Option<&str>,
) -> RigResult<()> {
    let mut previous: Option<&str> = None;
    for control in chains.control.iter_names() {
        match previous {
            Some(parent) => session.set_parent(control, Some(parent), ParentMode::Connected)?,
            None => session.set_parent(control, original_parent, ParentMode::KeepOffset)?,
        }
        previous = Some(control);
    }

    for bone in chains.deform.iter_names().chain(chains.preview.iter_names()) {
        session.set_parent(bone, None, ParentMode::KeepOffset)?;
    }

    let sources = &chains.spring_source.bones;
    let targets = &chains.spring_target.bones;
    if let Some(first) = sources.first() {
        session.set_parent(&first.name, original_parent, ParentMode::KeepOffset)?;
    }
    for (i, (source, target)) in sources.iter().zip(targets).enumerate() {
        session.set_parent(&target.name, Some(&source.name), ParentMode::KeepOffset)?;
        if let Some(next) = sources.get(i + 1) {
            session.set_parent(&next.name, Some(&target.name), ParentMode::KeepOffset)?;
        }
    }

    debug!(
        chain_length = chains.len(),
        original_parent = original_parent.unwrap_or("<none>"),
        "topology built"
    );
    Ok(())
}

/// Aligns every derived bone's roll to its source bone.
pub fn align_chain_rolls<A: Armature + ?Sized>(
    session: &mut EditSession<'_, A>,
    source: &[String],
    chains: &DerivedChains,
) -> RigResult<()> {
    for chain in chains.iter() {
        for (original, derived) in source.iter().zip(chain.iter_names()) {
            align_roll(session, original, derived)?;
        }
    }
    debug!(count = chains.bone_count(), "rolls aligned");
    Ok(())
}
