//! Widgets, transform locks and bone collections.

use springchain_spec::{SpringChainParams, TransformLocks};
use tracing::debug;

use crate::armature::Armature;
use crate::chain::DerivedChains;
use crate::error::RigResult;
use crate::session::PoseSession;

/// Applies custom shapes, preview locks and collection membership.
pub fn apply_display<A: Armature + ?Sized>(
    session: &mut PoseSession<'_, A>,
    chains: &DerivedChains,
    params: &SpringChainParams,
) -> RigResult<()> {
    for bone in chains.control.iter_names() {
        session.set_widget(bone, params.control_widget)?;
    }
    for bone in chains.preview.iter_names() {
        session.set_widget(bone, params.preview_widget)?;
        if params.lock_preview {
            session.set_locks(bone, TransformLocks::all())?;
        }
    }

    if params.collections {
        for chain in chains.iter() {
            let collection = chain.role.collection_preset().to_collection();
            for bone in chain.iter_names() {
                session.assign_collection(bone, &collection)?;
            }
        }
    }

    debug!(
        lock_preview = params.lock_preview,
        collections = params.collections,
        "display applied"
    );
    Ok(())
}
