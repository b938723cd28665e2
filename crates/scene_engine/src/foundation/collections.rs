//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a node stored in the scene arena.
    ///
    /// Handles are generational: a handle to a destroyed node never aliases a
    /// node created later in the same slot.
    pub struct NodeId;
}

/// Arena holding every node of a scene, keyed by [`NodeId`]
pub type NodeArena<T> = SlotMap<NodeId, T>;

/// Iterate the indices of the set bits of `mask`, lowest first.
///
/// Used for the per-group fan-out of camera-group masks; runs in
/// `popcount(mask)` steps rather than a fixed 64.
pub fn set_bits(mask: u64) -> impl Iterator<Item = usize> {
    let mut remaining = mask;
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        let bit = remaining.trailing_zeros() as usize;
        remaining &= remaining - 1;
        Some(bit)
    })
}
