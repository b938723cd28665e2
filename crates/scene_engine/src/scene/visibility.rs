//! Derived visibility of drawables
//!
//! `is_drawn_actually` is `is_drawn` AND-ed with every drawable ancestor of
//! the same dimension. It is recomputed eagerly for the affected subtree on
//! every toggle and on every attach or detach, so dispatch can read it as is.

use crate::foundation::collections::NodeId;

use super::tree::PerDimension;
use super::{Dimension, SceneTree};

impl SceneTree {
    /// True when every same-dimension drawable strictly above `id` is drawn
    fn ancestors_drawn(&self, id: NodeId, dimension: Dimension) -> bool {
        self.ancestors(id)
            .filter_map(|ancestor| self.nodes.get(ancestor)?.drawn())
            .filter(|drawn| drawn.dimension() == dimension)
            .all(|drawn| drawn.is_drawn())
    }

    /// Re-derive `is_drawn_actually` for `start` and everything below it
    pub(crate) fn refresh_visibility(&mut self, start: NodeId) {
        if !self.nodes.contains_key(start) {
            return;
        }
        let seed = PerDimension::from_fn(|dimension| self.ancestors_drawn(start, dimension));

        let mut stack = vec![(start, seed)];
        while let Some((id, mut visible)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if let Some(drawn) = node.drawn_mut() {
                let actually = visible[drawn.dimension] && drawn.is_drawn;
                drawn.is_drawn_actually = actually;
                visible[drawn.dimension] = actually;
            }
            stack.extend(node.children.iter().rev().map(|child| (*child, visible)));
        }
    }
}
