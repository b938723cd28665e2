//! Per-group lists of active cameras

use std::fmt::Debug;

use crate::foundation::collections::set_bits;

use super::{IndexError, MAX_CAMERA_GROUP_COUNT};

/// Cameras bucketed by camera-group bit, in registration order
#[derive(Debug, Clone)]
pub struct CameraRegistry<E> {
    groups: Vec<Vec<E>>,
    masks: Vec<(E, u64)>,
}

impl<E> Default for CameraRegistry<E> {
    fn default() -> Self {
        Self {
            groups: (0..MAX_CAMERA_GROUP_COUNT).map(|_| Vec::new()).collect(),
            masks: Vec::new(),
        }
    }
}

impl<E> CameraRegistry<E>
where
    E: Copy + PartialEq + Debug,
{
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `camera` in every group of `group`
    pub fn add_camera(&mut self, camera: E, group: u64) -> Result<(), IndexError> {
        if self.position(camera).is_some() {
            return Err(IndexError::AlreadyRegistered(format!("camera {camera:?}")));
        }

        for bit in set_bits(group) {
            self.groups[bit].push(camera);
        }
        self.masks.push((camera, group));
        Ok(())
    }

    /// Unregister `camera`, keyed on the mask it was last registered with
    pub fn remove_camera(&mut self, camera: E, group: u64) -> Result<(), IndexError> {
        let slot = self.checked_slot(camera, group)?;

        for bit in set_bits(group) {
            self.groups[bit].retain(|c| *c != camera);
        }
        self.masks.remove(slot);
        Ok(())
    }

    /// Move `camera` between groups for the bits that differ between `old` and `new`
    pub fn update_group(&mut self, camera: E, old: u64, new: u64) -> Result<(), IndexError> {
        let slot = self.checked_slot(camera, old)?;

        for bit in set_bits(old & !new) {
            self.groups[bit].retain(|c| *c != camera);
        }
        for bit in set_bits(new & !old) {
            self.groups[bit].push(camera);
        }
        self.masks[slot].1 = new;
        Ok(())
    }

    /// Cameras of one group in registration order; empty for out-of-range groups
    pub fn cameras(&self, group: usize) -> &[E] {
        self.groups.get(group).map_or(&[], Vec::as_slice)
    }

    /// Total registered cameras, including those with an empty mask
    pub fn count(&self) -> usize {
        self.masks.len()
    }

    /// Every registered camera in registration order, whatever its mask
    pub fn iter(&self) -> impl Iterator<Item = E> + '_ {
        self.masks.iter().map(|(camera, _)| *camera)
    }

    /// True if `camera` is registered
    pub fn contains(&self, camera: E) -> bool {
        self.position(camera).is_some()
    }

    fn position(&self, camera: E) -> Option<usize> {
        self.masks.iter().position(|(c, _)| *c == camera)
    }

    fn checked_slot(&self, camera: E, group: u64) -> Result<usize, IndexError> {
        let slot = self
            .position(camera)
            .ok_or_else(|| IndexError::NotRegistered(format!("camera {camera:?}")))?;
        let recorded = self.masks[slot].1;
        if recorded != group {
            return Err(IndexError::GroupMismatch {
                element: format!("camera {camera:?}"),
                recorded,
                supplied: group,
            });
        }
        Ok(slot)
    }
}
