use crate::display::DisplayId;
use crate::error::{LayoutError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RingSlot {
    id: DisplayId,
    enabled: bool,
}

/// Cyclic, duplicate-free selection of displays for one layout role.
///
/// The active index is `Some` exactly when the ring is non-empty. Slots can be
/// disabled to drop them from cursor navigation without losing their place in
/// the ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRing {
    slots: Vec<RingSlot>,
    active: Option<usize>,
}

impl DisplayRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = DisplayId>) -> Self {
        let mut ring = Self::new();
        for id in ids {
            ring.add_display(id);
        }
        ring
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: DisplayId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: DisplayId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = DisplayId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    /// Append `id`. Adding an id that is already present is a no-op.
    pub fn add_display(&mut self, id: DisplayId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.slots.push(RingSlot { id, enabled: true });
        if self.active.is_none() {
            self.active = Some(0);
        }
        true
    }

    pub fn active(&self) -> Option<DisplayId> {
        self.active.map(|ix| self.slots[ix].id)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn get(&self, ix: usize) -> Result<DisplayId> {
        self.check(ix)?;
        Ok(self.slots[ix].id)
    }

    pub fn is_enabled(&self, ix: usize) -> Result<bool> {
        self.check(ix)?;
        Ok(self.slots[ix].enabled)
    }

    pub fn set_active(&mut self, ix: usize) -> Result<()> {
        self.check(ix)?;
        self.active = Some(ix);
        Ok(())
    }

    /// Place `id` at position `ix`. If `id` already sits elsewhere in the ring
    /// the two positions swap, keeping the ring free of duplicates.
    pub fn set_display_at(&mut self, ix: usize, id: DisplayId) -> Result<()> {
        self.check(ix)?;
        match self.position(id) {
            Some(existing) => self.slots.swap(existing, ix),
            None => self.slots[ix].id = id,
        }
        Ok(())
    }

    /// Move the cursor forward, skipping disabled slots.
    pub fn next(&mut self) {
        if let Some(ix) = self.step(1) {
            self.active = Some(ix);
        }
    }

    /// Move the cursor backward, skipping disabled slots.
    pub fn prev(&mut self) {
        if let Some(ix) = self.step(self.slots.len().saturating_sub(1)) {
            self.active = Some(ix);
        }
    }

    /// Demote the active display to the tail. The cursor keeps its index, so
    /// it lands on the display that followed the demoted one.
    pub fn next_with_push(&mut self) {
        let Some(ix) = self.active else {
            return;
        };
        if self.slots.len() > 1 {
            let slot = self.slots.remove(ix);
            self.slots.push(slot);
        }
    }

    /// Inverse of [`next_with_push`](Self::next_with_push): the tail display
    /// is brought back to the active index.
    pub fn prev_with_push(&mut self) {
        let Some(ix) = self.active else {
            return;
        };
        if self.slots.len() > 1 {
            if let Some(slot) = self.slots.pop() {
                self.slots.insert(ix, slot);
            }
        }
    }

    /// Rotate by `count` positions, used for paging through fixed-size views.
    pub fn push_by(&mut self, count: usize, forward: bool) {
        if self.slots.len() > 1 {
            let count = count % self.slots.len();
            if forward {
                self.slots.rotate_left(count);
            } else {
                self.slots.rotate_right(count);
            }
        }
    }

    /// Re-admit the slot at `ix` to cursor navigation.
    pub fn activate(&mut self, ix: usize) -> Result<()> {
        self.check(ix)?;
        self.slots[ix].enabled = true;
        Ok(())
    }

    /// Drop the slot at `ix` from cursor navigation. When it held the cursor,
    /// the cursor moves on to the next enabled slot if there is one.
    pub fn deactivate(&mut self, ix: usize) -> Result<()> {
        self.check(ix)?;
        self.slots[ix].enabled = false;
        if self.active == Some(ix) {
            if let Some(next) = self.step(1) {
                self.active = Some(next);
            }
        }
        Ok(())
    }

    /// Remove `id` if present. Removing the active display falls back to the
    /// nearest enabled slot before it, or to the clamped previous position
    /// when every slot is disabled.
    pub fn remove(&mut self, id: DisplayId) -> bool {
        let Some(ix) = self.position(id) else {
            return false;
        };
        self.slots.remove(ix);

        self.active = match self.active {
            _ if self.slots.is_empty() => None,
            Some(active) if active > ix => Some(active - 1),
            Some(active) if active == ix => {
                Some(self.enabled_at_or_before(active.saturating_sub(1)))
            }
            other => other,
        };
        true
    }

    fn enabled_at_or_before(&self, start: usize) -> usize {
        let size = self.slots.len();
        (0..size)
            .map(|back| (start + size - back) % size)
            .find(|&ix| self.slots[ix].enabled)
            .unwrap_or(start)
    }

    /// Swap the displays at the two positions.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        self.check(a)?;
        self.check(b)?;
        self.slots.swap(a, b);
        Ok(())
    }

    fn step(&self, stride: usize) -> Option<usize> {
        let size = self.slots.len();
        let start = self.active?;
        let mut ix = start;
        for _ in 0..size {
            ix = (ix + stride) % size;
            if ix == start {
                return None;
            }
            if self.slots[ix].enabled {
                return Some(ix);
            }
        }
        None
    }

    fn check(&self, ix: usize) -> Result<()> {
        if ix < self.slots.len() {
            Ok(())
        } else {
            Err(LayoutError::InvalidIndex {
                index: ix,
                len: self.slots.len(),
            })
        }
    }
}
