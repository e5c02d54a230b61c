//! The two comparison slots.
//!
//! Toggling a slot with the id it already holds empties it; toggling with
//! any other id overwrites the slot. The two slots are independent: the same
//! id may sit in both at once.

use serde::Serialize;
use std::fmt;

use crate::client::types::ApplianceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Slot {
    A,
    B,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::A => f.write_str("A"),
            Slot::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    a: Option<ApplianceId>,
    b: Option<ApplianceId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&ApplianceId> {
        match slot {
            Slot::A => self.a.as_ref(),
            Slot::B => self.b.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<ApplianceId> {
        match slot {
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
        }
    }

    /// Apply one toggle and return what the slot now holds.
    pub fn toggle(&mut self, slot: Slot, id: ApplianceId) -> Option<&ApplianceId> {
        let current = self.slot_mut(slot);
        if current.as_ref() == Some(&id) {
            *current = None;
        } else {
            *current = Some(id);
        }
        self.get(slot)
    }

    /// Whether `id` sits in either slot.
    pub fn contains(&self, id: &ApplianceId) -> bool {
        self.a.as_ref() == Some(id) || self.b.as_ref() == Some(id)
    }

    /// Slots holding `id`, in A, B order.
    pub fn slots_of(&self, id: &ApplianceId) -> Vec<Slot> {
        [Slot::A, Slot::B]
            .into_iter()
            .filter(|slot| self.get(*slot) == Some(id))
            .collect()
    }

    /// Both ids, when both slots are filled.
    pub fn pair(&self) -> Option<(&ApplianceId, &ApplianceId)> {
        match (&self.a, &self.b) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_none() && self.b.is_none()
    }
}
