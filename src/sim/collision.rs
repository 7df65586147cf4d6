//! Spatial queries over the registry
//!
//! Both queries are linear scans over every live entity in category order.
//! There is no spatial index: category precedence is the tie-break, so the
//! first match in scan order is the one that counts.

use super::entity::EntityId;
use super::rect::Rect;
use super::registry::{Category, Registry, Slot};

impl Registry {
    /// First collisional entity overlapping `rect`, skipping `exclude`.
    ///
    /// When nothing overlaps but `rect` pokes out of the arena, the border
    /// guarding that edge is returned instead (left, right, top, bottom).
    pub fn first_blocking(&self, rect: Rect, exclude: Option<EntityId>) -> Option<Slot> {
        for category in Category::ALL {
            let hit = self
                .slots(category)
                .find(|(_, entity)| {
                    entity.collisional && Some(entity.id) != exclude && entity.rect().overlaps(&rect)
                })
                .map(|(slot, _)| slot);
            if hit.is_some() {
                return hit;
            }
        }

        self.arena()
            .outside_edge(&rect)
            .and_then(|side| self.border(side))
    }

    /// Every collisional entity overlapping `rect`, in category order
    pub fn all_overlapping(&self, rect: Rect, exclude: Option<EntityId>) -> Vec<Slot> {
        let mut found = Vec::new();
        for category in Category::ALL {
            found.extend(
                self.slots(category)
                    .filter(|(_, entity)| {
                        entity.collisional
                            && Some(entity.id) != exclude
                            && entity.rect().overlaps(&rect)
                    })
                    .map(|(slot, _)| slot),
            );
        }
        found
    }
}
