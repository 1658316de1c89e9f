//! Belt contents and the per-tick advancement step
//!
//! A [`Belt`] is a lane's item collection without any threading. The lane
//! worker runs [`Belt::advance`] once per tick under the lane lock.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::item::{Item, ItemId};
use super::snapshot::LaneSnapshot;

/// Fixed placement of one belt on the playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneGeometry {
    /// Top edge of the belt
    pub y: f32,
    pub height: f32,
    /// Items strictly past this x are lost
    pub playfield_width: f32,
    pub item_size: f32,
    /// X where new items appear
    pub start_x: f32,
}

impl LaneGeometry {
    /// Top of the item row (items are centered on the belt)
    pub fn item_y(&self) -> f32 {
        self.y + (self.height - self.item_size) / 2.0
    }

    /// Where a freshly added item is placed
    pub fn spawn_origin(&self) -> Vec2 {
        Vec2::new(self.start_x, self.item_y())
    }

    /// Strict: an item sitting exactly on the edge is still on the belt
    #[inline]
    pub fn is_past_edge(&self, x: f32) -> bool {
        x > self.playfield_width
    }
}

/// Clamp a requested speed. `None` means the request is unusable.
pub fn sanitize_speed(speed: f32) -> Option<f32> {
    if speed.is_finite() {
        Some(speed.max(0.0))
    } else {
        None
    }
}

/// Items on one belt plus the belt's current speed
#[derive(Debug, Clone)]
pub struct Belt {
    geometry: LaneGeometry,
    speed: f32,
    items: BTreeMap<ItemId, Item>,
}

impl Belt {
    pub fn new(geometry: LaneGeometry, speed: f32) -> Self {
        Self {
            geometry,
            speed: sanitize_speed(speed).unwrap_or(0.0),
            items: BTreeMap::new(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Place a new item at the start of the belt with the current speed.
    /// Returns false (and changes nothing) if `id` is already on the belt.
    pub fn add(&mut self, id: ItemId) -> bool {
        let item = Item::new(
            id,
            self.geometry.spawn_origin(),
            self.speed,
            self.geometry.item_size,
        );
        self.insert(item)
    }

    /// Insert a prebuilt item; existing ids are left untouched
    pub fn insert(&mut self, item: Item) -> bool {
        match self.items.entry(item.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(item);
                true
            }
        }
    }

    /// Returns whether the item was present
    pub fn remove(&mut self, id: ItemId) -> bool {
        self.items.remove(&id).is_some()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Set belt speed and every item's speed. Non-finite speeds are ignored,
    /// negative ones clamp to zero. Returns the speed now in effect.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        if let Some(speed) = sanitize_speed(speed) {
            self.speed = speed;
            for item in self.items.values_mut() {
                item.set_speed(speed);
            }
        }
        self.speed
    }

    /// One tick: advance every item by `dt`, then drop the ones past the far
    /// edge. Returns how many were dropped.
    pub fn advance(&mut self, dt: f32) -> u32 {
        let geometry = self.geometry;
        let before = self.items.len();
        self.items.retain(|_, item| {
            item.advance(dt);
            !geometry.is_past_edge(item.position())
        });
        (before - self.items.len()) as u32
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> LaneSnapshot {
        LaneSnapshot::new(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn geometry() -> LaneGeometry {
        LaneGeometry {
            y: 250.0,
            height: 80.0,
            playfield_width: 800.0,
            item_size: 50.0,
            start_x: 0.0,
        }
    }

    #[test]
    fn test_add_places_item_at_start() {
        let mut belt = Belt::new(geometry(), 150.0);
        assert!(belt.add(1));
        let item = belt.get(1).unwrap();
        assert_eq!(item.origin(), Vec2::new(0.0, 265.0));
        assert_eq!(item.speed(), 150.0);
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut belt = Belt::new(geometry(), 150.0);
        belt.add(1);
        belt.advance(1.0);
        assert!(!belt.add(1));
        assert_eq!(belt.len(), 1);
        assert_eq!(belt.get(1).unwrap().position(), 150.0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut belt = Belt::new(geometry(), 150.0);
        belt.add(1);
        belt.add(2);
        assert!(belt.remove(1));
        assert!(!belt.remove(1));
        assert!(!belt.remove(99));
        assert_eq!(belt.len(), 1);
        assert!(belt.contains(2));
    }

    #[test]
    fn test_speed_propagates_to_existing_and_new_items() {
        let mut belt = Belt::new(geometry(), 150.0);
        belt.add(1);
        belt.set_speed(300.0);
        belt.add(2);
        belt.advance(0.5);
        assert_eq!(belt.get(1).unwrap().position(), 150.0);
        assert_eq!(belt.get(2).unwrap().position(), 150.0);
    }

    #[test]
    fn test_bad_speed_rejected_or_clamped() {
        let mut belt = Belt::new(geometry(), 150.0);
        belt.add(1);
        assert_eq!(belt.set_speed(f32::NAN), 150.0);
        assert_eq!(belt.set_speed(f32::INFINITY), 150.0);
        assert_eq!(belt.set_speed(-20.0), 0.0);
        assert_eq!(belt.get(1).unwrap().speed(), 0.0);
    }

    #[test]
    fn test_item_on_edge_is_not_lost() {
        // 1/64 s ticks at 128 units/s move exactly 2 units per tick
        let mut belt = Belt::new(geometry(), 128.0);
        belt.add(1);
        let dt = 1.0 / 64.0;
        let mut lost = 0;
        for _ in 0..400 {
            lost += belt.advance(dt);
        }
        assert_eq!(lost, 0);
        assert_eq!(belt.get(1).unwrap().position(), 800.0);

        assert_eq!(belt.advance(dt), 1);
        assert!(belt.is_empty());
    }

    #[test]
    fn test_scenario_item_lost_after_334_ticks() {
        let mut belt = Belt::new(geometry(), 150.0);
        belt.add(1);
        let mut lost = 0;
        for _ in 0..333 {
            lost += belt.advance(0.016);
        }
        assert_eq!(lost, 0);
        assert!(belt.contains(1));
        assert_eq!(belt.advance(0.016), 1);
        assert!(!belt.contains(1));
    }

    #[test]
    fn test_clear() {
        let mut belt = Belt::new(geometry(), 150.0);
        for id in 0..5 {
            belt.add(id);
        }
        belt.clear();
        assert!(belt.is_empty());
        assert_eq!(belt.advance(100.0), 0);
    }

    proptest! {
        #[test]
        fn prop_every_item_is_lost_or_present(
            ops in prop::collection::vec((0u32..40, 0u8..4), 1..200)
        ) {
            let mut belt = Belt::new(geometry(), 150.0);
            let mut added = 0u32;
            let mut removed = 0u32;
            let mut lost = 0u32;
            for (id, op) in ops {
                match op {
                    0 => if belt.add(id) { added += 1 },
                    1 => if belt.remove(id) { removed += 1 },
                    _ => lost += belt.advance(0.5),
                }
            }
            prop_assert_eq!(added, removed + lost + belt.len() as u32);
        }
    }
}
