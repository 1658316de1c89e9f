//! Point-in-time copies of a lane's items
//!
//! Renderers and collision checks work on a [`LaneSnapshot`] so they never
//! hold the lane lock while iterating.

use std::collections::BTreeMap;

use super::item::{Item, ItemId};

/// Owned copy of a lane's items, keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneSnapshot {
    items: BTreeMap<ItemId, Item>,
}

impl LaneSnapshot {
    pub fn new(items: BTreeMap<ItemId, Item>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// An id is valid while it is still on the belt
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Items in id order
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Items left to right; equal positions fall back to id order
    pub fn by_position(&self) -> Vec<&Item> {
        let mut sorted: Vec<&Item> = self.items.values().collect();
        // BTreeMap order is by id, and the sort is stable
        sorted.sort_by(|a, b| a.position().total_cmp(&b.position()));
        sorted
    }

    /// Cluster overlapping items for stack labels.
    ///
    /// Walking left to right, each ungrouped item opens a group spanning its
    /// own extent; any later ungrouped item whose center lies inside that
    /// span joins it.
    pub fn groups(&self) -> Vec<ItemGroup> {
        let sorted = self.by_position();
        let mut grouped = vec![false; sorted.len()];
        let mut groups = Vec::new();

        for i in 0..sorted.len() {
            if grouped[i] {
                continue;
            }
            grouped[i] = true;
            let (left, right) = sorted[i].extent();
            let mut group = ItemGroup {
                members: vec![sorted[i].id()],
                leader: sorted[i].id(),
                leader_x: sorted[i].position(),
            };

            for j in (i + 1)..sorted.len() {
                if grouped[j] {
                    continue;
                }
                let center = sorted[j].center_x();
                if center >= left && center <= right {
                    grouped[j] = true;
                    group.push(sorted[j]);
                }
            }
            groups.push(group);
        }

        groups
    }
}

/// Items drawn as one stack
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGroup {
    /// Member ids, left to right
    pub members: Vec<ItemId>,
    /// Rightmost member; the stack count is drawn above it
    pub leader: ItemId,
    leader_x: f32,
}

impl ItemGroup {
    fn push(&mut self, item: &Item) {
        self.members.push(item.id());
        if item.position() > self.leader_x {
            self.leader = item.id();
            self.leader_x = item.position();
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// More than one item shares the spot
    pub fn is_stack(&self) -> bool {
        self.members.len() > 1
    }
}
