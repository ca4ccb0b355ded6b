//! The mutable set of obstacle rectangles the router routes around.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::ids::ObstacleId;
use crate::types::Rectangle;

/// Holds every obstacle the router must route around, keyed by a stable id.
///
/// Mutating an obstacle does not, by itself, mark any path dirty -- see
/// [`crate::Router::update_obstacle`], which does both.
#[derive(Clone, Debug, Default)]
pub struct ObstacleStore {
    obstacles: BTreeMap<ObstacleId, Rectangle>,
    next_id: usize,
}

impl ObstacleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rect: Rectangle) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        self.obstacles.insert(id, rect);
        id
    }

    pub fn remove(&mut self, id: ObstacleId) -> Result<Rectangle> {
        self.obstacles
            .remove(&id)
            .ok_or_else(|| anyhow!("{id} is not in this router"))
    }

    pub fn update(&mut self, id: ObstacleId, new_rect: Rectangle) -> Result<Rectangle> {
        let slot = self
            .obstacles
            .get_mut(&id)
            .ok_or_else(|| anyhow!("{id} is not in this router"))?;
        Ok(std::mem::replace(slot, new_rect))
    }

    pub fn get(&self, id: ObstacleId) -> Result<Rectangle> {
        self.obstacles.get(&id).copied().ok_or_else(|| {
            anyhow!("{id} is not in this router")
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Rectangle)> {
        self.obstacles.iter().map(|(id, rect)| (*id, rect))
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rectangle;

    #[test]
    fn add_remove_round_trips() {
        let mut store = ObstacleStore::new();
        let id = store.add(Rectangle::new(0, 0, 10, 10));
        assert_eq!(store.len(), 1);
        let removed = store.remove(id).unwrap();
        assert_eq!(removed, Rectangle::new(0, 0, 10, 10));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_unknown_id_errors() {
        let mut store = ObstacleStore::new();
        let bogus = ObstacleId(999);
        assert!(store.remove(bogus).is_err());
    }

    #[test]
    fn update_returns_previous_rect() {
        let mut store = ObstacleStore::new();
        let id = store.add(Rectangle::new(0, 0, 10, 10));
        let prev = store.update(id, Rectangle::new(5, 5, 15, 15)).unwrap();
        assert_eq!(prev, Rectangle::new(0, 0, 10, 10));
        assert_eq!(store.get(id).unwrap(), Rectangle::new(5, 5, 15, 15));
    }
}
