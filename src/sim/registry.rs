//! Live entity bookkeeping
//!
//! Falling objects are kept in spawn order. Ids are never reused within a
//! registry's lifetime, so a stale id can never address a newer object.

use glam::Vec2;

use super::state::{FallingObject, Player};

#[derive(Debug, Clone)]
pub struct EntityRegistry {
    /// The single player avatar
    pub player: Player,
    /// Live falling objects (spawn order)
    objects: Vec<FallingObject>,
    /// Next entity ID
    next_id: u32,
}

impl EntityRegistry {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            objects: Vec::new(),
            next_id: 1,
        }
    }

    /// Add an object at the top of the field, returning its id
    pub fn spawn(&mut self, x: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.push(FallingObject {
            id,
            pos: Vec2::new(x, 0.0),
        });
        id
    }

    /// Move an object down by `delta_y`; returns its new y if it is live
    pub fn advance(&mut self, id: u32, delta_y: f32) -> Option<f32> {
        let object = self.objects.iter_mut().find(|o| o.id == id)?;
        object.pos.y += delta_y;
        Some(object.pos.y)
    }

    /// Remove an object, preserving the order of the rest
    pub fn remove(&mut self, id: u32) -> Option<FallingObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(idx))
    }

    /// Visit objects in spawn order, keeping those for which `f` returns true
    pub fn retain_objects(&mut self, f: impl FnMut(&mut FallingObject) -> bool) {
        self.objects.retain_mut(f);
    }

    pub fn get(&self, id: u32) -> Option<&FallingObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Live objects in spawn order
    pub fn all(&self) -> &[FallingObject] {
        &self.objects
    }

    /// Ids of live objects in spawn order, detached from the registry so
    /// callers can remove while walking them
    pub fn ids(&self) -> Vec<u32> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every object, returning how many were live
    pub fn clear(&mut self) -> usize {
        let n = self.objects.len();
        self.objects.clear();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EntityRegistry {
        EntityRegistry::new(Player::new(150.0, 500.0))
    }

    #[test]
    fn test_spawn_order_and_ids() {
        let mut reg = registry();
        let a = reg.spawn(10.0);
        let b = reg.spawn(20.0);
        let c = reg.spawn(30.0);
        assert!(a < b && b < c);
        let xs: Vec<f32> = reg.all().iter().map(|o| o.pos.x).collect();
        assert_eq!(xs, vec![10.0, 20.0, 30.0]);
        assert!(reg.all().iter().all(|o| o.pos.y == 0.0));
    }

    #[test]
    fn test_advance_and_remove() {
        let mut reg = registry();
        let a = reg.spawn(10.0);
        assert_eq!(reg.advance(a, 8.0), Some(8.0));
        assert_eq!(reg.advance(a, 8.0), Some(16.0));
        assert_eq!(reg.remove(a).map(|o| o.pos.y), Some(16.0));
        assert_eq!(reg.advance(a, 8.0), None);
        assert!(reg.remove(a).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_while_walking_visits_each_once() {
        let mut reg = registry();
        for i in 0..5 {
            reg.spawn(i as f32);
        }
        let mut visited = Vec::new();
        for id in reg.ids() {
            visited.push(id);
            // Remove every object as it is visited, including neighbours
            reg.remove(id);
        }
        assert_eq!(visited, vec![1, 2, 3, 4, 5]);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_retain_objects_single_pass() {
        let mut reg = registry();
        for i in 0..5 {
            reg.spawn(i as f32);
        }
        let mut visited = Vec::new();
        reg.retain_objects(|o| {
            visited.push(o.id);
            o.pos.y += 1.0;
            o.id % 2 == 0
        });
        assert_eq!(visited, vec![1, 2, 3, 4, 5]);
        let left: Vec<(u32, f32)> = reg.all().iter().map(|o| (o.id, o.pos.y)).collect();
        assert_eq!(left, vec![(2, 1.0), (4, 1.0)]);
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut reg = registry();
        reg.spawn(0.0);
        reg.spawn(0.0);
        assert_eq!(reg.clear(), 2);
        let id = reg.spawn(0.0);
        assert_eq!(id, 3);
        assert_eq!(reg.len(), 1);
        assert!(reg.get(id).is_some());
    }
}
