use std::collections::VecDeque;

use bevy::math::Vec2;

use crate::behaviours::{Behaviour, BehaviourId, BehaviourKind};
use crate::geometry::Rect;
use crate::particles::EmitterId;
use crate::sprites::{self, Sprite};
use crate::tags::Tags;

/// Handle to a registered object. Generation guards against slot reuse, so
/// a held id for a despawned object simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

/// The mutable unit of simulation.
pub struct GameObject {
    // Physics
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Downward pull per second while airborne.
    pub mass: f32,
    /// Restitution on floor/ceiling contact, 0..=1.
    pub bounce: f32,
    /// Horizontal damping while resting on floor or ceiling.
    pub friction: f32,
    /// Cosmetic vertical offset driven by the march tween.
    pub hop: f32,

    // Display
    pub sprite: Sprite,
    pub emitter: Option<EmitterId>,

    // Logic
    pub tags: Tags,
    pub collision_mask: Tags,
    pub hp: i32,
    pub max_hp: i32,
    /// Credited to the soul economy when a MOBILE object dies.
    pub souls: u32,
    /// Probability [0,1] that death leaves a corpse.
    pub corpse_chance: f32,
    pub despawn_on_collision: bool,
    pub despawn_on_bounce: bool,
    /// Correlates projectiles spawned by a single cast.
    pub group_id: Option<u32>,

    // Behaviours
    pub behaviours: VecDeque<Behaviour>,
    /// Removals requested while a behaviour is detached mid-fanout.
    pub(crate) pending_detach: Vec<BehaviourId>,
    /// Logical tick period in ms; the clock counts down each frame.
    pub update_speed: f32,
    pub update_clock: f32,
}

impl Default for GameObject {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            mass: 0.0,
            bounce: 0.0,
            friction: 0.0,
            hop: 0.0,
            sprite: sprites::SKULL,
            emitter: None,
            tags: Tags::NONE,
            collision_mask: Tags::NONE,
            hp: 0,
            max_hp: 0,
            souls: 0,
            corpse_chance: 0.0,
            despawn_on_collision: false,
            despawn_on_bounce: false,
            group_id: None,
            behaviours: VecDeque::new(),
            pending_detach: Vec::new(),
            update_speed: 0.0,
            update_clock: 0.0,
        }
    }
}

impl GameObject {
    pub fn is(&self, tags: Tags) -> bool {
        self.tags.intersects(tags)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.sprite.w, self.sprite.h)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// First attached behaviour matching the kind predicate.
    pub fn behaviour(&self, pred: fn(&BehaviourKind) -> bool) -> Option<&Behaviour> {
        self.behaviours.iter().find(|b| pred(&b.kind))
    }

    pub fn behaviour_mut(&mut self, pred: fn(&BehaviourKind) -> bool) -> Option<&mut Behaviour> {
        self.behaviours.iter_mut().find(|b| pred(&b.kind))
    }

    pub fn has_behaviour(&self, pred: fn(&BehaviourKind) -> bool) -> bool {
        self.behaviour(pred).is_some()
    }
}

struct Slot {
    generation: u32,
    object: Option<GameObject>,
}

/// Arena of live objects. Iteration always follows insertion order — that
/// order decides collision pairing ties, so it is part of the contract.
#[derive(Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<ObjectId>,
    live: usize,
}

impl Registry {
    pub fn insert(&mut self, object: GameObject) -> ObjectId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                ObjectId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                ObjectId {
                    index,
                    generation: 0,
                }
            }
        };
        self.order.push(id);
        self.live += 1;
        id
    }

    /// Idempotent: removing an id that no longer resolves is a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(object)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_mut()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    /// Snapshot of live ids in insertion order. Passes iterate this copy so
    /// mid-pass spawns and despawns cannot corrupt the walk.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.contains(id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.get(id).map(|object| (id, object)))
    }

    /// Compact tombstoned ids out of the order list. Called once per frame
    /// between phases.
    pub fn sweep(&mut self) {
        if self.order.len() == self.live {
            return;
        }
        let slots = &self.slots;
        self.order.retain(|id| {
            slots
                .get(id.index as usize)
                .map(|s| s.generation == id.generation && s.object.is_some())
                .unwrap_or(false)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> GameObject {
        GameObject {
            tags: Tags::LIVING,
            ..Default::default()
        }
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut registry = Registry::default();
        let a = registry.insert(unit());
        let b = registry.insert(unit());
        let c = registry.insert(unit());
        assert_eq!(registry.ids(), vec![a, b, c]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = Registry::default();
        let a = registry.insert(unit());
        assert!(registry.remove(a).is_some());
        assert!(registry.remove(a).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn reused_slot_does_not_resolve_stale_ids() {
        let mut registry = Registry::default();
        let a = registry.insert(unit());
        registry.remove(a);
        let b = registry.insert(unit());
        assert!(!registry.contains(a));
        assert!(registry.contains(b));
        assert_eq!(a.index, b.index);
    }

    #[test]
    fn sweep_preserves_order_of_survivors() {
        let mut registry = Registry::default();
        let a = registry.insert(unit());
        let b = registry.insert(unit());
        let c = registry.insert(unit());
        registry.remove(b);
        registry.sweep();
        assert_eq!(registry.ids(), vec![a, c]);
        assert_eq!(registry.len(), 2);
    }
}
