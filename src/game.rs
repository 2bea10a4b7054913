//! The simulation context. Everything that used to be ambient global state
//! is a field here, and every operation takes `&mut Game` explicitly — the
//! fanout helpers and the frame driver are all testable in isolation.

use bevy::math::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::actions::{Damage, Death};
use crate::behaviours::{Behaviour, BehaviourId, BehaviourKind, Flow};
use crate::config::GameConfig;
use crate::events::EventBus;
use crate::geometry::vector_from_angle;
use crate::object::{GameObject, ObjectId, Registry};
use crate::particles::{Emitter, EmitterId};
use crate::physics;
use crate::rituals::{Ritual, RitualEffect};
use crate::sprites;
use crate::tags::Tags;
use crate::tween::{self, Tween};
use crate::units;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Intro,
    Playing,
    Shopping,
    Defeat,
    Victory,
}

#[derive(Clone, Copy, Debug)]
pub struct Stage {
    pub width: f32,
    pub height: f32,
    pub floor: f32,
    pub ceiling: f32,
}

/// Spell-charge economy and aiming state.
pub struct SpellState {
    pub target_angle: f32,
    pub target_radius: f32,
    pub target_power: f32,
    pub shots_per_round: u32,
    pub shot_offset_angle: f32,
    pub max_casts: u32,
    pub casts: u32,
    pub recharge_rate: f32,
    pub recharge_timer: f32,
    /// Countdown until the casting pose reverts. Re-casting replaces it,
    /// so chained casts revert exactly once.
    pub pose_timer: Option<f32>,
    pub next_group_id: u32,
}

pub struct AbilityState {
    pub cooldown: f32,
    pub timer: f32,
}

pub struct Game {
    pub stage: Stage,
    pub phase: GamePhase,
    pub objects: Registry,
    pub player: ObjectId,
    pub rituals: Vec<Ritual>,
    pub spell: SpellState,
    pub ability: AbilityState,
    pub souls: u32,
    pub level: u32,
    /// Consecutive spell hits, fed by the streak behaviour.
    pub streak: u32,
    pub tweens: Vec<Tween>,
    pub events: EventBus,
    pub emitters: Vec<(EmitterId, Emitter)>,
    pub rng: SmallRng,
    next_emitter_id: u64,
}

impl Game {
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut objects = Registry::default();
        let player = objects.insert(units::player());

        Self {
            stage: Stage {
                width: config.stage_width,
                height: config.stage_height,
                floor: 0.0,
                ceiling: config.ceiling,
            },
            phase: GamePhase::Intro,
            objects,
            player,
            rituals: Vec::new(),
            spell: SpellState {
                target_angle: 0.0,
                target_radius: config.target_radius,
                target_power: config.target_power,
                shots_per_round: 1,
                shot_offset_angle: config.shot_offset_angle,
                max_casts: config.max_casts,
                casts: config.max_casts,
                recharge_rate: config.cast_recharge_rate,
                recharge_timer: 0.0,
                pose_timer: None,
                next_group_id: 1,
            },
            ability: AbilityState {
                cooldown: config.ability_cooldown,
                timer: 0.0,
            },
            souls: 0,
            level: 1,
            streak: 0,
            tweens: Vec::new(),
            events: EventBus::default(),
            emitters: Vec::new(),
            rng,
            next_emitter_id: 1,
        }
    }

    #[cfg(test)]
    pub fn new_for_test() -> Self {
        let config = GameConfig {
            rng_seed: Some(0x5EED),
            ..Default::default()
        };
        Game::new(&config)
    }

    // ── Registry ────────────────────────────────────────────────────────

    pub fn spawn(&mut self, object: GameObject) -> ObjectId {
        self.objects.insert(object)
    }

    pub fn spawn_at(&mut self, mut object: GameObject, x: f32, y: f32) -> ObjectId {
        object.x = x;
        object.y = y;
        self.spawn(object)
    }

    /// Removes the object, winds down its emitter, and detaches all its
    /// behaviours. Despawning an id that no longer resolves is a no-op.
    pub fn despawn(&mut self, id: ObjectId) {
        let Some(object) = self.objects.remove(id) else {
            return;
        };
        if let Some(emitter) = object.emitter {
            if let Some(e) = self.emitter_mut(emitter) {
                e.finish();
            }
        }
        let mut behaviours = object.behaviours;
        for mut behaviour in behaviours.drain(..) {
            behaviour.on_removed(self, id);
        }
    }

    // ── Behaviours ──────────────────────────────────────────────────────

    /// Front-inserts: the newest behaviour observes events before older
    /// ones, so it can veto them.
    pub fn add_behaviour(&mut self, id: ObjectId, mut behaviour: Behaviour) {
        if !self.objects.contains(id) {
            return;
        }
        behaviour.on_added(self, id);
        if let Some(o) = self.objects.get_mut(id) {
            o.behaviours.push_front(behaviour);
        }
    }

    pub fn remove_behaviour(&mut self, id: ObjectId, behaviour_id: BehaviourId) {
        let mut removed = None;
        if let Some(o) = self.objects.get_mut(id) {
            if let Some(pos) = o.behaviours.iter().position(|b| b.id == behaviour_id) {
                removed = o.behaviours.remove(pos);
            } else {
                // Possibly detached mid-fanout; drop it on reattach.
                o.pending_detach.push(behaviour_id);
            }
        }
        if let Some(mut behaviour) = removed {
            behaviour.on_removed(self, id);
        }
    }

    pub fn remove_behaviour_where(&mut self, id: ObjectId, pred: fn(&BehaviourKind) -> bool) {
        let found = self
            .objects
            .get(id)
            .and_then(|o| o.behaviour(pred))
            .map(|b| b.id);
        if let Some(behaviour_id) = found {
            self.remove_behaviour(id, behaviour_id);
        }
    }

    /// Run `visit` over a snapshot of the object's behaviour list, detaching
    /// one behaviour at a time so the callback gets the whole context.
    /// Behaviours attached mid-fanout join from the next fanout on; removals
    /// of the in-flight behaviour are honored on reattach.
    fn fanout<F>(&mut self, id: ObjectId, mut visit: F)
    where
        F: FnMut(&mut Game, ObjectId, &mut Behaviour) -> Flow,
    {
        let ids: Vec<BehaviourId> = match self.objects.get(id) {
            Some(o) => o.behaviours.iter().map(|b| b.id).collect(),
            None => return,
        };

        for behaviour_id in ids {
            let Some(owner) = self.objects.get_mut(id) else {
                return;
            };
            let Some(pos) = owner.behaviours.iter().position(|b| b.id == behaviour_id) else {
                continue;
            };
            let Some(mut behaviour) = owner.behaviours.remove(pos) else {
                continue;
            };

            let flow = visit(self, id, &mut behaviour);

            let mut reattach = Some(behaviour);
            if let Some(owner) = self.objects.get_mut(id) {
                if let Some(i) = owner
                    .pending_detach
                    .iter()
                    .position(|&d| d == behaviour_id)
                {
                    owner.pending_detach.remove(i);
                } else if let Some(b) = reattach.take() {
                    let at = pos.min(owner.behaviours.len());
                    owner.behaviours.insert(at, b);
                }
            }
            if let Some(mut dropped) = reattach {
                dropped.on_removed(self, id);
            }

            if flow == Flow::Stop {
                break;
            }
        }
    }

    pub(crate) fn behaviour_frame(&mut self, id: ObjectId, dt: f32) {
        self.fanout(id, |game, owner, behaviour| {
            behaviour.on_frame(game, owner, dt);
            Flow::Continue
        });
    }

    /// Owner logical tick: each behaviour's `turns` divider gates whether
    /// its body actually runs, and a `Stop` short-circuits the rest.
    pub(crate) fn behaviour_update(&mut self, id: ObjectId) {
        self.fanout(id, |game, owner, behaviour| {
            behaviour.timer += 1;
            if behaviour.timer >= behaviour.turns {
                behaviour.timer = 0;
                behaviour.on_update(game, owner)
            } else {
                Flow::Continue
            }
        });
    }

    pub(crate) fn behaviour_damage(&mut self, id: ObjectId, damage: &mut Damage) {
        self.fanout(id, |game, owner, behaviour| {
            behaviour.on_damage(game, owner, damage);
            Flow::Continue
        });
    }

    pub(crate) fn behaviour_death(&mut self, id: ObjectId, death: &Death) {
        self.fanout(id, |game, owner, behaviour| {
            behaviour.on_death(game, owner, death);
            Flow::Continue
        });
    }

    pub(crate) fn behaviour_bounce(&mut self, id: ObjectId) {
        self.fanout(id, |game, owner, behaviour| {
            behaviour.on_bounce(game, owner);
            Flow::Continue
        });
    }

    pub(crate) fn object_collision(&mut self, id: ObjectId, target: ObjectId) {
        self.fanout(id, |game, owner, behaviour| {
            behaviour.on_collision(game, owner, target);
            Flow::Continue
        });
        let despawn_after = self
            .objects
            .get(id)
            .map(|o| o.despawn_on_collision)
            .unwrap_or(false);
        if despawn_after {
            self.despawn(id);
        }
    }

    // ── Rituals ─────────────────────────────────────────────────────────

    pub fn add_ritual(&mut self, ritual: Ritual) {
        let effect = ritual.effect;
        self.rituals.push(ritual);
        effect.on_active(self);
    }

    /// Exclusivity is checked from the candidate's side only: its
    /// `exclusive_tags` against registered rituals' `tags`. Registered
    /// rituals' own exclusions are not re-checked against the candidate.
    pub fn can_add_ritual(&self, ritual: &Ritual) -> bool {
        if ritual.exclusive_tags != 0 {
            for other in &self.rituals {
                if ritual.exclusive_tags & other.tags != 0 {
                    return false;
                }
            }
        }

        if ritual.required_tags != 0 {
            return self
                .rituals
                .iter()
                .any(|other| ritual.required_tags & other.tags != 0);
        }

        true
    }

    pub(crate) fn ritual_effects(&self) -> Vec<RitualEffect> {
        self.rituals.iter().map(|r| r.effect).collect()
    }

    /// Reports a freshly spawned projectile to every ritual in registration
    /// order. Split-spawned projectiles skip non-recursive rituals so a
    /// splitting ritual can't feed on its own output.
    pub fn ritual_cast(&mut self, spell: ObjectId, from_split: bool) {
        let hooks: Vec<(RitualEffect, bool)> = self
            .rituals
            .iter()
            .map(|r| (r.effect, r.recursive))
            .collect();
        for (effect, recursive) in hooks {
            if from_split && !recursive {
                continue;
            }
            effect.on_cast(self, spell);
        }
    }

    pub fn on_level_end(&mut self) {
        for effect in self.ritual_effects() {
            effect.on_level_end(self);
        }
    }

    // ── Economy / misc ──────────────────────────────────────────────────

    pub fn add_souls(&mut self, souls: u32) {
        self.souls = self.souls.saturating_add(souls);
    }

    /// Where projectiles leave from: the aim circle around the player.
    pub fn casting_point(&self) -> Vec2 {
        let center = self
            .objects
            .get(self.player)
            .map(|p| p.center())
            .unwrap_or(Vec2::ZERO);
        center + vector_from_angle(self.spell.target_angle) * self.spell.target_radius
    }

    /// Level-cleared check: no living enemy remains.
    pub fn is_cleared(&self) -> bool {
        !self.objects.iter().any(|(_, o)| o.is(Tags::LIVING))
    }

    // ── Emitters ────────────────────────────────────────────────────────

    pub fn add_emitter(&mut self, emitter: Emitter) -> EmitterId {
        let id = EmitterId(self.next_emitter_id);
        self.next_emitter_id += 1;
        self.emitters.push((id, emitter));
        id
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| e)
    }

    /// One-shot cosmetic burst; the emitter winds down once its particles
    /// expire.
    pub fn burst(&mut self, mut emitter: Emitter, count: u32) {
        emitter.burst(count, &mut self.rng);
        emitter.finish();
        let id = EmitterId(self.next_emitter_id);
        self.next_emitter_id += 1;
        self.emitters.push((id, emitter));
    }

    // ── Frame driver ────────────────────────────────────────────────────

    /// One frame, dt in ms. Fixed phase order: spell accrual, per-object
    /// updates, physics/collision, ritual on_frame, tweens, particles.
    pub fn update(&mut self, dt: f32) {
        self.update_spell(dt);
        self.update_objects(dt);
        physics::step(self, dt);
        self.update_rituals(dt);
        tween::update(self, dt);
        self.update_particles(dt);
        self.objects.sweep();
    }

    fn update_spell(&mut self, dt: f32) {
        if self.spell.casts < self.spell.max_casts {
            self.spell.recharge_timer += dt;
            if self.spell.recharge_timer > self.spell.recharge_rate {
                self.spell.casts += 1;
                self.spell.recharge_timer = 0.0;
            }
        }

        if let Some(remaining) = self.spell.pose_timer {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.spell.pose_timer = None;
                if let Some(player) = self.objects.get_mut(self.player) {
                    player.sprite = sprites::PLAYER_IDLE;
                }
            } else {
                self.spell.pose_timer = Some(remaining);
            }
        }

        self.ability.timer = (self.ability.timer + dt).min(self.ability.cooldown);
    }

    fn update_objects(&mut self, dt: f32) {
        for id in self.objects.ids() {
            self.behaviour_frame(id, dt);

            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            object.update_clock -= dt;
            let ticked = object.update_clock <= 0.0;
            if ticked {
                object.update_clock = object.update_speed;
            }
            if ticked {
                self.behaviour_update(id);
            }

            if let Some((x, y, emitter)) = self
                .objects
                .get(id)
                .and_then(|o| o.emitter.map(|e| (o.x, o.y, e)))
            {
                if let Some(e) = self.emitter_mut(emitter) {
                    e.x = x;
                    e.y = y;
                }
            }
        }
    }

    fn update_rituals(&mut self, dt: f32) {
        for effect in self.ritual_effects() {
            effect.on_frame(self, dt);
        }
    }

    fn update_particles(&mut self, dt: f32) {
        let Game { emitters, rng, .. } = self;
        for (_, emitter) in emitters.iter_mut() {
            emitter.update(dt, rng);
        }
        emitters.retain(|(_, e)| !e.is_spent());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_recharge_over_time_up_to_cap() {
        let mut game = Game::new_for_test();
        game.spell.casts = 0;
        game.spell.max_casts = 2;

        game.update(1100.0);
        assert_eq!(game.spell.casts, 1);
        game.update(1100.0);
        assert_eq!(game.spell.casts, 2);
        game.update(5000.0);
        assert_eq!(game.spell.casts, 2, "capped at max");
    }

    #[test]
    fn ability_timer_accrues_and_caps_at_cooldown() {
        let mut game = Game::new_for_test();
        game.update(4000.0);
        assert_eq!(game.ability.timer, 4000.0);
        game.update(20_000.0);
        assert_eq!(game.ability.timer, game.ability.cooldown);
    }

    #[test]
    fn newest_behaviour_observes_damage_first() {
        use crate::actions::damage;
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject {
            tags: Tags::LIVING | Tags::MOBILE,
            hp: 5,
            max_hp: 5,
            ..Default::default()
        });
        // Older behaviour would double... here: Invulnerable added last runs
        // first and zeroes the hit before anything else sees it.
        game.add_behaviour(
            id,
            Behaviour::new(BehaviourKind::Enraged { mask: Tags::NONE }),
        );
        game.add_behaviour(id, Behaviour::new(BehaviourKind::Invulnerable));
        damage(&mut game, id, 3, None);
        assert_eq!(game.objects.get(id).unwrap().hp, 5);
    }

    #[test]
    fn stop_flow_short_circuits_the_tick() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject {
            update_speed: 100.0,
            x: 50.0,
            ..Default::default()
        });
        game.add_behaviour(
            id,
            Behaviour::new(BehaviourKind::March { step: 16.0 }),
        );
        // Frozen is attached last, so it runs first and suppresses March.
        game.add_behaviour(id, Behaviour::frozen());

        game.behaviour_update(id);
        assert!(
            game.tweens.is_empty(),
            "march never ran behind the freeze"
        );
    }

    #[test]
    fn frozen_thaws_after_its_ticks() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject::default());
        game.add_behaviour(id, Behaviour::frozen());
        for _ in 0..3 {
            assert!(game
                .objects
                .get(id)
                .unwrap()
                .has_behaviour(BehaviourKind::is_frozen));
            game.behaviour_update(id);
        }
        assert!(!game
            .objects
            .get(id)
            .unwrap()
            .has_behaviour(BehaviourKind::is_frozen));
    }

    #[test]
    fn turns_divides_owner_ticks() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject {
            tags: Tags::LIVING | Tags::MOBILE,
            hp: 10,
            max_hp: 10,
            ..Default::default()
        });
        // Bleeding runs every 3rd owner tick.
        game.add_behaviour(id, Behaviour::new(BehaviourKind::Bleeding));
        for _ in 0..3 {
            game.behaviour_update(id);
        }
        assert_eq!(game.objects.get(id).unwrap().hp, 9, "one bleed in 3 ticks");
        for _ in 0..3 {
            game.behaviour_update(id);
        }
        assert_eq!(game.objects.get(id).unwrap().hp, 8);
    }

    #[test]
    fn despawn_winds_down_the_attached_emitter() {
        let mut game = Game::new_for_test();
        let emitter = game.add_emitter(crate::fx::trail());
        let id = game.spawn(GameObject {
            emitter: Some(emitter),
            ..Default::default()
        });
        game.despawn(id);
        // Emitter still exists until its particles fade, but stops emitting.
        game.update(16.0);
        game.update(5000.0);
        assert!(game.emitters.iter().all(|(eid, _)| *eid != emitter));
    }

    #[test]
    fn cleared_check_ignores_undead_and_corpses() {
        let mut game = Game::new_for_test();
        assert!(game.is_cleared());
        let corpse = units::corpse();
        game.spawn(corpse);
        assert!(game.is_cleared());
        game.spawn(GameObject {
            tags: Tags::LIVING | Tags::MOBILE,
            ..Default::default()
        });
        assert!(!game.is_cleared());
    }
}
