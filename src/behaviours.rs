//! Attachable behaviour components.
//!
//! Every reaction a unit has — ticking AI, damage filtering, collision
//! responses, status effects — lives in a behaviour attached to that unit.
//! Behaviours are stored front-first: the most recently attached behaviour
//! observes events before older ones, which is how shields and freezes get
//! to veto what the rest of the list would do.

use std::sync::atomic::{AtomicU64, Ordering};

use bevy::math::Vec2;

use crate::actions::{damage, Damage, Death};
use crate::events::Cue;
use crate::fx;
use crate::game::Game;
use crate::geometry::{vector_from_angle, vector_to_angle};
use crate::object::ObjectId;
use crate::sprites;
use crate::tags::Tags;
use crate::tween::{Tween, TweenKind};
use crate::units::{self, UnitKind};

/// Identity of a behaviour instance, for targeted removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BehaviourId(u64);

static NEXT_BEHAVIOUR_ID: AtomicU64 = AtomicU64::new(1);

/// Flow control for the update fanout: `Stop` short-circuits the remaining
/// behaviours of the same logical tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affliction {
    Bleed,
    Freeze,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BehaviourKind {
    /// Trades hit points on contact: deals its owner's hp, takes the target's.
    Attack,
    /// Steps sideways on each logical tick with a hop tween.
    March { step: f32 },
    /// Deals a flat amount on contact.
    Damaging { amount: i32 },
    /// Loses 1 hp per activation.
    Bleeding,
    /// Converts damage from matching dealers into healing.
    Enraged { mask: Tags },
    /// Steers toward the nearest object matching the owner's collision mask.
    Seeking,
    Summon {
        unit: UnitKind,
        interval: f32,
        timer: f32,
        count: u32,
    },
    DespawnTimer { duration: f32, elapsed: f32 },
    /// Clamps incoming damage to heals only.
    Invulnerable,
    /// Suppresses the owner's update fanout for a few ticks, then thaws.
    Frozen { ticks_left: u32 },
    /// Feeds the consecutive-hit streak; a spell that never hits resets it.
    HitStreak { hit: bool },
    /// Follow-up lightning on every hit.
    LightningStrike,
    /// Shoves the target sideways on hit.
    KnockbackHit,
    /// Area blast on impact, hitting everything mobile nearby.
    ExplodeOnHit,
    /// Splits into two offset copies the moment the projectile starts falling.
    RainSplit { split: bool },
    /// Applies a status effect to whatever it hits.
    InflictOnHit { affliction: Affliction },
    /// Shell knight: alternates between exposed and damage-proof.
    Shell { shelled: bool, phase: u32 },
    /// Royal guard: alternates a spell-reflecting shield with marching.
    GuardShield { shielded: bool },
    /// Heals every living unit on activation.
    HealAura,
    /// Rage knight: alternates an enraged stand with marching.
    Rage { angry: bool, step: f32 },
    /// The king's phase script.
    KingPhases { phase: u8 },
    /// Player body: kills what touches it, at a price.
    PlayerContact,
    /// Standing stone: chips passing enemies and wears out.
    Ward { amount: i32 },
}

impl BehaviourKind {
    pub fn is_march(&self) -> bool {
        matches!(self, BehaviourKind::March { .. })
    }

    pub fn is_damaging(&self) -> bool {
        matches!(self, BehaviourKind::Damaging { .. })
    }

    pub fn is_summon(&self) -> bool {
        matches!(self, BehaviourKind::Summon { .. })
    }

    pub fn is_enraged(&self) -> bool {
        matches!(self, BehaviourKind::Enraged { .. })
    }

    pub fn is_invulnerable(&self) -> bool {
        matches!(self, BehaviourKind::Invulnerable)
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, BehaviourKind::Frozen { .. })
    }

    /// Default activation divider for this kind: the behaviour body runs
    /// once every `turns` logical ticks of its owner. This stacks with the
    /// owner's own `update_speed` throttle.
    fn default_turns(&self) -> u32 {
        match self {
            BehaviourKind::Bleeding => 3,
            BehaviourKind::GuardShield { .. } => 3,
            BehaviourKind::HealAura => 5,
            BehaviourKind::Rage { .. } => 5,
            _ => 1,
        }
    }
}

pub struct Behaviour {
    pub id: BehaviourId,
    pub turns: u32,
    pub timer: u32,
    pub kind: BehaviourKind,
}

impl Behaviour {
    pub fn new(kind: BehaviourKind) -> Self {
        Self {
            id: BehaviourId(NEXT_BEHAVIOUR_ID.fetch_add(1, Ordering::Relaxed)),
            turns: kind.default_turns(),
            timer: 0,
            kind,
        }
    }

    pub fn summon(unit: UnitKind, interval: f32) -> Self {
        Behaviour::new(BehaviourKind::Summon {
            unit,
            interval,
            timer: 0.0,
            count: 0,
        })
    }

    pub fn despawn_timer(duration: f32) -> Self {
        Behaviour::new(BehaviourKind::DespawnTimer {
            duration,
            elapsed: 0.0,
        })
    }

    pub fn frozen() -> Self {
        Behaviour::new(BehaviourKind::Frozen { ticks_left: 3 })
    }

    pub fn on_added(&mut self, game: &mut Game, owner: ObjectId) {
        if let BehaviourKind::Frozen { .. } = self.kind {
            if let Some(bounds) = game.objects.get(owner).map(|o| o.bounds()) {
                game.burst(
                    fx::cloud(bounds, fx::ice_mist()),
                    6,
                );
            }
        }
    }

    pub fn on_removed(&mut self, game: &mut Game, _owner: ObjectId) {
        if let BehaviourKind::HitStreak { hit } = self.kind {
            if !hit {
                game.streak = 0;
            }
        }
    }

    pub fn on_frame(&mut self, game: &mut Game, owner: ObjectId, dt: f32) {
        match &mut self.kind {
            BehaviourKind::DespawnTimer { duration, elapsed } => {
                *elapsed += dt;
                if *elapsed >= *duration {
                    game.despawn(owner);
                }
            }
            BehaviourKind::Summon {
                unit,
                interval,
                timer,
                count,
            } => {
                *timer += dt;
                if *timer > *interval {
                    *timer = 0.0;
                    *count += 1;
                    let unit = *unit;
                    if let Some(origin) = game.objects.get(owner).map(|o| o.position()) {
                        let summoned = units::build(unit, game);
                        game.spawn_at(summoned, origin.x, origin.y);
                    }
                }
            }
            BehaviourKind::Seeking => seek(game, owner),
            BehaviourKind::RainSplit { split } => {
                let falling = game.objects.get(owner).map(|o| o.vy < 0.0).unwrap_or(false);
                if !*split && falling {
                    *split = true;
                    rain_split(game, owner);
                }
            }
            BehaviourKind::KingPhases { phase } => {
                if *phase == 2 {
                    let summons = game
                        .objects
                        .get(owner)
                        .and_then(|o| o.behaviour(BehaviourKind::is_summon))
                        .map(|b| match b.kind {
                            BehaviourKind::Summon { count, .. } => count,
                            _ => 0,
                        })
                        .unwrap_or(0);
                    if summons >= 5 {
                        *phase = 3;
                        king_guard_down(game, owner);
                    }
                }
            }
            _ => {}
        }
    }

    pub fn on_update(&mut self, game: &mut Game, owner: ObjectId) -> Flow {
        let bid = self.id;
        match &mut self.kind {
            BehaviourKind::March { step } => {
                march(game, owner, *step);
                Flow::Continue
            }
            BehaviourKind::Bleeding => {
                if let Some(center) = game.objects.get(owner).map(|o| o.center()) {
                    game.burst(fx::blood().at(center.x, center.y), 1);
                }
                damage(game, owner, 1, Some(owner));
                Flow::Continue
            }
            BehaviourKind::Frozen { ticks_left } => {
                *ticks_left = ticks_left.saturating_sub(1);
                if *ticks_left == 0 {
                    game.remove_behaviour(owner, bid);
                }
                Flow::Stop
            }
            BehaviourKind::Shell { shelled, phase } => {
                *phase += 1;
                *shelled = *phase % 4 > 1;
                let up = !*shelled;
                if let Some(o) = game.objects.get_mut(owner) {
                    o.sprite = if up {
                        sprites::SHELL_KNIGHT_UP
                    } else {
                        sprites::SHELL_KNIGHT_DOWN
                    };
                }
                Flow::Continue
            }
            BehaviourKind::GuardShield { shielded } => {
                *shielded = !*shielded;
                let step = if *shielded { 0.0 } else { -16.0 };
                let sprite = if *shielded {
                    sprites::ROYAL_GUARD_SHIELDED
                } else {
                    sprites::ROYAL_GUARD
                };
                if let Some(o) = game.objects.get_mut(owner) {
                    o.sprite = sprite;
                    if let Some(march) = o.behaviour_mut(BehaviourKind::is_march) {
                        if let BehaviourKind::March { step: s } = &mut march.kind {
                            *s = step;
                        }
                    }
                }
                Flow::Continue
            }
            BehaviourKind::HealAura => {
                for id in game.objects.ids() {
                    let living = game.objects.get(id).map(|o| o.is(Tags::LIVING));
                    if living == Some(true) {
                        damage(game, id, -1, Some(owner));
                    }
                }
                if let Some(bounds) = game.objects.get(owner).map(|o| o.bounds()) {
                    game.burst(fx::cloud(bounds, fx::stars()), 10);
                }
                Flow::Continue
            }
            BehaviourKind::Rage { angry, step } => {
                *angry = !*angry;
                let angry = *angry;
                let step = *step;
                if angry {
                    game.add_behaviour(
                        owner,
                        Behaviour::new(BehaviourKind::Enraged { mask: Tags::SPELL }),
                    );
                } else {
                    game.remove_behaviour_where(owner, BehaviourKind::is_enraged);
                }
                if let Some(o) = game.objects.get_mut(owner) {
                    o.sprite = if angry {
                        sprites::RAGE_KNIGHT_ENRAGED
                    } else {
                        sprites::RAGE_KNIGHT
                    };
                    if let Some(march) = o.behaviour_mut(BehaviourKind::is_march) {
                        if let BehaviourKind::March { step: s } = &mut march.kind {
                            *s = if angry { 0.0 } else { step };
                        }
                    }
                }
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    pub fn on_damage(&mut self, game: &mut Game, owner: ObjectId, dmg: &mut Damage) {
        match &mut self.kind {
            BehaviourKind::Invulnerable => {
                dmg.amount = dmg.amount.min(0);
            }
            BehaviourKind::Shell { shelled, .. } => {
                if *shelled {
                    dmg.amount = dmg.amount.min(0);
                }
            }
            BehaviourKind::Enraged { mask } => {
                let mask = *mask;
                let enraged_by = dmg
                    .dealer
                    .and_then(|d| game.objects.get(d))
                    .map(|d| d.is(mask))
                    .unwrap_or(false);
                if enraged_by {
                    damage(game, owner, -dmg.amount, Some(owner));
                    dmg.amount = 0;
                    if let Some(bounds) = game.objects.get(owner).map(|o| o.bounds()) {
                        game.burst(fx::blood().over(bounds), 4);
                    }
                }
            }
            BehaviourKind::GuardShield { shielded } => {
                if *shielded {
                    guard_reflect(game, dmg);
                }
            }
            BehaviourKind::KingPhases { phase } => {
                king_phase_damage(game, owner, phase, dmg);
            }
            _ => {}
        }
    }

    pub fn on_death(&mut self, _game: &mut Game, _owner: ObjectId, _death: &Death) {}

    pub fn on_bounce(&mut self, _game: &mut Game, _owner: ObjectId) {}

    pub fn on_collision(&mut self, game: &mut Game, owner: ObjectId, target: ObjectId) {
        match &mut self.kind {
            BehaviourKind::Attack => {
                let deal = game.objects.get(owner).map(|o| o.hp).unwrap_or(0);
                let take = game.objects.get(target).map(|o| o.hp).unwrap_or(0);
                damage(game, target, deal, Some(owner));
                damage(game, owner, take, Some(target));
            }
            BehaviourKind::Damaging { amount } => {
                let amount = *amount;
                damage(game, target, amount, Some(owner));
            }
            BehaviourKind::Ward { amount } => {
                let amount = *amount;
                damage(game, target, amount, Some(owner));
                damage(game, owner, 1, Some(target));
            }
            BehaviourKind::LightningStrike => {
                if let Some(bounds) = game.objects.get(target).map(|o| o.bounds()) {
                    game.burst(fx::lightning(bounds), 8);
                }
                game.events.sound(Cue::Thunder);
                game.events.shake(100.0);
                damage(game, target, 1, Some(owner));
            }
            BehaviourKind::ExplodeOnHit => {
                let Some(center) = game.objects.get(owner).map(|o| o.center()) else {
                    return;
                };
                let mut blast = fx::trail().at(center.x, center.y);
                blast.angle = crate::particles::Range::new(0.0, std::f32::consts::TAU);
                blast.velocity = crate::particles::Range::new(50.0, 150.0);
                blast.duration = crate::particles::Range::new(200.0, 200.0);
                game.burst(blast, 40);
                game.events.shake(100.0);

                let nearby: Vec<ObjectId> = game
                    .objects
                    .iter()
                    .filter(|(_, o)| o.is(Tags::MOBILE))
                    .filter(|(_, o)| center.distance(o.center()) < 50.0)
                    .map(|(id, _)| id)
                    .collect();
                for id in nearby {
                    damage(game, id, 3, Some(owner));
                }
            }
            BehaviourKind::KnockbackHit => {
                // The king doesn't budge
                if let Some(t) = game.objects.get(target) {
                    if t.mass < 1000.0 {
                        let from = t.x;
                        game.tweens.push(Tween::new(
                            200.0,
                            TweenKind::SlideX {
                                id: target,
                                from,
                                to: from + 16.0,
                            },
                        ));
                    }
                }
            }
            BehaviourKind::InflictOnHit { affliction } => match affliction {
                Affliction::Bleed => {
                    game.add_behaviour(target, Behaviour::new(BehaviourKind::Bleeding));
                }
                Affliction::Freeze => {
                    // The king can't be frozen either
                    let mass = game.objects.get(target).map(|o| o.mass).unwrap_or(0.0);
                    if mass < 1000.0 {
                        game.add_behaviour(target, Behaviour::frozen());
                    }
                }
            },
            BehaviourKind::HitStreak { hit } => {
                if !*hit {
                    *hit = true;
                    game.streak += 1;
                    if game.streak % 5 == 0 {
                        let bonus = game.streak;
                        game.add_souls(bonus);
                        if let Some(bounds) = game.objects.get(owner).map(|o| o.bounds()) {
                            game.burst(fx::cloud(bounds, fx::stars()), 6);
                        }
                    }
                }
            }
            BehaviourKind::PlayerContact => {
                let take = game.objects.get(target).map(|o| o.hp).unwrap_or(0);
                damage(game, owner, take, Some(target));
                crate::actions::die(game, target, Some(owner));
                let dead = game.objects.get(owner).map(|o| o.hp <= 0).unwrap_or(true);
                if dead {
                    game.phase = crate::game::GamePhase::Defeat;
                    game.events.sound(Cue::Defeat);
                }
            }
            _ => {}
        }
    }
}

fn march(game: &mut Game, owner: ObjectId, step: f32) {
    let Some(o) = game.objects.get(owner) else {
        return;
    };
    // Can't march if you're flying
    if o.y > 0.0 {
        return;
    }
    let from = o.x;
    game.tweens.push(Tween::new(
        200.0,
        TweenKind::MarchHop {
            id: owner,
            from,
            to: from + step,
        },
    ));

    // Units that march offscreen are gone for good
    if from < 0.0 || from > game.stage.width {
        game.despawn(owner);
    }
}

fn seek(game: &mut Game, owner: ObjectId) {
    let Some(projectile) = game.objects.get(owner) else {
        return;
    };
    let mask = projectile.collision_mask;
    let position = projectile.position();

    let mut target: Option<Vec2> = None;
    let mut min_dist = 100.0;
    for (_, other) in game.objects.iter() {
        if other.is(mask) {
            let dist = position.distance(other.position());
            if dist < min_dist {
                min_dist = dist;
                target = Some(other.position());
            }
        }
    }

    let Some(target) = target else {
        return;
    };
    let Some(projectile) = game.objects.get_mut(owner) else {
        return;
    };
    let velocity = Vec2::new(projectile.vx, projectile.vy);
    let current = vector_to_angle(velocity);
    let desired = crate::geometry::angle_between(position, target);
    let angle = current + (desired - current) / 4.0;
    let steered = vector_from_angle(angle) * velocity.length();
    projectile.vx = steered.x;
    projectile.vy = steered.y;
}

fn rain_split(game: &mut Game, owner: ObjectId) {
    let Some(o) = game.objects.get(owner) else {
        return;
    };
    let (x, y, vx, vy, group_id) = (o.x, o.y, o.vx, o.vy, o.group_id);
    for dvx in [-20.0, 20.0] {
        let mut shard = units::spell_projectile(game);
        shard.x = x;
        shard.y = y;
        shard.vx = vx + dvx;
        shard.vy = vy;
        shard.group_id = group_id;
        let id = game.spawn(shard);
        game.ritual_cast(id, true);
    }
}

fn guard_reflect(game: &mut Game, dmg: &mut Damage) {
    let Some(dealer) = dmg.dealer else {
        return;
    };
    let is_spell = game
        .objects
        .get(dealer)
        .map(|d| d.is(Tags::SPELL))
        .unwrap_or(false);
    if !is_spell {
        return;
    }
    let Some(spell) = game.objects.get_mut(dealer) else {
        return;
    };
    if spell.vx <= 0.0 {
        return;
    }
    dmg.amount = 0;
    spell.vx *= -1.0;
    spell.vy *= -0.25;
    let (vx, vy, mass, x, y) = (spell.vx, spell.vy, spell.mass, spell.x, spell.y);

    let mut orb = units::royal_guard_orb(game);
    orb.vx = vx;
    orb.vy = vy;
    orb.mass = mass;
    let w = orb.sprite.w;
    game.spawn_at(orb, x - w - 1.0, y);
}

fn king_phase_damage(game: &mut Game, owner: ObjectId, phase: &mut u8, dmg: &mut Damage) {
    let Some(o) = game.objects.get(owner) else {
        return;
    };
    let will_die = o.hp - dmg.amount <= 0;

    if *phase == 1 && will_die {
        *phase = 2;
        game.add_behaviour(owner, Behaviour::summon(UnitKind::RoyalGuard, 2000.0));
        game.add_behaviour(
            owner,
            Behaviour::new(BehaviourKind::Enraged { mask: Tags::SPELL }),
        );
        game.add_behaviour(owner, Behaviour::new(BehaviourKind::Invulnerable));
        flip_march(game, owner);
        // The guard comes up mid-blow: the hit heals instead of landing
        damage(game, owner, -dmg.amount, Some(owner));
        dmg.amount = 0;
    } else if *phase == 3 && will_die {
        game.events.sound(Cue::BossKick);
        *phase = 4;
        if let Some(o) = game.objects.get_mut(owner) {
            o.hp = o.max_hp;
            o.sprite = sprites::THE_KING_ON_FOOT;
            o.update_speed = 1000.0;
            o.update_clock = 1000.0;
            if let Some(march) = o.behaviour_mut(BehaviourKind::is_march) {
                if let BehaviourKind::March { step } = &mut march.kind {
                    *step /= 2.0;
                }
            }
        }
    }
}

fn king_guard_down(game: &mut Game, owner: ObjectId) {
    game.remove_behaviour_where(owner, BehaviourKind::is_enraged);
    game.remove_behaviour_where(owner, BehaviourKind::is_invulnerable);
    game.remove_behaviour_where(owner, BehaviourKind::is_summon);
    flip_march(game, owner);
}

fn flip_march(game: &mut Game, owner: ObjectId) {
    if let Some(o) = game.objects.get_mut(owner) {
        if let Some(march) = o.behaviour_mut(BehaviourKind::is_march) {
            if let BehaviourKind::March { step } = &mut march.kind {
                *step *= -1.0;
            }
        }
    }
}
