//! Rituals: persistent global modifiers hooked into cast/resurrect/death
//! and shop lifecycle events. Once registered a ritual never goes away for
//! the rest of the run.

use std::f32::consts::PI;

use rand::Rng;

use crate::actions::Death;
use crate::behaviours::{Affliction, Behaviour, BehaviourKind};
use crate::fx;
use crate::game::Game;
use crate::object::ObjectId;
use crate::particles::Range;
use crate::shop::Shop;
use crate::sprites::{self, SpriteKind};
use crate::tags::Tags;
use crate::units;

// Ritual identity tags, a separate bit-space from entity tags.
pub const NONE: u32 = 0;
pub const BOUNCING: u32 = 1 << 0;
pub const SPLITTING: u32 = 1 << 1;
pub const EXPLOSIVE: u32 = 1 << 2;
pub const HOMING: u32 = 1 << 3;
pub const WARDSTONES: u32 = 1 << 4;
pub const CASTING_RATE: u32 = 1 << 5;
pub const CURSE: u32 = 1 << 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Rare,
}

#[derive(Clone, Debug)]
pub struct Ritual {
    pub name: &'static str,
    pub description: &'static str,
    pub tags: u32,
    /// Cannot coexist with a registered ritual sharing any of these bits.
    pub exclusive_tags: u32,
    /// Requires some registered ritual sharing one of these bits.
    pub required_tags: u32,
    pub rarity: Rarity,
    /// Non-recursive rituals skip projectiles spawned by splits.
    pub recursive: bool,
    pub effect: RitualEffect,
}

impl Ritual {
    const fn new(name: &'static str, description: &'static str, effect: RitualEffect) -> Self {
        Self {
            name,
            description,
            tags: NONE,
            exclusive_tags: NONE,
            required_tags: NONE,
            rarity: Rarity::Common,
            recursive: true,
            effect,
        }
    }
}

/// Every hook a ritual may implement, dispatched per effect. Hooks default
/// to doing nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RitualEffect {
    Streak,
    Bouncing,
    Explosive,
    Triggerfinger,
    Doubleshot,
    Hunter,
    Weightless,
    Knockback,
    Ceiling,
    Rain,
    Drunkard,
    Seer,
    Tearstone,
    Impatience,
    Bleed,
    Allegiance,
    Salvage,
    Studious,
    Electrodynamics,
    Chilly,
    Giants,
    Avarice,
    Hardened,
    Wardstone,
}

impl RitualEffect {
    /// Fired once, at registration.
    pub fn on_active(self, game: &mut Game) {
        match self {
            RitualEffect::Doubleshot => game.spell.shots_per_round = 2,
            RitualEffect::Ceiling => game.stage.ceiling = 48.0,
            RitualEffect::Impatience => game.ability.cooldown /= 2.0,
            RitualEffect::Triggerfinger => game.spell.recharge_rate /= 2.0,
            RitualEffect::Wardstone => {
                for t in [0.3, 0.6] {
                    let x = game.stage.width * t;
                    let stone = units::wardstone();
                    game.spawn_at(stone, x, 0.0);
                }
            }
            _ => {}
        }
    }

    /// Fired per projectile spawned, immediately after the spawn.
    pub fn on_cast(self, game: &mut Game, spell: ObjectId) {
        match self {
            RitualEffect::Streak => {
                game.add_behaviour(
                    spell,
                    Behaviour::new(BehaviourKind::HitStreak { hit: false }),
                );
            }
            RitualEffect::Bouncing => {
                game.add_behaviour(spell, Behaviour::despawn_timer(3000.0));
                if let Some(o) = game.objects.get_mut(spell) {
                    o.despawn_on_bounce = false;
                    o.bounce = 0.5;
                }
            }
            RitualEffect::Hunter => {
                game.add_behaviour(spell, Behaviour::new(BehaviourKind::Seeking));
            }
            RitualEffect::Explosive => {
                game.add_behaviour(spell, Behaviour::new(BehaviourKind::ExplodeOnHit));
            }
            RitualEffect::Weightless => {
                if let Some(o) = game.objects.get_mut(spell) {
                    o.mass = 0.0;
                    o.friction = 0.0;
                    o.bounce = 1.0;
                }
            }
            RitualEffect::Knockback => {
                game.add_behaviour(spell, Behaviour::new(BehaviourKind::KnockbackHit));
            }
            RitualEffect::Rain => {
                game.add_behaviour(
                    spell,
                    Behaviour::new(BehaviourKind::RainSplit { split: false }),
                );
            }
            RitualEffect::Drunkard => {
                let jx = game.rng.gen_range(0..100) as f32 - 50.0;
                let jy = game.rng.gen_range(0..100) as f32 - 50.0;
                if let Some(o) = game.objects.get_mut(spell) {
                    o.vx += jx;
                    o.vy += jy;
                }
                scale_damaging(game, spell, 2);
            }
            RitualEffect::Seer => {
                if let Some(o) = game.objects.get_mut(spell) {
                    o.collision_mask = Tags::LIVING;
                }
            }
            RitualEffect::Tearstone => {
                let hurting = game
                    .objects
                    .get(game.player)
                    .map(|p| p.hp < p.max_hp / 2)
                    .unwrap_or(false);
                if hurting {
                    scale_damaging(game, spell, 3);
                }
            }
            RitualEffect::Bleed => {
                let emitter = game.objects.get(spell).and_then(|o| o.emitter);
                if let Some(o) = game.objects.get_mut(spell) {
                    o.sprite = sprites::RED_SKULL;
                }
                if let Some(e) = emitter.and_then(|id| game.emitter_mut(id)) {
                    e.variants = fx::red_mist();
                    e.frequency = 5.0;
                    e.angle = Range::new(PI, 0.0);
                    e.mass = Range::new(20.0, 50.0);
                }
                game.add_behaviour(
                    spell,
                    Behaviour::new(BehaviourKind::InflictOnHit {
                        affliction: Affliction::Bleed,
                    }),
                );
            }
            RitualEffect::Electrodynamics => {
                game.add_behaviour(spell, Behaviour::new(BehaviourKind::LightningStrike));
            }
            RitualEffect::Chilly => {
                if game.rng.gen::<f32>() <= 0.1 {
                    let emitter = game.objects.get(spell).and_then(|o| o.emitter);
                    if let Some(o) = game.objects.get_mut(spell) {
                        o.sprite = sprites::ICE_SKULL;
                    }
                    if let Some(e) = emitter.and_then(|id| game.emitter_mut(id)) {
                        e.variants = fx::ice_mist();
                    }
                    set_damaging(game, spell, 0);
                    // Added last so the freeze lands before the target's own
                    // behaviours get their tick.
                    game.add_behaviour(
                        spell,
                        Behaviour::new(BehaviourKind::InflictOnHit {
                            affliction: Affliction::Freeze,
                        }),
                    );
                }
            }
            _ => {}
        }
    }

    /// Fired once per resurrection action, before any corpse is processed.
    pub fn on_resurrect(self, game: &mut Game) {
        if self == RitualEffect::Allegiance {
            for i in 0..3 {
                let mut lord = units::skeleton_lord();
                lord.update_speed = 200.0;
                game.spawn_at(lord, i as f32 * -15.0, 0.0);
            }
        }
    }

    /// Fired once per corpse actually converted, with the new unit.
    pub fn on_resurrection(self, game: &mut Game, unit: ObjectId) {
        match self {
            RitualEffect::Giants => {
                if game.rng.gen::<f32>() < 0.2 {
                    let Some((x, y)) = game.objects.get(unit).map(|o| (o.x, o.y)) else {
                        return;
                    };
                    game.despawn(unit);
                    let lord = units::skeleton_lord();
                    game.spawn_at(lord, x, y);
                }
            }
            RitualEffect::Avarice => game.add_souls(1),
            RitualEffect::Hardened => {
                if let Some(o) = game.objects.get_mut(unit) {
                    o.max_hp += 1;
                    o.hp = o.max_hp;
                }
            }
            _ => {}
        }
    }

    pub fn on_death(self, _game: &mut Game, _death: &Death) {}

    pub fn on_frame(self, _game: &mut Game, _dt: f32) {}

    /// Fired by the level driver when a level is cleared.
    pub fn on_level_end(self, game: &mut Game) {
        if self == RitualEffect::Salvage {
            let corpses: Vec<ObjectId> = game
                .objects
                .iter()
                .filter(|(_, o)| o.is(Tags::CORPSE))
                .map(|(id, _)| id)
                .collect();
            for corpse in corpses {
                if let Some(center) = game.objects.get(corpse).map(|o| o.center()) {
                    let mut emitter = fx::bones().at(center.x, center.y);
                    emitter.variants = vec![vec![SpriteKind::GreenSkull]];
                    emitter.duration = Range::new(100.0, 1000.0);
                    game.burst(emitter, 5);
                }
                game.despawn(corpse);
                game.add_souls(5);
            }
        }
    }

    /// Fired by the shop driver right after restocking.
    pub fn on_shop_enter(self, _game: &mut Game, shop: &mut Shop) {
        if self == RitualEffect::Studious {
            for item in &mut shop.items {
                item.cost /= 2;
            }
        }
    }
}

fn scale_damaging(game: &mut Game, spell: ObjectId, factor: i32) {
    if let Some(o) = game.objects.get_mut(spell) {
        if let Some(b) = o.behaviour_mut(BehaviourKind::is_damaging) {
            if let BehaviourKind::Damaging { amount } = &mut b.kind {
                *amount *= factor;
            }
        }
    }
}

fn set_damaging(game: &mut Game, spell: ObjectId, value: i32) {
    if let Some(o) = game.objects.get_mut(spell) {
        if let Some(b) = o.behaviour_mut(BehaviourKind::is_damaging) {
            if let BehaviourKind::Damaging { amount } = &mut b.kind {
                *amount = value;
            }
        }
    }
}

// ── The library ─────────────────────────────────────────────────────────

/// The starting ritual: every run opens with the hit streak active.
pub fn streak() -> Ritual {
    Ritual::new("Streak", "Consecutive hits pay out souls", RitualEffect::Streak)
}

pub fn bouncing() -> Ritual {
    Ritual {
        tags: BOUNCING,
        ..Ritual::new("Bouncing", "Spells bounce", RitualEffect::Bouncing)
    }
}

pub fn doubleshot() -> Ritual {
    Ritual {
        tags: SPLITTING,
        exclusive_tags: SPLITTING,
        rarity: Rarity::Rare,
        ..Ritual::new("Doubleshot", "Cast 2 spells", RitualEffect::Doubleshot)
    }
}

pub fn explosive() -> Ritual {
    Ritual {
        tags: EXPLOSIVE,
        rarity: Rarity::Rare,
        ..Ritual::new("Explosive", "Spells burst on impact", RitualEffect::Explosive)
    }
}

pub fn triggerfinger() -> Ritual {
    Ritual {
        tags: CASTING_RATE,
        ..Ritual::new(
            "Triggerfinger",
            "Casts recharge 2x faster",
            RitualEffect::Triggerfinger,
        )
    }
}

pub fn hunter() -> Ritual {
    Ritual {
        tags: HOMING,
        rarity: Rarity::Rare,
        ..Ritual::new("Hunter", "Spells seek targets", RitualEffect::Hunter)
    }
}

pub fn weightless() -> Ritual {
    Ritual::new(
        "Weightless",
        "Spells are not affected by gravity",
        RitualEffect::Weightless,
    )
}

pub fn knockback() -> Ritual {
    Ritual::new("Knockback", "Spells knock backwards", RitualEffect::Knockback)
}

pub fn ceiling() -> Ritual {
    Ritual {
        required_tags: BOUNCING,
        ..Ritual::new("Ceiling", "Adds a ceiling", RitualEffect::Ceiling)
    }
}

pub fn rain() -> Ritual {
    Ritual {
        tags: SPLITTING,
        exclusive_tags: SPLITTING,
        rarity: Rarity::Rare,
        recursive: false,
        ..Ritual::new("Rain", "Spells split when they drop", RitualEffect::Rain)
    }
}

pub fn drunkard() -> Ritual {
    Ritual::new("Drunkard", "2x damage, wobbly aim", RitualEffect::Drunkard)
}

pub fn seer() -> Ritual {
    Ritual::new("Seer", "Spells pass through the dead", RitualEffect::Seer)
}

pub fn tearstone() -> Ritual {
    Ritual::new(
        "Tearstone",
        "3x damage below half health",
        RitualEffect::Tearstone,
    )
}

pub fn impatience() -> Ritual {
    Ritual::new(
        "Impatience",
        "Resurrection recharges 2x faster",
        RitualEffect::Impatience,
    )
}

pub fn bleed() -> Ritual {
    Ritual {
        tags: CURSE,
        ..Ritual::new("Bleed", "Inflicts bleed on hits", RitualEffect::Bleed)
    }
}

pub fn allegiance() -> Ritual {
    Ritual::new(
        "Allegiance",
        "Summon your honour guard after resurrections",
        RitualEffect::Allegiance,
    )
}

pub fn salvage() -> Ritual {
    Ritual::new(
        "Salvage",
        "Corpses become souls at the end of levels",
        RitualEffect::Salvage,
    )
}

pub fn studious() -> Ritual {
    Ritual {
        rarity: Rarity::Rare,
        ..Ritual::new("Studious", "Rituals are 50% cheaper", RitualEffect::Studious)
    }
}

pub fn electrodynamics() -> Ritual {
    Ritual {
        rarity: Rarity::Rare,
        ..Ritual::new(
            "Electrodynamics",
            "Lightning strikes after hits",
            RitualEffect::Electrodynamics,
        )
    }
}

pub fn chilly() -> Ritual {
    Ritual::new(
        "Chilly",
        "10% chance to freeze enemies",
        RitualEffect::Chilly,
    )
}

pub fn giants() -> Ritual {
    Ritual::new(
        "Giants",
        "20% chance to resurrect giant skeletons",
        RitualEffect::Giants,
    )
}

pub fn avarice() -> Ritual {
    Ritual::new(
        "Avarice",
        "+1 soul for each corpse you resurrect",
        RitualEffect::Avarice,
    )
}

pub fn hardened() -> Ritual {
    Ritual::new("Hardened", "Undead have +1 HP", RitualEffect::Hardened)
}

pub fn wardstone() -> Ritual {
    Ritual {
        tags: WARDSTONES,
        ..Ritual::new(
            "Wardstone",
            "Standing stones harry the mob",
            RitualEffect::Wardstone,
        )
    }
}

/// Everything the shop can stock, in its canonical order.
pub fn shop_stock() -> Vec<Ritual> {
    vec![
        ceiling(),
        explosive(),
        rain(),
        bouncing(),
        doubleshot(),
        hunter(),
        weightless(),
        knockback(),
        drunkard(),
        triggerfinger(),
        seer(),
        tearstone(),
        impatience(),
        bleed(),
        allegiance(),
        salvage(),
        studious(),
        electrodynamics(),
        chilly(),
        giants(),
        avarice(),
        hardened(),
        wardstone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::cast;

    #[test]
    fn exclusive_tags_block_registration() {
        let mut game = Game::new_for_test();
        game.add_ritual(doubleshot());
        assert!(!game.can_add_ritual(&rain()), "two SPLITTING rituals");
        assert!(game.can_add_ritual(&bouncing()));
    }

    #[test]
    fn exclusivity_is_checked_from_the_candidate_only() {
        // Asymmetry is intentional: A with exclusive_tags=X blocks nothing
        // once registered unless the candidate declares the conflict.
        let mut game = Game::new_for_test();
        let blocker = Ritual {
            tags: NONE,
            exclusive_tags: HOMING,
            ..hunter()
        };
        game.add_ritual(blocker);
        // hunter's tags intersect the registered exclusive_tags, but only
        // the candidate's own exclusive_tags are consulted.
        assert!(game.can_add_ritual(&hunter()));
    }

    #[test]
    fn required_tags_gate_until_met() {
        let mut game = Game::new_for_test();
        assert!(!game.can_add_ritual(&ceiling()));
        game.add_ritual(bouncing());
        assert!(game.can_add_ritual(&ceiling()));
    }

    #[test]
    fn impossible_requirement_is_inert_not_an_error() {
        let mut game = Game::new_for_test();
        let orphan = Ritual {
            required_tags: 1 << 30,
            ..weightless()
        };
        for ritual in shop_stock() {
            game.add_ritual(ritual);
        }
        assert!(!game.can_add_ritual(&orphan));
    }

    #[test]
    fn bouncing_reconfigures_cast_projectiles() {
        let mut game = Game::new_for_test();
        game.add_ritual(bouncing());
        cast(&mut game);
        let (_, spell) = game
            .objects
            .iter()
            .find(|(_, o)| o.is(Tags::SPELL))
            .expect("projectile spawned");
        assert!(!spell.despawn_on_bounce);
        assert_eq!(spell.bounce, 0.5);
    }

    #[test]
    fn doubleshot_widens_the_fan() {
        let mut game = Game::new_for_test();
        game.add_ritual(doubleshot());
        cast(&mut game);
        let spells = game
            .objects
            .iter()
            .filter(|(_, o)| o.is(Tags::SPELL))
            .count();
        assert_eq!(spells, 2);
    }

    #[test]
    fn explosive_spells_blast_the_neighbourhood() {
        let mut game = Game::new_for_test();
        game.add_ritual(explosive());
        crate::actions::cast(&mut game);
        let (spell, _) = game
            .objects
            .iter()
            .find(|(_, o)| o.is(Tags::SPELL))
            .expect("projectile spawned");

        let near = game.spawn_at(
            crate::object::GameObject {
                tags: Tags::LIVING | Tags::MOBILE,
                hp: 5,
                max_hp: 5,
                ..Default::default()
            },
            100.0,
            0.0,
        );
        let far = game.spawn_at(
            crate::object::GameObject {
                tags: Tags::LIVING | Tags::MOBILE,
                hp: 5,
                max_hp: 5,
                ..Default::default()
            },
            300.0,
            0.0,
        );

        // Detonate next to the near unit.
        if let Some(o) = game.objects.get_mut(spell) {
            o.x = 98.0;
            o.y = 0.0;
        }
        game.object_collision(spell, near);

        // 1 contact damage + 3 blast damage.
        assert_eq!(game.objects.get(near).unwrap().hp, 1);
        assert_eq!(game.objects.get(far).unwrap().hp, 5, "out of blast range");
    }

    #[test]
    fn triggerfinger_speeds_up_recharging() {
        let mut game = Game::new_for_test();
        let rate = game.spell.recharge_rate;
        game.add_ritual(triggerfinger());
        assert_eq!(game.spell.recharge_rate, rate / 2.0);
    }

    #[test]
    fn hardened_buffs_each_resurrected_unit() {
        let mut game = Game::new_for_test();
        game.add_ritual(hardened());
        let corpse = units::corpse();
        game.spawn_at(corpse, 60.0, 0.0);
        game.ability.timer = game.ability.cooldown;
        crate::actions::resurrect(&mut game);

        let (_, skeleton) = game
            .objects
            .iter()
            .find(|(_, o)| o.is(Tags::UNDEAD) && !o.is(Tags::PLAYER))
            .expect("skeleton raised");
        assert_eq!(skeleton.max_hp, 2);
        assert_eq!(skeleton.hp, 2);
    }

    #[test]
    fn avarice_pays_per_corpse() {
        let mut game = Game::new_for_test();
        game.add_ritual(avarice());
        for x in [40.0, 60.0] {
            let corpse = units::corpse();
            game.spawn_at(corpse, x, 0.0);
        }
        game.ability.timer = game.ability.cooldown;
        crate::actions::resurrect(&mut game);
        assert_eq!(game.souls, 2);
    }

    #[test]
    fn allegiance_fires_once_however_many_corpses_rise() {
        let mut game = Game::new_for_test();
        game.add_ritual(allegiance());
        for x in [40.0, 60.0, 80.0] {
            let corpse = units::corpse();
            game.spawn_at(corpse, x, 0.0);
        }
        game.ability.timer = game.ability.cooldown;
        crate::actions::resurrect(&mut game);

        let lords = game
            .objects
            .iter()
            .filter(|(_, o)| o.sprite.kind == sprites::BIG_SKELETON.kind)
            .count();
        assert_eq!(lords, 3, "one honour guard of three, not one per corpse");
        let skeletons = game
            .objects
            .iter()
            .filter(|(_, o)| o.sprite.kind == sprites::SKELETON.kind)
            .count();
        assert_eq!(skeletons, 3, "every corpse still converts");
    }

    #[test]
    fn salvage_cashes_out_corpses_at_level_end() {
        let mut game = Game::new_for_test();
        game.add_ritual(salvage());
        for x in [40.0, 60.0, 80.0] {
            let corpse = units::corpse();
            game.spawn_at(corpse, x, 0.0);
        }
        game.on_level_end();
        assert_eq!(game.souls, 15);
        assert!(game.objects.iter().all(|(_, o)| !o.is(Tags::CORPSE)));
    }

    #[test]
    fn wardstone_plants_barriers() {
        let mut game = Game::new_for_test();
        game.add_ritual(wardstone());
        let stones = game
            .objects
            .iter()
            .filter(|(_, o)| o.is(Tags::BARRIER))
            .count();
        assert_eq!(stones, 2);
    }

    #[test]
    fn ceiling_lowers_the_stage() {
        let mut game = Game::new_for_test();
        game.add_ritual(bouncing());
        game.add_ritual(ceiling());
        assert_eq!(game.stage.ceiling, 48.0);
    }
}
