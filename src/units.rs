//! The unit roster. Constructors return unspawned objects; callers place
//! them with `Game::spawn_at`. Constructors that need randomness or an
//! emitter take the game context.

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_2;

use rand::Rng;

use crate::behaviours::{Behaviour, BehaviourKind};
use crate::fx;
use crate::game::Game;
use crate::geometry::Rect;
use crate::object::GameObject;
use crate::particles::Range;
use crate::sprites;
use crate::tags::Tags;

/// Spawnable unit identities, used by summon behaviours and the wave
/// scripts' numeric spawn table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Villager,
    Archer,
    Monk,
    Champion,
    Piper,
    RageKnight,
    RoyalGuard,
    ShellKnight,
    Wizard,
    TheKing,
    Rat,
    /// A random villager-line unit; portals and mobs draw from this.
    Mob,
    Bandit,
    Skeleton,
    SkeletonLord,
    Portal,
}

/// Wave scripts address units by index into this table.
pub const SPAWN_LOOKUP: &[UnitKind] = &[
    UnitKind::Villager,
    UnitKind::Archer,
    UnitKind::Monk,
    UnitKind::Champion,
    UnitKind::Piper,
    UnitKind::RageKnight,
    UnitKind::RoyalGuard,
    UnitKind::ShellKnight,
    UnitKind::Wizard,
    UnitKind::TheKing,
    UnitKind::Rat,
    UnitKind::Mob,
    UnitKind::Bandit,
];

pub fn build(kind: UnitKind, game: &mut Game) -> GameObject {
    match kind {
        UnitKind::Villager => villager(game),
        UnitKind::Archer => archer(game),
        UnitKind::Monk => monk(game),
        UnitKind::Champion => champion(game),
        UnitKind::Piper => piper(game),
        UnitKind::RageKnight => rage_knight(game),
        UnitKind::RoyalGuard => royal_guard(game),
        UnitKind::ShellKnight => shell_knight(game),
        UnitKind::Wizard => wizard(game),
        UnitKind::TheKing => the_king(game),
        UnitKind::Rat => rat(game),
        UnitKind::Mob => match game.rng.gen_range(0..3) {
            0 => villager(game),
            1 => bandit(game),
            _ => archer(game),
        },
        UnitKind::Bandit => bandit(game),
        UnitKind::Skeleton => skeleton(),
        UnitKind::SkeletonLord => skeleton_lord(),
        UnitKind::Portal => portal(game),
    }
}

pub fn corpse() -> GameObject {
    GameObject {
        sprite: sprites::SKULL,
        mass: 100.0,
        tags: Tags::CORPSE,
        ..Default::default()
    }
}

pub fn player() -> GameObject {
    GameObject {
        x: 5.0,
        tags: Tags::PLAYER | Tags::UNDEAD,
        sprite: sprites::PLAYER_IDLE,
        collision_mask: Tags::LIVING,
        update_speed: 1000.0,
        hp: 5,
        max_hp: 5,
        behaviours: VecDeque::from([Behaviour::new(BehaviourKind::PlayerContact)]),
        ..Default::default()
    }
}

pub fn spell_projectile(game: &mut Game) -> GameObject {
    let emitter = game.add_emitter(fx::trail());
    GameObject {
        sprite: sprites::GREEN_SKULL,
        tags: Tags::SPELL,
        collision_mask: Tags::MOBILE | Tags::LIVING,
        mass: 100.0,
        friction: 0.1,
        emitter: Some(emitter),
        despawn_on_collision: true,
        despawn_on_bounce: true,
        behaviours: VecDeque::from([Behaviour::new(BehaviourKind::Damaging { amount: 1 })]),
        ..Default::default()
    }
}

pub fn skeleton() -> GameObject {
    GameObject {
        sprite: sprites::SKELETON,
        tags: Tags::UNDEAD | Tags::MOBILE,
        collision_mask: Tags::LIVING,
        hp: 1,
        max_hp: 1,
        update_speed: 1000.0,
        behaviours: VecDeque::from([
            Behaviour::new(BehaviourKind::March { step: 16.0 }),
            Behaviour::new(BehaviourKind::Attack),
        ]),
        ..Default::default()
    }
}

pub fn skeleton_lord() -> GameObject {
    let mut unit = skeleton();
    unit.sprite = sprites::BIG_SKELETON;
    unit.hp = 5;
    unit.max_hp = 5;
    unit.update_speed = 3000.0;
    unit
}

pub fn villager(game: &mut Game) -> GameObject {
    let sprite = match game.rng.gen_range(0..4) {
        0 => sprites::VILLAGER_1,
        1 => sprites::VILLAGER_2,
        2 => sprites::VILLAGER_3,
        _ => sprites::VILLAGER_4,
    };
    GameObject {
        sprite,
        friction: 0.8,
        mass: 75.0,
        x: game.stage.width,
        tags: Tags::LIVING | Tags::MOBILE,
        hp: 1,
        max_hp: 1,
        update_speed: 600.0,
        corpse_chance: 1.0,
        souls: 5,
        behaviours: VecDeque::from([Behaviour::new(BehaviourKind::March { step: -16.0 })]),
        ..Default::default()
    }
}

pub fn bandit(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::BANDIT;
    unit.hp = 2;
    unit.max_hp = 2;
    unit
}

pub fn archer(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::ARCHER;
    unit.update_speed = 300.0;
    unit.hp = 2;
    unit.max_hp = 2;
    unit
}

pub fn monk(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::MONK;
    unit.update_speed = 600.0;
    unit.hp = 3;
    unit.max_hp = 3;
    unit.souls = 10;
    unit.behaviours
        .push_front(Behaviour::new(BehaviourKind::HealAura));
    unit
}

pub fn champion(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::CHAMPION;
    unit.update_speed = 1000.0;
    unit.hp = 10;
    unit.max_hp = 10;
    unit.souls = 25;
    unit
}

pub fn shell_knight(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::SHELL_KNIGHT_UP;
    unit.update_speed = 1000.0;
    unit.hp = 5;
    unit.max_hp = 5;
    unit.souls = 25;
    unit.behaviours.push_front(Behaviour::new(BehaviourKind::Shell {
        shelled: false,
        phase: 0,
    }));
    unit
}

pub fn rage_knight(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::RAGE_KNIGHT;
    unit.update_speed = 500.0;
    unit.hp = 5;
    unit.max_hp = 5;
    unit.souls = 50;
    unit.behaviours.push_front(Behaviour::new(BehaviourKind::Rage {
        angry: false,
        step: -16.0,
    }));
    unit
}

pub fn royal_guard(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::ROYAL_GUARD;
    unit.hp = 4;
    unit.max_hp = 4;
    unit.souls = 20;
    // Shield after march in the list, so the shield comes up before the
    // first step is taken.
    unit.behaviours
        .push_back(Behaviour::new(BehaviourKind::GuardShield { shielded: false }));
    unit
}

pub fn royal_guard_orb(game: &mut Game) -> GameObject {
    let emitter = game.add_emitter(fx::royalty());
    GameObject {
        sprite: sprites::YELLOW_ORB,
        tags: Tags::LIVING,
        collision_mask: Tags::MOBILE | Tags::PLAYER,
        hp: 1,
        max_hp: 1,
        friction: 0.9,
        emitter: Some(emitter),
        despawn_on_bounce: true,
        despawn_on_collision: true,
        behaviours: VecDeque::from([
            Behaviour::despawn_timer(3000.0),
            Behaviour::new(BehaviourKind::Damaging { amount: 1 }),
        ]),
        ..Default::default()
    }
}

pub fn piper(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::PIPER;
    unit.update_speed = 500.0;
    unit.hp = 15;
    unit.max_hp = 15;
    unit.souls = 200;
    unit.behaviours
        .push_front(Behaviour::summon(UnitKind::Rat, 2000.0));
    unit
}

pub fn rat(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::RAT;
    unit.update_speed = 200.0;
    unit.souls = 1;
    unit.corpse_chance = 0.0;
    unit
}

pub fn wizard(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::WIZARD;
    unit.hp = 5;
    unit.max_hp = 5;
    unit.souls = 30;
    unit.behaviours
        .push_front(Behaviour::summon(UnitKind::Portal, 3000.0));
    unit
}

pub fn portal(game: &mut Game) -> GameObject {
    let sprite = sprites::PORTAL;
    let emitter = game.add_emitter(fx::portal_mist(Rect::new(0.0, 0.0, sprite.w, sprite.h)));
    GameObject {
        sprite,
        tags: Tags::LIVING,
        hp: 3,
        max_hp: 3,
        emitter: Some(emitter),
        behaviours: VecDeque::from([
            // Portals expire before they can be farmed for souls
            Behaviour::despawn_timer(30_000.0),
            Behaviour::summon(UnitKind::Mob, 3000.0),
        ]),
        ..Default::default()
    }
}

pub fn the_king(game: &mut Game) -> GameObject {
    let mut unit = villager(game);
    unit.sprite = sprites::THE_KING;
    unit.update_speed = 5000.0;
    unit.hp = 100;
    unit.max_hp = 100;
    unit.mass = 1000.0;

    let mut emitter = fx::royalty();
    emitter.frequency = 0.2;
    emitter.angle = Range::new(FRAC_PI_2, 0.5);
    emitter.w = unit.sprite.w;
    emitter.h = unit.sprite.h;
    unit.emitter = Some(game.add_emitter(emitter));

    unit.behaviours = VecDeque::from([
        Behaviour::new(BehaviourKind::KingPhases { phase: 1 }),
        Behaviour::new(BehaviourKind::March { step: -32.0 }),
    ]);
    unit
}

pub fn wardstone() -> GameObject {
    GameObject {
        sprite: sprites::WARDSTONE,
        tags: Tags::BARRIER,
        collision_mask: Tags::LIVING,
        hp: 10,
        max_hp: 10,
        behaviours: VecDeque::from([Behaviour::new(BehaviourKind::Ward { amount: 1 })]),
        ..Default::default()
    }
}
