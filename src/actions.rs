//! The verbs that mutate entities: damage, death, casting, resurrection.
//! Everything here fans out through behaviours first and rituals second,
//! in registration order.

use rand::Rng;

use crate::events::Cue;
use crate::fx;
use crate::game::Game;
use crate::geometry::vector_from_angle;
use crate::object::ObjectId;
use crate::sprites;
use crate::tags::Tags;
use crate::units;

/// Passed through the target's behaviour chain by mutable reference; each
/// behaviour sees (and may rewrite) the amount left by the ones before it.
/// Negative amounts heal.
pub struct Damage {
    pub amount: i32,
    pub dealer: Option<ObjectId>,
}

/// Built once when an object's hp reaches zero, consumed by behaviour and
/// ritual death hooks, then discarded.
pub struct Death {
    pub object: ObjectId,
    pub killer: Option<ObjectId>,
    pub souls: u32,
}

/// How long the player holds the casting pose, in ms.
pub const CAST_POSE_MS: f32 = 500.0;

pub fn damage(game: &mut Game, target: ObjectId, amount: i32, dealer: Option<ObjectId>) {
    if !game.objects.contains(target) {
        return;
    }
    let mut dmg = Damage { amount, dealer };
    game.behaviour_damage(target, &mut dmg);

    let Some(object) = game.objects.get_mut(target) else {
        return;
    };
    object.hp = (object.hp - dmg.amount).clamp(0, object.max_hp);
    if object.hp == 0 {
        die(game, target, dealer);
    }
}

pub fn die(game: &mut Game, object: ObjectId, killer: Option<ObjectId>) {
    let Some(o) = game.objects.get(object) else {
        return;
    };
    let death = Death {
        object,
        killer,
        souls: o.souls,
    };

    // Only mobile units leave anything behind; barriers and corpses are
    // simply removed.
    if o.is(Tags::MOBILE) {
        let center = o.center();
        let corpse_chance = o.corpse_chance;

        let count: u32 = 2 + game.rng.gen_range(0..3);
        game.burst(fx::bones().at(center.x, center.y), count);

        game.behaviour_death(object, &death);
        for effect in game.ritual_effects() {
            effect.on_death(game, &death);
        }

        if corpse_chance > 0.0 && game.rng.gen::<f32>() <= corpse_chance {
            let corpse = units::corpse();
            game.spawn_at(corpse, center.x, center.y);
        }

        game.add_souls(death.souls);
    }

    game.despawn(object);
}

pub fn cast(game: &mut Game) {
    if game.spell.casts == 0 {
        return;
    }
    game.spell.casts -= 1;

    // Casting pose, with a cancel-and-reschedule revert so chained casts
    // don't flicker the sprite back early.
    if let Some(player) = game.objects.get_mut(game.player) {
        player.sprite = sprites::PLAYER_CASTING;
    }
    game.spell.pose_timer = Some(CAST_POSE_MS);
    game.events.sound(Cue::Cast);

    let shots = game.spell.shots_per_round;
    let offset = game.spell.shot_offset_angle;
    let power = game.spell.target_power;
    let base_angle = game.spell.target_angle - shots as f32 * offset / 2.0;
    let group_id = game.spell.next_group_id;
    game.spell.next_group_id += 1;

    for j in 0..shots {
        let mut projectile = units::spell_projectile(game);
        let dir = vector_from_angle(base_angle + j as f32 * offset);
        let origin = game.casting_point();
        projectile.x = origin.x - projectile.sprite.w / 2.0;
        projectile.y = origin.y - projectile.sprite.h / 2.0;
        projectile.vx = dir.x * power;
        projectile.vy = dir.y * power;
        projectile.group_id = Some(group_id);
        let id = game.spawn(projectile);
        game.ritual_cast(id, false);
    }
}

pub fn resurrect(game: &mut Game) {
    if game.ability.timer < game.ability.cooldown {
        return;
    }
    game.ability.timer = 0.0;

    // Whole-event hooks fire for every ritual before any corpse is touched.
    for effect in game.ritual_effects() {
        effect.on_resurrect(game);
    }

    let corpses: Vec<ObjectId> = game
        .objects
        .iter()
        .filter(|(_, o)| o.is(Tags::CORPSE))
        .map(|(id, _)| id)
        .collect();

    for corpse in corpses {
        let Some(x) = game.objects.get(corpse).map(|c| c.x) else {
            continue;
        };
        game.despawn(corpse);

        let unit = units::skeleton();
        let id = game.spawn_at(unit, x, 0.0);
        if let Some(bounds) = game.objects.get(id).map(|o| o.bounds()) {
            game.burst(fx::resurrection(bounds), 10);
        }
        for effect in game.ritual_effects() {
            effect.on_resurrection(game, id);
        }
    }

    game.events.sound(Cue::Ascend);
}
