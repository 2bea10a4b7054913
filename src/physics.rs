//! Physics and collision step: integrate, resolve floor/ceiling bounces,
//! then the full pairwise tag-mask collision scan. Order matters and is
//! part of the contract — see the tests.

use crate::game::Game;
use crate::geometry::overlaps;

/// Minimum vertical impact speed for a floor/ceiling hit to count as a
/// bounce event. Softer landings clamp silently.
pub const BOUNCE_THRESHOLD: f32 = 10.0;

pub fn step(game: &mut Game, dt: f32) {
    let d = dt / 1000.0;

    // Velocities
    let ids = game.objects.ids();
    for &id in &ids {
        if let Some(o) = game.objects.get_mut(id) {
            o.x += o.vx * d;
            o.y += o.vy * d;
        }
    }

    // Bounces
    for &id in &ids {
        let Some(o) = game.objects.get_mut(id) else {
            continue;
        };
        let lower = game.stage.floor;
        let upper = game.stage.ceiling - o.sprite.h;

        let mut bounced = false;
        if o.y < lower || o.y > upper {
            o.y = o.y.clamp(lower, upper);
            let impact = o.vy.abs();
            o.vy *= -o.bounce;
            bounced = impact >= BOUNCE_THRESHOLD;
        }

        if o.y == lower || o.y == upper {
            o.vx *= 1.0 - o.friction;
        }

        if o.mass != 0.0 && o.y > 0.0 {
            o.vy -= o.mass * d;
        }

        if bounced {
            let despawn_after = o.despawn_on_bounce;
            game.behaviour_bounce(id);
            if despawn_after {
                game.despawn(id);
            }
        }
    }

    // Collisions: every initiator against every object, first-registered
    // first. Objects despawned earlier this pass no longer resolve and are
    // skipped; objects spawned mid-pass wait for the next frame.
    let ids = game.objects.ids();
    for &id in &ids {
        for &target in &ids {
            let Some(o) = game.objects.get(id) else {
                break;
            };
            if o.collision_mask.is_empty() {
                break;
            }
            let Some(t) = game.objects.get(target) else {
                continue;
            };
            if !o.collision_mask.intersects(t.tags) {
                continue;
            }
            if !overlaps(o.bounds(), t.bounds()) {
                continue;
            }
            game.object_collision(id, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviours::{Behaviour, BehaviourKind};
    use crate::object::GameObject;
    use crate::sprites;
    use crate::tags::Tags;

    fn ball(bounce: f32, vy: f32, y: f32) -> GameObject {
        GameObject {
            y,
            vy,
            bounce,
            ..Default::default()
        }
    }

    #[test]
    fn hard_landing_reflects_with_restitution() {
        let mut game = Game::new_for_test();
        let id = game.spawn(ball(0.5, -20.0, 0.1));

        // One 16ms frame carries the ball below the floor.
        step(&mut game, 16.0);

        let o = game.objects.get(id).unwrap();
        assert_eq!(o.y, 0.0);
        assert!((o.vy - 10.0).abs() < 1e-4, "vy reflected to +10, got {}", o.vy);
    }

    #[test]
    fn soft_landing_clamps_without_a_bounce_event() {
        let mut game = Game::new_for_test();
        let mut o = ball(0.5, -5.0, 0.05);
        o.despawn_on_bounce = true;
        let id = game.spawn(o);

        step(&mut game, 16.0);

        // Below threshold: clamped and reflected, but no bounce event, so
        // the despawn flag must not have fired.
        assert!(game.objects.contains(id));
        let o = game.objects.get(id).unwrap();
        assert_eq!(o.y, 0.0);
        assert!((o.vy - 2.5).abs() < 1e-4);
    }

    #[test]
    fn despawn_on_bounce_fires_over_threshold() {
        let mut game = Game::new_for_test();
        let mut o = ball(0.5, -20.0, 0.1);
        o.despawn_on_bounce = true;
        let id = game.spawn(o);
        step(&mut game, 16.0);
        assert!(!game.objects.contains(id));
    }

    #[test]
    fn grounded_objects_do_not_accumulate_gravity() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject {
            mass: 100.0,
            y: 0.0,
            ..Default::default()
        });
        step(&mut game, 16.0);
        let o = game.objects.get(id).unwrap();
        assert_eq!(o.vy, 0.0, "resting objects don't keep falling");

        game.objects.get_mut(id).unwrap().y = 50.0;
        step(&mut game, 16.0);
        assert!(game.objects.get(id).unwrap().vy < 0.0);
    }

    #[test]
    fn resting_contact_applies_friction() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject {
            vx: 100.0,
            friction: 0.25,
            y: 0.0,
            ..Default::default()
        });
        step(&mut game, 0.0);
        let o = game.objects.get(id).unwrap();
        assert!((o.vx - 75.0).abs() < 1e-4);
    }

    #[test]
    fn ceiling_accounts_for_sprite_height() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject {
            sprite: sprites::PORTAL,
            y: 500.0,
            vy: 20.0,
            bounce: 1.0,
            ..Default::default()
        });
        step(&mut game, 16.0);
        let o = game.objects.get(id).unwrap();
        assert_eq!(o.y, game.stage.ceiling - o.sprite.h);
        assert!(o.vy < 0.0);
    }

    fn contact_counter(tags: Tags, mask: Tags, x: f32) -> GameObject {
        GameObject {
            x,
            tags,
            collision_mask: mask,
            hp: 100,
            max_hp: 100,
            ..Default::default()
        }
    }

    #[test]
    fn mutual_collisions_fire_both_ways_in_one_frame() {
        let mut game = Game::new_for_test();
        // Two overlapping units (away from the player), each masking the
        // other's tags. Damaging gives each collision an observable effect.
        let mut a = contact_counter(Tags::LIVING, Tags::UNDEAD, 100.0);
        a.behaviours
            .push_back(Behaviour::new(BehaviourKind::Damaging { amount: 1 }));
        let mut b = contact_counter(Tags::UNDEAD, Tags::LIVING, 102.0);
        b.behaviours
            .push_back(Behaviour::new(BehaviourKind::Damaging { amount: 1 }));
        let a = game.spawn(a);
        let b = game.spawn(b);

        step(&mut game, 0.0);

        assert_eq!(game.objects.get(a).unwrap().hp, 99, "b hit a exactly once");
        assert_eq!(game.objects.get(b).unwrap().hp, 99, "a hit b exactly once");
    }

    #[test]
    fn despawn_on_collision_applies_after_the_fanout() {
        let mut game = Game::new_for_test();
        let mut spell = contact_counter(Tags::SPELL, Tags::LIVING, 100.0);
        spell.despawn_on_collision = true;
        spell
            .behaviours
            .push_back(Behaviour::new(BehaviourKind::Damaging { amount: 1 }));
        let spell = game.spawn(spell);
        let victim = game.spawn(contact_counter(Tags::LIVING, Tags::NONE, 101.0));

        step(&mut game, 0.0);

        assert!(!game.objects.contains(spell), "spell consumed by the hit");
        assert_eq!(
            game.objects.get(victim).unwrap().hp,
            99,
            "damage landed before the despawn"
        );
    }

    #[test]
    fn zero_mask_initiates_no_collisions() {
        let mut game = Game::new_for_test();
        let mut bystander = contact_counter(Tags::LIVING, Tags::NONE, 100.0);
        bystander
            .behaviours
            .push_back(Behaviour::new(BehaviourKind::Damaging { amount: 1 }));
        let bystander = game.spawn(bystander);
        let other = game.spawn(contact_counter(Tags::LIVING, Tags::NONE, 101.0));

        step(&mut game, 0.0);

        assert_eq!(game.objects.get(other).unwrap().hp, 100);
        assert_eq!(game.objects.get(bystander).unwrap().hp, 100);
    }
}
