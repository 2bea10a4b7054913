//! Fixed-purpose tweens over simulation objects. Durations are in ms.

use std::f32::consts::PI;

use crate::game::Game;
use crate::object::ObjectId;

#[derive(Clone, Copy, Debug)]
pub enum TweenKind {
    /// March step: slides x and drives the cosmetic hop arc. Heavy units
    /// landing from a hop shake the screen.
    MarchHop { id: ObjectId, from: f32, to: f32 },
    /// Plain horizontal shove (knockback).
    SlideX { id: ObjectId, from: f32, to: f32 },
}

#[derive(Clone, Copy, Debug)]
pub struct Tween {
    pub elapsed: f32,
    pub duration: f32,
    pub kind: TweenKind,
}

impl Tween {
    pub fn new(duration: f32, kind: TweenKind) -> Self {
        Self {
            elapsed: 0.0,
            duration,
            kind,
        }
    }
}

pub fn update(game: &mut Game, dt: f32) {
    let mut tweens = std::mem::take(&mut game.tweens);
    tweens.retain_mut(|tween| {
        tween.elapsed += dt;
        let t = (tween.elapsed / tween.duration).clamp(0.0, 1.0);
        apply(game, tween.kind, t);
        t < 1.0
    });
    // Tweens started by a tween callback land in game.tweens; keep both.
    tweens.append(&mut game.tweens);
    game.tweens = tweens;
}

fn apply(game: &mut Game, kind: TweenKind, t: f32) {
    match kind {
        TweenKind::MarchHop { id, from, to } => {
            let mut heavy_landing = false;
            if let Some(o) = game.objects.get_mut(id) {
                o.x = from + (to - from) * t;
                o.hop = (t * PI).sin() * 2.0;
                heavy_landing = t >= 1.0 && o.mass >= 100.0;
            }
            if heavy_landing {
                game.events.shake(50.0);
            }
        }
        TweenKind::SlideX { id, from, to } => {
            if let Some(o) = game.objects.get_mut(id) {
                o.x = from + (to - from) * t;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::object::GameObject;

    #[test]
    fn march_hop_interpolates_and_expires() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject::default());
        game.tweens.push(Tween::new(
            200.0,
            TweenKind::MarchHop {
                id,
                from: 0.0,
                to: 16.0,
            },
        ));

        update(&mut game, 100.0);
        let o = game.objects.get(id).unwrap();
        assert!((o.x - 8.0).abs() < 1e-4);
        assert!(o.hop > 1.9, "hop peaks mid-step");

        update(&mut game, 100.0);
        let o = game.objects.get(id).unwrap();
        assert!((o.x - 16.0).abs() < 1e-4);
        assert!(game.tweens.is_empty());
    }

    #[test]
    fn heavy_units_shake_on_landing() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject {
            mass: 1000.0,
            ..Default::default()
        });
        game.tweens.push(Tween::new(
            200.0,
            TweenKind::MarchHop {
                id,
                from: 0.0,
                to: -32.0,
            },
        ));
        update(&mut game, 250.0);
        let events = game.events.drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, crate::events::OutEvent::Shake { .. })));
    }

    #[test]
    fn tween_for_despawned_object_just_expires() {
        let mut game = Game::new_for_test();
        let id = game.spawn(GameObject::default());
        game.tweens.push(Tween::new(
            200.0,
            TweenKind::SlideX {
                id,
                from: 0.0,
                to: 16.0,
            },
        ));
        game.despawn(id);
        update(&mut game, 300.0);
        assert!(game.tweens.is_empty());
    }
}
