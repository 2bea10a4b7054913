//! Renders the simulation as flat-colored quads: one Bevy sprite entity per
//! live object, immediate-mode gizmo rects for particles. The core never
//! sees any of this.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::behaviours::BehaviourKind;
use crate::game::Stage;
use crate::object::ObjectId;
use crate::sim::Sim;
use crate::sprites::SpriteKind;

/// Scene coordinates are stage-relative with Y up and the floor at 0;
/// world coordinates center the stage on the origin.
pub fn scene_to_world(stage: &Stage, p: Vec2) -> Vec2 {
    Vec2::new(p.x - stage.width / 2.0, p.y - stage.height / 2.0)
}

pub fn world_to_scene(stage: &Stage, p: Vec2) -> Vec2 {
    Vec2::new(p.x + stage.width / 2.0, p.y + stage.height / 2.0)
}

#[derive(Resource, Default)]
struct ObjectSprites(HashMap<ObjectId, Entity>);

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ObjectSprites::default())
            .add_systems(Update, (sync_object_sprites, draw_particles, draw_stage));
    }
}

fn sync_object_sprites(
    mut commands: Commands,
    sim: Res<Sim>,
    mut map: ResMut<ObjectSprites>,
    mut sprites: Query<(&mut Sprite, &mut Transform)>,
) {
    let stage = sim.game.stage;
    let mut live: HashMap<ObjectId, Entity> = HashMap::new();

    for (id, o) in sim.game.objects.iter() {
        let size = Vec2::new(o.sprite.w, o.sprite.h);
        let center = scene_to_world(
            &stage,
            Vec2::new(o.x + o.sprite.w / 2.0, o.y + o.hop + o.sprite.h / 2.0),
        );
        let mut color = color_for(o.sprite.kind);
        if o.has_behaviour(BehaviourKind::is_frozen) {
            color = Color::srgb(0.55, 0.8, 1.0);
        }

        match map.0.get(&id) {
            Some(&entity) => {
                if let Ok((mut sprite, mut transform)) = sprites.get_mut(entity) {
                    sprite.color = color;
                    sprite.custom_size = Some(size);
                    transform.translation.x = center.x;
                    transform.translation.y = center.y;
                }
                live.insert(id, entity);
            }
            None => {
                let entity = commands
                    .spawn((
                        Sprite::from_color(color, size),
                        Transform::from_xyz(center.x, center.y, 10.0),
                    ))
                    .id();
                live.insert(id, entity);
            }
        }
    }

    for (id, entity) in map.0.drain() {
        if !live.contains_key(&id) {
            commands.entity(entity).despawn();
        }
    }
    map.0 = live;
}

fn draw_particles(mut gizmos: Gizmos, sim: Res<Sim>) {
    let stage = sim.game.stage;
    for (_, emitter) in &sim.game.emitters {
        for particle in &emitter.particles {
            let Some(frame) = particle.frame(&emitter.variants) else {
                continue;
            };
            let pos = scene_to_world(&stage, Vec2::new(particle.x, particle.y));
            gizmos.rect_2d(pos, Vec2::splat(2.0), color_for(frame));
        }
    }
}

fn draw_stage(mut gizmos: Gizmos, sim: Res<Sim>) {
    let stage = sim.game.stage;
    let left = scene_to_world(&stage, Vec2::ZERO);
    let right = scene_to_world(&stage, Vec2::new(stage.width, 0.0));
    gizmos.line_2d(left, right, Color::srgb(0.3, 0.25, 0.2));
}

fn color_for(kind: SpriteKind) -> Color {
    use SpriteKind::*;
    match kind {
        PlayerIdle => Color::srgb(0.55, 0.45, 0.7),
        PlayerCasting => Color::srgb(0.7, 0.55, 0.9),
        Skull | Bone1 | Bone2 | Bone3 => Color::srgb(0.9, 0.88, 0.8),
        Skeleton | BigSkeleton => Color::srgb(0.85, 0.85, 0.75),
        Villager1 | Villager2 | Villager3 | Villager4 => Color::srgb(0.75, 0.6, 0.4),
        Bandit => Color::srgb(0.55, 0.4, 0.3),
        Archer => Color::srgb(0.45, 0.55, 0.3),
        Monk => Color::srgb(0.85, 0.8, 0.6),
        Champion => Color::srgb(0.8, 0.5, 0.3),
        ShellKnightUp => Color::srgb(0.5, 0.55, 0.65),
        ShellKnightDown => Color::srgb(0.35, 0.4, 0.5),
        RageKnight => Color::srgb(0.6, 0.3, 0.3),
        RageKnightEnraged => Color::srgb(0.9, 0.2, 0.2),
        RoyalGuard => Color::srgb(0.75, 0.65, 0.3),
        RoyalGuardShielded => Color::srgb(0.9, 0.8, 0.4),
        Piper => Color::srgb(0.6, 0.4, 0.6),
        Rat => Color::srgb(0.4, 0.35, 0.3),
        Wizard => Color::srgb(0.35, 0.3, 0.6),
        Portal => Color::srgb(0.3, 0.4, 0.9),
        TheKing | TheKingOnFoot => Color::srgb(0.95, 0.8, 0.2),
        YellowOrb => Color::srgb(1.0, 0.9, 0.3),
        Wardstone => Color::srgb(0.45, 0.5, 0.45),
        GreenSkull | Green1 | Green2 | Green3 | Green4 | Green5 => Color::srgb(0.4, 0.9, 0.4),
        RedSkull | Red1 | Red2 | Red3 | Red4 | HealthOrb | HealthPip => {
            Color::srgb(0.9, 0.25, 0.25)
        }
        IceSkull | Ice1 | Ice2 | Ice3 => Color::srgb(0.6, 0.85, 1.0),
        Star1 | Star2 | Star3 | Star4 => Color::srgb(1.0, 0.95, 0.6),
        Blue1 | Blue2 | Blue3 => Color::srgb(0.4, 0.55, 0.95),
        Lightning1 | Lightning2 | Lightning3 => Color::srgb(1.0, 1.0, 0.5),
        Dust1 | Dust2 | Dust3 => Color::srgb(0.4, 0.38, 0.35),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn scene_world_round_trip() {
        let game = crate::game::Game::new(&GameConfig::default());
        let p = Vec2::new(120.0, 30.0);
        let back = world_to_scene(&game.stage, scene_to_world(&game.stage, p));
        assert!((back - p).length() < 1e-4);
    }
}
