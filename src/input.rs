//! Input translation: pointer position becomes the aim angle, pointer
//! release casts, keys drive the resurrection ability and the shop. No
//! game rules live here.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::actions;
use crate::camera::MainCamera;
use crate::config::GameConfig;
use crate::events::Cue;
use crate::game::GamePhase;
use crate::geometry::angle_between;
use crate::render::world_to_scene;
use crate::shop::{self, ShopOutcome};
use crate::sim::Sim;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            (aim_with_pointer, pointer_actions, key_actions).chain(),
        );
    }
}

fn aim_with_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut sim: ResMut<Sim>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };
    let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };

    let game = &mut sim.game;
    let target = world_to_scene(&game.stage, world);
    let origin = match game.objects.get(game.player) {
        Some(player) => player.center(),
        None => return,
    };
    game.spell.target_angle = angle_between(origin, target);
}

fn pointer_actions(
    mouse: Res<ButtonInput<MouseButton>>,
    config: Res<GameConfig>,
    mut sim: ResMut<Sim>,
) {
    if !mouse.just_released(MouseButton::Left) {
        return;
    }
    let sim = &mut *sim;
    match sim.game.phase {
        GamePhase::Intro => {
            sim.game.phase = GamePhase::Playing;
            sim.game.events.sound(Cue::LevelTheme);
        }
        GamePhase::Playing => actions::cast(&mut sim.game),
        GamePhase::Victory => {
            sim.driver.reset();
            sim.game.phase = GamePhase::Playing;
        }
        GamePhase::Defeat => sim.reset(&config),
        GamePhase::Shopping => {}
    }
}

fn key_actions(keys: Res<ButtonInput<KeyCode>>, mut sim: ResMut<Sim>) {
    let sim = &mut *sim;
    match sim.game.phase {
        GamePhase::Playing => {
            if keys.just_pressed(KeyCode::Space) {
                actions::resurrect(&mut sim.game);
            }
            if keys.just_pressed(KeyCode::KeyP) {
                sim.paused = !sim.paused;
            }
        }
        GamePhase::Shopping => {
            if keys.just_pressed(KeyCode::ArrowUp) {
                shop::select(&mut sim.game, &mut sim.shop, -1);
            }
            if keys.just_pressed(KeyCode::ArrowDown) {
                shop::select(&mut sim.game, &mut sim.shop, 1);
            }
            if keys.just_pressed(KeyCode::Enter) {
                if shop::buy(&mut sim.game, &mut sim.shop) == ShopOutcome::Continue {
                    shop::exit_shop(&mut sim.game);
                    sim.driver.next_level(&mut sim.game);
                }
            }
        }
        _ => {}
    }
}
