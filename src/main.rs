mod actions;
mod audio;
mod behaviours;
mod camera;
mod config;
mod error;
mod events;
mod fx;
mod game;
mod geometry;
mod input;
mod levels;
mod object;
mod particles;
mod physics;
mod render;
mod rituals;
mod shop;
mod sim;
mod sprites;
mod tags;
mod tween;
mod ui;
mod units;

use bevy::prelude::*;

fn main() {
    let config = config::load_config();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "gravecall".to_string(),
                        resolution: (960.0, 540.0).into(),
                        present_mode: bevy::window::PresentMode::AutoVsync,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .insert_resource(ClearColor(Color::srgb(0.08, 0.07, 0.1)))
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .insert_resource(config)
        .add_plugins(sim::SimPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(render::RenderPlugin)
        .add_plugins(audio::AudioPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
