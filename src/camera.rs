//! Camera and the screen-shake collaborator. Shake requests arrive from
//! the core as fire-and-forget events with a duration in ms.

use bevy::prelude::*;

use crate::events::OutEvent;
use crate::sim::CoreEvent;

#[derive(Component)]
pub struct MainCamera;

#[derive(Resource)]
pub struct CameraShakeState {
    pub intensity: f32,
    pub remaining: f32,
    pub duration: f32,
}

impl Default for CameraShakeState {
    fn default() -> Self {
        Self {
            intensity: 2.0,
            remaining: 0.0,
            duration: 0.0,
        }
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(CameraShakeState::default())
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, (collect_shake_requests, camera_shake).chain());
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        MainCamera,
        Camera2d,
        OrthographicProjection {
            scale: 0.5,
            ..OrthographicProjection::default_2d()
        },
        Transform::from_xyz(0.0, 0.0, 100.0),
    ));
}

fn collect_shake_requests(mut reader: EventReader<CoreEvent>, mut shake: ResMut<CameraShakeState>) {
    for CoreEvent(event) in reader.read() {
        if let OutEvent::Shake { duration_ms } = event {
            let duration = duration_ms / 1000.0;
            shake.duration = shake.duration.max(duration);
            shake.remaining = shake.remaining.max(duration);
        }
    }
}

fn camera_shake(
    time: Res<Time>,
    mut shake: ResMut<CameraShakeState>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut transform) = cameras.get_single_mut() else {
        return;
    };

    let mut offset = Vec2::ZERO;
    if shake.remaining > 0.0 {
        shake.remaining = (shake.remaining - time.delta_secs()).max(0.0);
        let life = if shake.duration > 0.0 {
            (shake.remaining / shake.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let t = time.elapsed_secs();
        let strength = shake.intensity * life;
        offset.x = (t * 31.0).sin() * strength;
        offset.y = (t * 43.0).cos() * strength;
        if shake.remaining == 0.0 {
            shake.duration = 0.0;
        }
    }

    transform.translation.x = offset.x;
    transform.translation.y = offset.y;
}
