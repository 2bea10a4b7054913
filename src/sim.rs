//! Bevy-side driver for the simulation core: owns the `Game` context,
//! steps it at a fixed 60 Hz, and runs the level/shop flow around it.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::events::OutEvent;
use crate::game::{Game, GamePhase};
use crate::levels::LevelDriver;
use crate::rituals;
use crate::shop::{self, Shop};

#[derive(Resource)]
pub struct Sim {
    pub game: Game,
    pub driver: LevelDriver,
    pub shop: Shop,
    pub paused: bool,
}

impl Sim {
    pub fn new(config: &GameConfig) -> Self {
        let mut game = Game::new(config);
        // Every run opens with the streak ritual active.
        game.add_ritual(rituals::streak());
        // Ambient dust drifting over the whole stage.
        let mut dust = crate::fx::dust(game.stage.width, game.stage.height);
        dust.burst(200, &mut game.rng);
        game.add_emitter(dust);
        let driver = LevelDriver::new().unwrap_or_else(|e| {
            panic!("invalid wave script: {e}");
        });
        Self {
            game,
            driver,
            shop: Shop::new(rituals::shop_stock()),
            paused: false,
        }
    }

    /// Fresh run after a defeat.
    pub fn reset(&mut self, config: &GameConfig) {
        *self = Sim::new(config);
    }
}

/// Requests the core has emitted this frame, re-published as Bevy events
/// for the camera and audio collaborators.
#[derive(Event, Clone, Copy, Debug)]
pub struct CoreEvent(pub OutEvent);

pub struct SimPlugin;

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<GameConfig>()
            .cloned()
            .unwrap_or_default();
        app.insert_resource(Sim::new(&config))
            .add_event::<CoreEvent>()
            .add_systems(
                FixedUpdate,
                (drive_simulation, level_flow, pump_core_events).chain(),
            );
    }
}

fn drive_simulation(time: Res<Time>, mut sim: ResMut<Sim>) {
    if sim.paused {
        return;
    }
    let dt = time.delta_secs() * 1000.0;
    let sim = &mut *sim;

    if sim.game.phase == GamePhase::Playing {
        sim.driver.update(&mut sim.game, dt);
    }
    sim.game.update(dt);
}

fn level_flow(mut sim: ResMut<Sim>) {
    flow(sim.as_mut());
}

pub(crate) fn flow(sim: &mut Sim) {
    if sim.game.phase != GamePhase::Playing || !sim.driver.is_level_finished(&sim.game) {
        return;
    }

    sim.game.on_level_end();
    if sim.driver.is_complete() {
        // The run is won; the next click starts it over with everything
        // still in place.
        sim.game.phase = GamePhase::Victory;
    } else {
        shop::enter_shop(&mut sim.game, &mut sim.shop);
    }
}

fn pump_core_events(mut sim: ResMut<Sim>, mut writer: EventWriter<CoreEvent>) {
    for event in sim.game.events.drain() {
        writer.send(CoreEvent(event));
    }
}
