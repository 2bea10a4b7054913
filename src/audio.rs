//! Audio collaborator: receives sound cues from the core by name and logs
//! them. Cues are fire-and-forget; the core never learns whether anything
//! was audible.

use bevy::prelude::*;

use crate::events::{Cue, OutEvent};
use crate::sim::CoreEvent;

const MAX_LOGGED_CUES: usize = 256;

#[derive(Clone, Debug)]
pub struct CueRecord {
    pub name: &'static str,
}

#[derive(Resource, Default)]
pub struct AudioManager {
    pub recent: Vec<CueRecord>,
}

pub fn cue_name(cue: Cue) -> &'static str {
    match cue {
        Cue::Cast => "cast",
        Cue::Ascend => "ascend",
        Cue::BossKick => "boss_kick",
        Cue::Pluck => "pluck",
        Cue::Thunder => "thunder",
        Cue::Defeat => "defeat",
        Cue::ShopTheme => "shop_theme",
        Cue::LevelTheme => "level_theme",
    }
}

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AudioManager::default())
            .add_systems(Update, log_cues);
    }
}

fn log_cues(mut reader: EventReader<CoreEvent>, mut audio: ResMut<AudioManager>) {
    for CoreEvent(event) in reader.read() {
        if let OutEvent::Sound(cue) = event {
            audio.recent.push(CueRecord {
                name: cue_name(*cue),
            });
            if audio.recent.len() > MAX_LOGGED_CUES {
                let excess = audio.recent.len() - MAX_LOGGED_CUES;
                audio.recent.drain(0..excess);
            }
            if let Some(record) = audio.recent.last() {
                debug!("[gravecall audio] cue: {}", record.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_names_are_stable() {
        assert_eq!(cue_name(Cue::Ascend), "ascend");
        assert_eq!(cue_name(Cue::BossKick), "boss_kick");
    }
}
