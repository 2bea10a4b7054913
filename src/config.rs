use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

fn default_stage_width() -> f32 {
    400.0
}

fn default_stage_height() -> f32 {
    200.0
}

fn default_ceiling() -> f32 {
    200.0
}

fn default_max_casts() -> u32 {
    3
}

fn default_cast_recharge_rate() -> f32 {
    1000.0
}

fn default_target_power() -> f32 {
    160.0
}

fn default_target_radius() -> f32 {
    15.0
}

fn default_shot_offset_angle() -> f32 {
    0.1
}

fn default_ability_cooldown() -> f32 {
    10_000.0
}

/// Simulation tunables, loadable from JSON so numbers can be adjusted
/// without a rebuild.
#[derive(Resource, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_stage_width")]
    pub stage_width: f32,
    #[serde(default = "default_stage_height")]
    pub stage_height: f32,
    #[serde(default = "default_ceiling")]
    pub ceiling: f32,
    #[serde(default = "default_max_casts")]
    pub max_casts: u32,
    #[serde(default = "default_cast_recharge_rate")]
    pub cast_recharge_rate: f32,
    #[serde(default = "default_target_power")]
    pub target_power: f32,
    #[serde(default = "default_target_radius")]
    pub target_radius: f32,
    #[serde(default = "default_shot_offset_angle")]
    pub shot_offset_angle: f32,
    #[serde(default = "default_ability_cooldown")]
    pub ability_cooldown: f32,
    /// Fixed rng seed; None seeds from entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            stage_width: default_stage_width(),
            stage_height: default_stage_height(),
            ceiling: default_ceiling(),
            max_casts: default_max_casts(),
            cast_recharge_rate: default_cast_recharge_rate(),
            target_power: default_target_power(),
            target_radius: default_target_radius(),
            shot_offset_angle: default_shot_offset_angle(),
            ability_cooldown: default_ability_cooldown(),
            rng_seed: None,
        }
    }
}

/// Load config from the path in `GRAVECALL_GAME_CONFIG` (default
/// `game.json`), falling back to defaults when the file is absent.
pub fn load_config() -> GameConfig {
    let path = std::env::var("GRAVECALL_GAME_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "game.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<GameConfig>(&contents) {
            Ok(cfg) => {
                println!("[gravecall] Loaded config from {}", path);
                cfg
            }
            Err(e) => {
                eprintln!("[gravecall] Failed to parse {}: {}", path, e);
                GameConfig::default()
            }
        },
        Err(_) => GameConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: GameConfig = serde_json::from_str(r#"{ "max_casts": 5 }"#).unwrap();
        assert_eq!(cfg.max_casts, 5);
        assert_eq!(cfg.stage_width, 400.0);
        assert_eq!(cfg.ability_cooldown, 10_000.0);
    }
}
