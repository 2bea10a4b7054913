//! HUD and shop overlay: plain text, rebuilt each frame from the sim.

use bevy::prelude::*;

use crate::game::GamePhase;
use crate::sim::Sim;

#[derive(Component)]
struct HudText;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, update_hud);
    }
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        HudText,
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgb(0.9, 0.9, 0.85)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            top: Val::Px(8.0),
            ..default()
        },
    ));
}

fn update_hud(sim: Res<Sim>, mut texts: Query<&mut Text, With<HudText>>) {
    let Ok(mut text) = texts.get_single_mut() else {
        return;
    };

    let game = &sim.game;
    let hp = game
        .objects
        .get(game.player)
        .map(|p| (p.hp, p.max_hp))
        .unwrap_or((0, 0));

    let mut lines = vec![format!(
        "lvl {}   hp {}/{}   souls {}   casts {}/{}",
        game.level, hp.0, hp.1, game.souls, game.spell.casts, game.spell.max_casts
    )];

    match game.phase {
        GamePhase::Intro => lines.push("click to begin".into()),
        GamePhase::Playing => {
            if sim.paused {
                lines.push("paused".into());
            }
        }
        GamePhase::Shopping => {
            lines.push(String::new());
            for (i, item) in sim.shop.items.iter().enumerate() {
                let cursor = if i == sim.shop.selected { ">" } else { " " };
                lines.push(format!(
                    "{} {}  ({})  {}",
                    cursor, item.name, item.cost, item.description
                ));
            }
        }
        GamePhase::Defeat => lines.push("the mob prevailed. click to rise again".into()),
        GamePhase::Victory => lines.push("the king is defeated. click to go again".into()),
    }

    text.0 = lines.join("\n");
}
