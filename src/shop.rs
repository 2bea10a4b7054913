//! The between-levels shop: staple upgrades plus a rotating ritual offer,
//! paid in souls. Ritual offers are filtered through the exclusivity and
//! prerequisite gate before they ever reach the shelf.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::actions::damage;
use crate::events::Cue;
use crate::game::{Game, GamePhase};
use crate::rituals::{Rarity, Ritual};

/// What buying an item does. Enumerated rather than stored as callbacks so
/// the shop stays plain data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShopAction {
    Heal,
    RaiseMaxHp,
    RaiseMaxCasts,
    Ritual(&'static str),
    Continue,
}

#[derive(Clone, Debug)]
pub struct ShopItem {
    pub name: String,
    pub description: String,
    pub cost: u32,
    pub action: ShopAction,
}

/// Outcome the driver acts on after a purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopOutcome {
    Stay,
    Continue,
}

pub struct Shop {
    /// Rituals not yet sold this run.
    pub stock: Vec<Ritual>,
    pub items: Vec<ShopItem>,
    pub selected: usize,
}

impl Shop {
    pub fn new(stock: Vec<Ritual>) -> Self {
        Self {
            stock,
            items: Vec::new(),
            selected: 0,
        }
    }
}

pub fn enter_shop(game: &mut Game, shop: &mut Shop) {
    game.phase = GamePhase::Shopping;
    restock(game, shop);
    for effect in game.ritual_effects() {
        effect.on_shop_enter(game, shop);
    }
    game.events.sound(Cue::ShopTheme);
}

pub fn exit_shop(game: &mut Game) {
    game.phase = GamePhase::Playing;
    game.events.sound(Cue::LevelTheme);
}

pub fn select(game: &mut Game, shop: &mut Shop, step: i32) {
    let last = shop.items.len().saturating_sub(1);
    let selected = shop.selected as i32 + step;
    shop.selected = selected.clamp(0, last as i32) as usize;
    game.events.sound(Cue::Pluck);
}

pub fn buy(game: &mut Game, shop: &mut Shop) -> ShopOutcome {
    let Some(item) = shop.items.get(shop.selected) else {
        return ShopOutcome::Stay;
    };
    if item.cost > game.souls {
        return ShopOutcome::Stay;
    }
    game.souls -= item.cost;
    let item = shop.items.remove(shop.selected);
    shop.selected = shop.selected.min(shop.items.len().saturating_sub(1));

    match item.action {
        ShopAction::Heal => damage(game, game.player, -1, None),
        ShopAction::RaiseMaxHp => {
            if let Some(player) = game.objects.get_mut(game.player) {
                player.max_hp += 1;
                player.hp += 1;
            }
        }
        ShopAction::RaiseMaxCasts => game.spell.max_casts += 1,
        ShopAction::Ritual(name) => {
            if let Some(pos) = shop.stock.iter().position(|r| r.name == name) {
                let ritual = shop.stock.remove(pos);
                game.add_ritual(ritual);
            }
        }
        ShopAction::Continue => return ShopOutcome::Continue,
    }
    ShopOutcome::Stay
}

/// Staples, then up to three ritual offers (one rare, two commons), then
/// the door.
pub fn restock(game: &mut Game, shop: &mut Shop) {
    let mut items = Vec::new();

    let hurt = game
        .objects
        .get(game.player)
        .map(|p| p.hp < p.max_hp)
        .unwrap_or(false);
    if hurt {
        items.push(ShopItem {
            name: "Heal".into(),
            description: "Heal 1".into(),
            cost: 10,
            action: ShopAction::Heal,
        });
    }
    items.push(ShopItem {
        name: "Revive".into(),
        description: "+1 max hp".into(),
        cost: 100,
        action: ShopAction::RaiseMaxHp,
    });
    items.push(ShopItem {
        name: "Charge".into(),
        description: "+1 max casts".into(),
        cost: 10,
        action: ShopAction::RaiseMaxCasts,
    });

    items.extend(ritual_items(game, shop));

    items.push(ShopItem {
        name: "Continue".into(),
        description: "Begin the next level".into(),
        cost: 0,
        action: ShopAction::Continue,
    });

    shop.items = items;
    shop.selected = 0;
}

fn ritual_items(game: &mut Game, shop: &Shop) -> Vec<ShopItem> {
    let mut eligible: Vec<&Ritual> = shop
        .stock
        .iter()
        .filter(|ritual| game.can_add_ritual(ritual))
        .collect();
    eligible.shuffle(&mut game.rng);

    let rares: Vec<&Ritual> = eligible
        .iter()
        .copied()
        .filter(|r| r.rarity == Rarity::Rare)
        .collect();
    let commons: Vec<&Ritual> = eligible
        .iter()
        .copied()
        .filter(|r| r.rarity != Rarity::Rare)
        .collect();

    let pool: Vec<&Ritual> = rares
        .into_iter()
        .take(1)
        .chain(commons.into_iter().take(2))
        .collect();

    pool.into_iter()
        .map(|ritual| {
            let cost = match ritual.rarity {
                Rarity::Rare => 200 + game.rng.gen_range(0..100),
                Rarity::Common => 75 + game.rng.gen_range(0..100),
            };
            ShopItem {
                name: ritual.name.to_string(),
                description: ritual.description.to_string(),
                cost,
                action: ShopAction::Ritual(ritual.name),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rituals;

    fn shop_with_full_stock() -> Shop {
        Shop::new(rituals::shop_stock())
    }

    #[test]
    fn restock_offers_staples_rituals_and_the_door() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        enter_shop(&mut game, &mut shop);

        assert_eq!(game.phase, GamePhase::Shopping);
        assert_eq!(shop.items.first().map(|i| &i.action), Some(&ShopAction::RaiseMaxHp));
        assert_eq!(shop.items.last().map(|i| &i.action), Some(&ShopAction::Continue));
        let rituals_offered = shop
            .items
            .iter()
            .filter(|i| matches!(i.action, ShopAction::Ritual(_)))
            .count();
        assert_eq!(rituals_offered, 3, "one rare, two commons");
    }

    #[test]
    fn heal_is_only_offered_when_hurt() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        restock(&mut game, &mut shop);
        assert!(shop.items.iter().all(|i| i.action != ShopAction::Heal));

        game.objects.get_mut(game.player).unwrap().hp = 3;
        restock(&mut game, &mut shop);
        assert_eq!(shop.items.first().map(|i| &i.action), Some(&ShopAction::Heal));
    }

    #[test]
    fn buying_needs_souls() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        restock(&mut game, &mut shop);
        shop.selected = 0; // Revive, 100 souls

        assert_eq!(buy(&mut game, &mut shop), ShopOutcome::Stay);
        assert_eq!(game.objects.get(game.player).unwrap().max_hp, 5, "too poor");

        game.souls = 150;
        buy(&mut game, &mut shop);
        assert_eq!(game.objects.get(game.player).unwrap().max_hp, 6);
        assert_eq!(game.souls, 50);
    }

    #[test]
    fn buying_a_ritual_registers_it_and_removes_it_from_stock() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        game.souls = 10_000;
        restock(&mut game, &mut shop);

        let (index, name) = shop
            .items
            .iter()
            .enumerate()
            .find_map(|(i, item)| match item.action {
                ShopAction::Ritual(name) => Some((i, name)),
                _ => None,
            })
            .expect("a ritual on the shelf");
        shop.selected = index;
        buy(&mut game, &mut shop);

        assert!(game.rituals.iter().any(|r| r.name == name));
        assert!(shop.stock.iter().all(|r| r.name != name));
    }

    #[test]
    fn sold_splitting_ritual_blocks_its_rival_from_future_stock() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        game.add_ritual(rituals::doubleshot());

        // However often we restock, the rival SPLITTING ritual never shows.
        for _ in 0..20 {
            restock(&mut game, &mut shop);
            assert!(shop
                .items
                .iter()
                .all(|i| i.action != ShopAction::Ritual("Rain")));
        }
    }

    #[test]
    fn ceiling_never_stocks_before_bouncing_is_owned() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        for _ in 0..20 {
            restock(&mut game, &mut shop);
            assert!(shop
                .items
                .iter()
                .all(|i| i.action != ShopAction::Ritual("Ceiling")));
        }
    }

    #[test]
    fn studious_halves_prices_on_entry() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        game.add_ritual(rituals::studious());
        enter_shop(&mut game, &mut shop);
        let revive = shop
            .items
            .iter()
            .find(|i| i.action == ShopAction::RaiseMaxHp)
            .unwrap();
        assert_eq!(revive.cost, 50);
    }

    #[test]
    fn continue_reports_back_to_the_driver() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        restock(&mut game, &mut shop);
        shop.selected = shop.items.len() - 1;
        assert_eq!(buy(&mut game, &mut shop), ShopOutcome::Continue);
    }

    #[test]
    fn selection_clamps_to_the_shelf() {
        let mut game = Game::new_for_test();
        let mut shop = shop_with_full_stock();
        restock(&mut game, &mut shop);
        select(&mut game, &mut shop, -3);
        assert_eq!(shop.selected, 0);
        select(&mut game, &mut shop, 100);
        assert_eq!(shop.selected, shop.items.len() - 1);
    }
}
