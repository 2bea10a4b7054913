//! Sprite handles. The simulation only reads width/height (they drive
//! hitbox bounds); everything else about a sprite is the renderer's problem.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    // Units
    PlayerIdle,
    PlayerCasting,
    Skull,
    Skeleton,
    BigSkeleton,
    Villager1,
    Villager2,
    Villager3,
    Villager4,
    Bandit,
    Archer,
    Monk,
    Champion,
    ShellKnightUp,
    ShellKnightDown,
    RageKnight,
    RageKnightEnraged,
    RoyalGuard,
    RoyalGuardShielded,
    Piper,
    Rat,
    Wizard,
    Portal,
    TheKing,
    TheKingOnFoot,
    YellowOrb,
    Wardstone,
    // Projectiles
    GreenSkull,
    RedSkull,
    IceSkull,
    // Particles
    Bone1,
    Bone2,
    Bone3,
    Green1,
    Green2,
    Green3,
    Green4,
    Green5,
    Red1,
    Red2,
    Red3,
    Red4,
    Star1,
    Star2,
    Star3,
    Star4,
    Blue1,
    Blue2,
    Blue3,
    Ice1,
    Ice2,
    Ice3,
    Lightning1,
    Lightning2,
    Lightning3,
    Dust1,
    Dust2,
    Dust3,
    HealthOrb,
    HealthPip,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub w: f32,
    pub h: f32,
}

const fn sprite(kind: SpriteKind, w: f32, h: f32) -> Sprite {
    Sprite { kind, w, h }
}

pub const PLAYER_IDLE: Sprite = sprite(SpriteKind::PlayerIdle, 8.0, 16.0);
pub const PLAYER_CASTING: Sprite = sprite(SpriteKind::PlayerCasting, 8.0, 16.0);
pub const SKULL: Sprite = sprite(SpriteKind::Skull, 6.0, 6.0);
pub const SKELETON: Sprite = sprite(SpriteKind::Skeleton, 6.0, 12.0);
pub const BIG_SKELETON: Sprite = sprite(SpriteKind::BigSkeleton, 10.0, 16.0);
pub const VILLAGER_1: Sprite = sprite(SpriteKind::Villager1, 6.0, 12.0);
pub const VILLAGER_2: Sprite = sprite(SpriteKind::Villager2, 6.0, 12.0);
pub const VILLAGER_3: Sprite = sprite(SpriteKind::Villager3, 6.0, 12.0);
pub const VILLAGER_4: Sprite = sprite(SpriteKind::Villager4, 6.0, 12.0);
pub const BANDIT: Sprite = sprite(SpriteKind::Bandit, 6.0, 12.0);
pub const ARCHER: Sprite = sprite(SpriteKind::Archer, 6.0, 12.0);
pub const MONK: Sprite = sprite(SpriteKind::Monk, 6.0, 12.0);
pub const CHAMPION: Sprite = sprite(SpriteKind::Champion, 8.0, 14.0);
pub const SHELL_KNIGHT_UP: Sprite = sprite(SpriteKind::ShellKnightUp, 8.0, 12.0);
pub const SHELL_KNIGHT_DOWN: Sprite = sprite(SpriteKind::ShellKnightDown, 8.0, 10.0);
pub const RAGE_KNIGHT: Sprite = sprite(SpriteKind::RageKnight, 8.0, 13.0);
pub const RAGE_KNIGHT_ENRAGED: Sprite = sprite(SpriteKind::RageKnightEnraged, 8.0, 13.0);
pub const ROYAL_GUARD: Sprite = sprite(SpriteKind::RoyalGuard, 8.0, 13.0);
pub const ROYAL_GUARD_SHIELDED: Sprite = sprite(SpriteKind::RoyalGuardShielded, 8.0, 13.0);
pub const PIPER: Sprite = sprite(SpriteKind::Piper, 7.0, 13.0);
pub const RAT: Sprite = sprite(SpriteKind::Rat, 6.0, 4.0);
pub const WIZARD: Sprite = sprite(SpriteKind::Wizard, 7.0, 13.0);
pub const PORTAL: Sprite = sprite(SpriteKind::Portal, 14.0, 20.0);
pub const THE_KING: Sprite = sprite(SpriteKind::TheKing, 16.0, 24.0);
pub const THE_KING_ON_FOOT: Sprite = sprite(SpriteKind::TheKingOnFoot, 10.0, 16.0);
pub const YELLOW_ORB: Sprite = sprite(SpriteKind::YellowOrb, 5.0, 5.0);
pub const WARDSTONE: Sprite = sprite(SpriteKind::Wardstone, 8.0, 14.0);

pub const GREEN_SKULL: Sprite = sprite(SpriteKind::GreenSkull, 6.0, 6.0);
pub const RED_SKULL: Sprite = sprite(SpriteKind::RedSkull, 6.0, 6.0);
pub const ICE_SKULL: Sprite = sprite(SpriteKind::IceSkull, 6.0, 6.0);
