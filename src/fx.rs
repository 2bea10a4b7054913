//! Particle emitter presets. Tuning here is purely cosmetic.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::geometry::Rect;
use crate::particles::{Emitter, Range};
use crate::sprites::SpriteKind;

use SpriteKind::*;

pub fn bones() -> Emitter {
    Emitter {
        duration: Range::new(10_000.0, 5_000.0),
        friction: Range::new(0.6, 0.0),
        velocity: Range::new(5.0, 20.0),
        angle: Range::new(FRAC_PI_2 - 0.5, 1.0),
        bounce: Range::new(0.1, 0.5),
        mass: Range::new(60.0, 0.0),
        variants: vec![vec![Bone1], vec![Bone2], vec![Bone3]],
        ..Default::default()
    }
}

pub fn trail() -> Emitter {
    Emitter {
        duration: Range::new(500.0, 1000.0),
        velocity: Range::new(1.0, 10.0),
        angle: Range::new(PI, -0.5),
        frequency: 2.0,
        mass: Range::new(3.0, 0.0),
        friction: Range::new(0.5, 0.0),
        variants: vec![
            vec![Green1, Green2, Green3],
            vec![Green2, Green3, Green4],
            vec![Green1, Green2, Green3],
        ],
        ..Default::default()
    }
}

pub fn cloud(area: Rect, variants: Vec<Vec<SpriteKind>>) -> Emitter {
    Emitter {
        x: area.x,
        y: area.y,
        w: area.w,
        h: area.h,
        duration: Range::new(500.0, 1000.0),
        velocity: Range::new(1.0, 10.0),
        angle: Range::new(FRAC_PI_2 - 0.2, 0.4),
        frequency: 2.0,
        mass: Range::new(-2.0, 0.0),
        variants,
        ..Default::default()
    }
}

pub fn royalty() -> Emitter {
    let mut emitter = trail();
    emitter.frequency = 0.5;
    emitter.variants = vec![
        vec![Star1, Star2, Star3],
        vec![Star2, Star3, Star4],
        vec![Star1, Star3],
    ];
    emitter
}

pub fn blood() -> Emitter {
    let mut emitter = cloud(
        Rect::default(),
        vec![vec![HealthOrb, HealthPip], vec![HealthPip]],
    );
    emitter.mass = Range::new(10.0, 30.0);
    emitter.velocity = Range::new(10.0, 30.0);
    emitter.frequency = 0.0;
    emitter
}

pub fn resurrection(area: Rect) -> Emitter {
    let mut emitter = cloud(
        area,
        vec![
            vec![Green1, Green2, Green3],
            vec![Green2, Green3, Green4],
            vec![Green1, Green3, Green5],
        ],
    );
    emitter.frequency = 0.0;
    emitter
}

pub fn red_mist() -> Vec<Vec<SpriteKind>> {
    vec![
        vec![Red3, Red2, Red1],
        vec![Red4, Red3, Red2],
        vec![Red3, Red2, Red1],
    ]
}

pub fn ice_mist() -> Vec<Vec<SpriteKind>> {
    vec![vec![Ice1, Ice2, Ice3]]
}

pub fn stars() -> Vec<Vec<SpriteKind>> {
    vec![
        vec![Star1, Star2, Star3],
        vec![Star2, Star3, Star4],
        vec![Star1, Star3],
    ]
}

pub fn lightning(area: Rect) -> Emitter {
    let mut emitter = cloud(
        area,
        vec![
            vec![Lightning1, Lightning2, Lightning3],
            vec![Lightning2, Lightning3, Lightning1],
        ],
    );
    emitter.frequency = 0.0;
    emitter.velocity = Range::new(10.0, 40.0);
    emitter
}

pub fn portal_mist(area: Rect) -> Emitter {
    let mut emitter = cloud(
        area,
        vec![vec![Blue1, Blue2, Blue3], vec![Blue2, Blue3], vec![Blue3]],
    );
    emitter.frequency = 0.2;
    emitter
}

pub fn dust(width: f32, height: f32) -> Emitter {
    Emitter {
        w: width,
        h: height,
        angle: Range::new(0.0, TAU),
        duration: Range::new(5000.0, 10_000.0),
        velocity: Range::new(1.0, 3.0),
        frequency: 0.1,
        variants: vec![vec![Dust1, Dust2], vec![Dust2, Dust1, Dust3, Dust1]],
        ..Default::default()
    }
}
