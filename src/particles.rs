//! Cosmetic particle simulation. Emitters never touch game logic; the
//! renderer draws them and the simulation only advances their timers.

use bevy::math::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::geometry::{vector_from_angle, Rect};
use crate::sprites::SpriteKind;

/// Base + random spread, sampled per particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Range {
    pub base: f32,
    pub spread: f32,
}

impl Range {
    pub const ZERO: Range = Range { base: 0.0, spread: 0.0 };

    pub const fn new(base: f32, spread: f32) -> Self {
        Self { base, spread }
    }

    pub fn sample(&self, rng: &mut SmallRng) -> f32 {
        self.base + rng.gen::<f32>() * self.spread
    }
}

pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub bounce: f32,
    pub friction: f32,
    pub mass: f32,
    pub elapsed: f32,
    pub duration: f32,
    pub variant: usize,
}

impl Particle {
    /// Animation frame for the renderer, advancing over the particle's life.
    pub fn frame<'a>(&self, variants: &'a [Vec<SpriteKind>]) -> Option<SpriteKind> {
        let frames = variants.get(self.variant)?;
        if frames.is_empty() {
            return None;
        }
        let t = (self.elapsed / self.duration.max(1.0)).clamp(0.0, 1.0);
        let idx = ((t * frames.len() as f32) as usize).min(frames.len() - 1);
        Some(frames[idx])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EmitterId(pub u64);

pub struct Emitter {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub variants: Vec<Vec<SpriteKind>>,
    /// Particles emitted per frame; fractional rates accumulate.
    pub frequency: f32,
    pub velocity: Range,
    pub angle: Range,
    /// Lifetime in ms.
    pub duration: Range,
    pub bounce: Range,
    pub friction: Range,
    pub mass: Range,
    pub particles: Vec<Particle>,
    pub(crate) clock: f32,
    pub(crate) done: bool,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            variants: Vec::new(),
            frequency: 0.0,
            velocity: Range::ZERO,
            angle: Range::ZERO,
            duration: Range::ZERO,
            bounce: Range::ZERO,
            friction: Range::ZERO,
            mass: Range::ZERO,
            particles: Vec::new(),
            clock: 0.0,
            done: false,
        }
    }
}

impl Emitter {
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn over(mut self, area: Rect) -> Self {
        self.x = area.x;
        self.y = area.y;
        self.w = area.w;
        self.h = area.h;
        self
    }

    /// Stop continuous emission; the emitter is reaped once its last
    /// particle expires.
    pub fn finish(&mut self) {
        self.done = true;
    }

    pub fn is_spent(&self) -> bool {
        self.done && self.particles.is_empty()
    }

    pub fn burst(&mut self, count: u32, rng: &mut SmallRng) {
        for _ in 0..count {
            self.emit(rng);
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut SmallRng) {
        let t = dt / 1000.0;

        if !self.done {
            self.clock += self.frequency;
            while self.clock > 0.0 {
                self.clock -= 1.0;
                self.emit(rng);
            }
        }

        self.particles.retain_mut(|p| {
            p.elapsed += dt;
            if p.elapsed >= p.duration {
                return false;
            }
            p.x += p.vx * t;
            p.y += p.vy * t;
            p.vy -= p.mass * t;

            if p.y <= 0.0 {
                p.y = 0.0;
                p.vy *= -p.bounce;
                p.vx *= p.friction;
            }
            true
        });
    }

    fn emit(&mut self, rng: &mut SmallRng) {
        let velocity = self.velocity.sample(rng);
        let dir: Vec2 = vector_from_angle(self.angle.sample(rng));
        let variant = if self.variants.is_empty() {
            0
        } else {
            rng.gen_range(0..self.variants.len())
        };
        self.particles.push(Particle {
            x: Range::new(self.x, self.w).sample(rng),
            y: Range::new(self.y, self.h).sample(rng),
            vx: dir.x * velocity,
            vy: dir.y * velocity,
            bounce: self.bounce.sample(rng),
            friction: self.friction.sample(rng),
            mass: self.mass.sample(rng),
            elapsed: 0.0,
            duration: self.duration.sample(rng),
            variant,
        });
    }
}
