use std::collections::VecDeque;

use bevy::prelude::warn;

const MAX_EVENTS: usize = 256;

/// Discrete sound cues requested by the simulation, identified by name
/// only; the audio collaborator owns everything about how they sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Cast,
    Ascend,
    BossKick,
    Pluck,
    Thunder,
    Defeat,
    ShopTheme,
    LevelTheme,
}

/// Fire-and-forget requests flowing out of the simulation core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutEvent {
    Sound(Cue),
    Shake { duration_ms: f32 },
}

/// Bounded outbox drained by the shell once per frame. If nothing drains
/// it (headless tests), old events are dropped and accounted for.
#[derive(Default)]
pub struct EventBus {
    pub pending: VecDeque<OutEvent>,
    pub dropped: u64,
    overflow_warned: bool,
}

impl EventBus {
    pub fn push(&mut self, event: OutEvent) {
        self.pending.push_back(event);
        if self.pending.len() > MAX_EVENTS {
            let excess = self.pending.len() - MAX_EVENTS;
            for _ in 0..excess {
                self.pending.pop_front();
            }
            self.dropped = self.dropped.saturating_add(excess as u64);
            if !self.overflow_warned {
                self.overflow_warned = true;
                warn!(
                    "[gravecall events] Dropped {} outbound events (total dropped: {})",
                    excess, self.dropped
                );
            }
        }
    }

    pub fn sound(&mut self, cue: Cue) {
        self.push(OutEvent::Sound(cue));
    }

    pub fn shake(&mut self, duration_ms: f32) {
        self.push(OutEvent::Shake { duration_ms });
    }

    pub fn drain(&mut self) -> Vec<OutEvent> {
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_drops_oldest_on_overflow() {
        let mut bus = EventBus::default();
        for _ in 0..MAX_EVENTS + 10 {
            bus.sound(Cue::Pluck);
        }
        assert_eq!(bus.pending.len(), MAX_EVENTS);
        assert_eq!(bus.dropped, 10);
    }

    #[test]
    fn drain_empties_the_bus() {
        let mut bus = EventBus::default();
        bus.shake(50.0);
        bus.sound(Cue::Cast);
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(bus.pending.is_empty());
        assert_eq!(events[0], OutEvent::Shake { duration_ms: 50.0 });
    }
}
