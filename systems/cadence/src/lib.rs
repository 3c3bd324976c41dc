#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timing counter that paces motion commits against displayed frames.

use sprite_chase_core::{Command, Event};

/// Pure system emitting exactly one motion commit every `speed` frames.
///
/// The counter advances on every [`Event::FrameAdvanced`]. When it reaches
/// `speed` it resets to zero and a [`Command::CommitMotion`] is emitted for
/// that frame.
#[derive(Debug)]
pub struct Cadence {
    speed: u32,
    counter: u32,
}

impl Cadence {
    /// Creates a cadence committing once every `speed` frames.
    ///
    /// A zero speed is treated as one so the counter can always fire.
    #[must_use]
    pub fn new(speed: u32) -> Self {
        Self {
            speed: speed.max(1),
            counter: 0,
        }
    }

    /// Frames counted since the last commit.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Number of frames between two commits.
    #[must_use]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Consumes world events and emits commit commands when the window closes.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::FrameAdvanced { .. } = event {
                self.counter += 1;
                if self.counter >= self.speed {
                    self.counter = 0;
                    out.push(Command::CommitMotion);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_speed_commits_every_frame() {
        let mut cadence = Cadence::new(0);
        let mut commands = Vec::new();
        cadence.handle(&[Event::FrameAdvanced { frame: 1 }], &mut commands);
        assert_eq!(commands, vec![Command::CommitMotion]);
    }

    #[test]
    fn unrelated_events_leave_counter_untouched() {
        let mut cadence = Cadence::new(4);
        let mut commands = Vec::new();
        cadence.handle(
            &[Event::TargetPlaced {
                position: sprite_chase_core::Position::new(1, 1),
            }],
            &mut commands,
        );
        assert_eq!(cadence.counter(), 0);
        assert!(commands.is_empty());
    }
}
