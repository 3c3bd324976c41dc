#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input sampling system that converts pressed buttons into motion intent.

use sprite_chase_core::{Buttons, Command, CoordinateMode};

/// Pure system translating a normalized button mask into motion commands.
///
/// Grid mode keeps only the highest-priority direction as the new heading.
/// Pixel mode forwards every pressed direction so the world can apply them
/// one after another. Releasing the pad emits nothing, leaving the previous
/// intent in place.
#[derive(Debug, Default)]
pub struct InputMapper;

impl InputMapper {
    /// Creates a new input mapper.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits the motion command implied by `pressed` for the active mode.
    pub fn handle(&mut self, pressed: Buttons, mode: CoordinateMode, out: &mut Vec<Command>) {
        match mode {
            CoordinateMode::Grid => {
                if let Some(heading) = pressed.first_heading() {
                    out.push(Command::SetHeading { heading });
                }
            }
            CoordinateMode::Pixel => {
                let directions = pressed.directions();
                if !directions.is_empty() {
                    out.push(Command::SetDirections { directions });
                }
            }
        }
    }
}
