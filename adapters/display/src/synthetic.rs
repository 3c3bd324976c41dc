//! Recording display used by tests and headless runs.
//!
//! [`SyntheticDisplay`] treats both blanking waits as an instantaneous clock
//! tick, serves button states from a scripted [`InputScript`], and records
//! every call the loop makes so sessions can be inspected or compared.

use std::{fmt, str::FromStr};

use sprite_chase_core::Buttons;
use thiserror::Error;

use crate::{DisplayAdapter, PaletteSlot, Rgb, SpriteId, TilePattern};

/// Single call observed by the synthetic display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayCall {
    /// The loop waited for any blanking in progress to end.
    WaitBlankingStart,
    /// The loop waited for blanking to begin; one frame elapsed.
    WaitBlankingEnd,
    /// The loop sampled the buttons.
    ReadInput {
        /// Buttons reported to the loop.
        buttons: Buttons,
    },
    /// The loop moved a sprite.
    SpritePosition {
        /// Sprite that moved.
        sprite: SpriteId,
        /// Horizontal display coordinate.
        x: u32,
        /// Vertical display coordinate.
        y: u32,
    },
    /// The loop loaded a palette entry.
    PaletteColor {
        /// Palette entry written.
        slot: PaletteSlot,
        /// Color loaded.
        color: Rgb,
    },
    /// The loop uploaded a sprite tile.
    SpriteTile {
        /// Sprite whose tile was written.
        sprite: SpriteId,
        /// Pattern uploaded.
        pattern: TilePattern,
    },
}

/// Errors produced while parsing an input script.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// A comma-separated entry was blank.
    #[error("script entry {index} is empty")]
    EmptyEntry {
        /// Zero-based position of the entry.
        index: usize,
    },
    /// A button name was not recognised.
    #[error("unknown button `{name}`")]
    UnknownButton {
        /// Name as written in the script.
        name: String,
    },
    /// A repeat count was not a positive integer.
    #[error("invalid frame count `{count}` in `{entry}`")]
    InvalidCount {
        /// Entry containing the count.
        entry: String,
        /// Count as written in the script.
        count: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Hold {
    buttons: Buttons,
    frames: u64,
}

/// Sequence of button states, each held for a number of frames.
///
/// The textual form is a comma-separated list of `buttons*frames` entries,
/// where `buttons` joins names with `+` and `*frames` defaults to one:
/// `"right*90,up+left*4,none*10,a"`. Once exhausted the script reports no
/// buttons pressed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputScript {
    holds: Vec<Hold>,
}

impl InputScript {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `buttons` held for `frames` frames.
    #[must_use]
    pub fn hold(mut self, buttons: Buttons, frames: u64) -> Self {
        if frames > 0 {
            self.holds.push(Hold { buttons, frames });
        }
        self
    }

    /// Total number of scripted frames.
    #[must_use]
    pub fn len_frames(&self) -> u64 {
        self.holds.iter().map(|hold| hold.frames).sum()
    }

    /// Buttons held during the zero-based `frame`.
    #[must_use]
    pub fn buttons_at(&self, frame: u64) -> Buttons {
        let mut remaining = frame;
        for hold in &self.holds {
            if remaining < hold.frames {
                return hold.buttons;
            }
            remaining -= hold.frames;
        }
        Buttons::empty()
    }
}

impl FromStr for InputScript {
    type Err = ScriptError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut script = Self::new();
        if text.trim().is_empty() {
            return Ok(script);
        }

        for (index, entry) in text.split(',').enumerate() {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(ScriptError::EmptyEntry { index });
            }

            let (names, frames) = match entry.split_once('*') {
                Some((names, count)) => {
                    let frames = count
                        .trim()
                        .parse::<u64>()
                        .ok()
                        .filter(|frames| *frames > 0)
                        .ok_or_else(|| ScriptError::InvalidCount {
                            entry: entry.to_owned(),
                            count: count.trim().to_owned(),
                        })?;
                    (names, frames)
                }
                None => (entry, 1),
            };

            let mut buttons = Buttons::empty();
            for name in names.split('+') {
                buttons |= parse_button(name.trim())?;
            }
            script = script.hold(buttons, frames);
        }

        Ok(script)
    }
}

impl fmt::Display for InputScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, hold) in self.holds.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            if hold.buttons.is_empty() {
                f.write_str("none")?;
            } else {
                for (position, (name, _)) in hold.buttons.iter_names().enumerate() {
                    if position > 0 {
                        f.write_str("+")?;
                    }
                    f.write_str(&name.to_ascii_lowercase())?;
                }
            }
            write!(f, "*{}", hold.frames)?;
        }
        Ok(())
    }
}

fn parse_button(name: &str) -> Result<Buttons, ScriptError> {
    let buttons = match name.to_ascii_lowercase().as_str() {
        "up" => Buttons::UP,
        "down" => Buttons::DOWN,
        "left" => Buttons::LEFT,
        "right" => Buttons::RIGHT,
        "a" => Buttons::A,
        "b" => Buttons::B,
        "select" => Buttons::SELECT,
        "start" => Buttons::START,
        "l" => Buttons::L,
        "r" => Buttons::R,
        "none" | "idle" => Buttons::empty(),
        _ => {
            return Err(ScriptError::UnknownButton {
                name: name.to_owned(),
            })
        }
    };
    Ok(buttons)
}

/// Display adapter that records calls instead of touching hardware.
#[derive(Clone, Debug, Default)]
pub struct SyntheticDisplay {
    script: InputScript,
    frames: u64,
    calls: Vec<DisplayCall>,
}

impl SyntheticDisplay {
    /// Creates a display that serves buttons from `script`.
    #[must_use]
    pub fn new(script: InputScript) -> Self {
        Self {
            script,
            frames: 0,
            calls: Vec::new(),
        }
    }

    /// Number of blanking intervals that have begun so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Every call recorded so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[DisplayCall] {
        &self.calls
    }

    /// Removes and returns the recorded calls.
    pub fn take_calls(&mut self) -> Vec<DisplayCall> {
        std::mem::take(&mut self.calls)
    }

    /// Every position written to `sprite`, oldest first.
    #[must_use]
    pub fn sprite_positions(&self, sprite: SpriteId) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DisplayCall::SpritePosition { sprite: id, x, y } if *id == sprite => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    /// Most recent position written to `sprite`.
    #[must_use]
    pub fn last_position(&self, sprite: SpriteId) -> Option<(u32, u32)> {
        self.sprite_positions(sprite).last().copied()
    }
}

impl DisplayAdapter for SyntheticDisplay {
    fn wait_for_blanking_boundary_start(&mut self) {
        self.calls.push(DisplayCall::WaitBlankingStart);
    }

    fn wait_for_blanking_boundary_end(&mut self) {
        self.frames += 1;
        self.calls.push(DisplayCall::WaitBlankingEnd);
    }

    fn read_raw_input(&mut self) -> Buttons {
        let buttons = self.script.buttons_at(self.frames.saturating_sub(1));
        self.calls.push(DisplayCall::ReadInput { buttons });
        buttons
    }

    fn set_sprite_position(&mut self, sprite: SpriteId, x: u32, y: u32) {
        self.calls.push(DisplayCall::SpritePosition { sprite, x, y });
    }

    fn set_palette_color(&mut self, slot: PaletteSlot, color: Rgb) {
        self.calls.push(DisplayCall::PaletteColor { slot, color });
    }

    fn init_sprite_tile(&mut self, sprite: SpriteId, pattern: &TilePattern) {
        self.calls.push(DisplayCall::SpriteTile {
            sprite,
            pattern: *pattern,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_counts_and_combinations() {
        let script: InputScript = "right*3, up+left*2,none,a".parse().expect("valid script");
        assert_eq!(script.len_frames(), 7);
        assert_eq!(script.buttons_at(0), Buttons::RIGHT);
        assert_eq!(script.buttons_at(2), Buttons::RIGHT);
        assert_eq!(script.buttons_at(3), Buttons::UP | Buttons::LEFT);
        assert_eq!(script.buttons_at(5), Buttons::empty());
        assert_eq!(script.buttons_at(6), Buttons::A);
        assert_eq!(script.buttons_at(7), Buttons::empty());
    }

    #[test]
    fn blank_script_is_idle() {
        let script: InputScript = "  ".parse().expect("blank script");
        assert_eq!(script.len_frames(), 0);
    }

    #[test]
    fn rejects_malformed_entries() {
        assert_eq!(
            "up,,down".parse::<InputScript>(),
            Err(ScriptError::EmptyEntry { index: 1 })
        );
        assert_eq!(
            "jump*2".parse::<InputScript>(),
            Err(ScriptError::UnknownButton {
                name: "jump".to_owned()
            })
        );
        assert_eq!(
            "up*0".parse::<InputScript>(),
            Err(ScriptError::InvalidCount {
                entry: "up*0".to_owned(),
                count: "0".to_owned(),
            })
        );
    }

    #[test]
    fn display_form_parses_back() {
        let script = InputScript::new()
            .hold(Buttons::RIGHT, 90)
            .hold(Buttons::empty(), 2)
            .hold(Buttons::UP | Buttons::LEFT, 60);
        let text = script.to_string();
        assert_eq!(text.parse::<InputScript>(), Ok(script));
    }

    #[test]
    fn frames_advance_when_blanking_begins() {
        let script = InputScript::new()
            .hold(Buttons::LEFT, 1)
            .hold(Buttons::DOWN, 1);
        let mut display = SyntheticDisplay::new(script);

        display.wait_for_vblank();
        assert_eq!(display.frames(), 1);
        assert_eq!(display.read_raw_input(), Buttons::LEFT);

        display.wait_for_vblank();
        assert_eq!(display.read_raw_input(), Buttons::DOWN);

        display.wait_for_vblank();
        assert_eq!(display.read_raw_input(), Buttons::empty());
        assert_eq!(
            display.calls()[..2],
            [DisplayCall::WaitBlankingStart, DisplayCall::WaitBlankingEnd]
        );
    }
}
