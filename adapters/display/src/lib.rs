#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Display adapter contract for Sprite Chase.
//!
//! The game loop reaches the screen and the buttons only through
//! [`DisplayAdapter`]. Everything an adapter needs to present a frame is
//! expressed here in plain values: sprite slots, palette slots, 8-bit RGB
//! colors and solid tile patterns. Register addresses and encodings belong to
//! the concrete adapters.

pub mod synthetic;

use sprite_chase_core::{Buttons, Size};

/// Hardware sprite slot the loop writes positions into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u8);

impl SpriteId {
    /// Slot showing the controlled entity.
    pub const CONTROLLED: Self = Self(0);
    /// Slot showing the target.
    pub const TARGET: Self = Self(1);

    /// Zero-based slot index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Entry in the sprite palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaletteSlot(u8);

impl PaletteSlot {
    /// Creates a palette slot from its index. Slot 0 is transparent on the handheld.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Zero-based palette index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Opaque color with 8-bit channels. Adapters reduce the precision as needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    /// Pure red.
    pub const RED: Self = Self::new(0xff, 0x00, 0x00);

    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Solid sprite tile filled with a single palette index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TilePattern {
    palette: PaletteSlot,
    size: Size,
}

impl TilePattern {
    /// Creates a solid tile of `size` display pixels painted with `palette`.
    #[must_use]
    pub const fn solid(palette: PaletteSlot, size: Size) -> Self {
        Self { palette, size }
    }

    /// Palette entry every pixel of the tile uses.
    #[must_use]
    pub const fn palette(&self) -> PaletteSlot {
        self.palette
    }

    /// Extent of the sprite in display pixels.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Encodes one 8x8 tile at four bits per pixel, one `u32` per row.
    #[must_use]
    pub const fn rows_4bpp(&self) -> [u32; 8] {
        let nibble = (self.palette.0 & 0x0f) as u32;
        [nibble * 0x1111_1111; 8]
    }
}

/// Palette slot and color assigned to one sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteLook {
    /// Palette entry the sprite's tile references.
    pub slot: PaletteSlot,
    /// Color loaded into that entry.
    pub color: Rgb,
}

/// Colors for both sprites, loaded once before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    /// Look of the controlled entity.
    pub controlled: SpriteLook,
    /// Look of the target.
    pub target: SpriteLook,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            controlled: SpriteLook {
                slot: PaletteSlot::new(1),
                color: Rgb::WHITE,
            },
            target: SpriteLook {
                slot: PaletteSlot::new(2),
                color: Rgb::RED,
            },
        }
    }
}

/// Hardware-facing surface the game loop drives.
///
/// Implementations are expected to be cheap: the loop calls every method at
/// most a handful of times per displayed frame.
pub trait DisplayAdapter {
    /// Returns once any blanking interval in progress has ended.
    fn wait_for_blanking_boundary_start(&mut self);

    /// Returns once the next blanking interval has begun.
    fn wait_for_blanking_boundary_end(&mut self);

    /// Blocks until the start of the next blanking interval.
    ///
    /// Calling this once per frame guarantees the loop advances at most once
    /// per refresh and that subsequent sprite writes land during blanking.
    fn wait_for_vblank(&mut self) {
        self.wait_for_blanking_boundary_start();
        self.wait_for_blanking_boundary_end();
    }

    /// Reads the current button state, normalized so a set bit means pressed.
    fn read_raw_input(&mut self) -> Buttons;

    /// Moves a sprite to the provided display pixel coordinates.
    ///
    /// The caller pre-clamps coordinates; adapters do not validate them.
    fn set_sprite_position(&mut self, sprite: SpriteId, x: u32, y: u32);

    /// Loads a color into a palette slot.
    fn set_palette_color(&mut self, slot: PaletteSlot, color: Rgb);

    /// Uploads the tile shown by a sprite.
    fn init_sprite_tile(&mut self, sprite: SpriteId, pattern: &TilePattern);

    /// Reports whether the display is still being presented.
    ///
    /// Desktop adapters return `false` once their window closes; hardware
    /// never closes.
    fn is_open(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_tile_repeats_palette_nibble() {
        let tile = TilePattern::solid(PaletteSlot::new(1), Size::square(8));
        assert_eq!(tile.rows_4bpp(), [0x1111_1111; 8]);

        let tile = TilePattern::solid(PaletteSlot::new(2), Size::square(8));
        assert_eq!(tile.rows_4bpp(), [0x2222_2222; 8]);
    }

    #[test]
    fn default_theme_is_white_chasing_red() {
        let theme = Theme::default();
        assert_eq!(theme.controlled.slot.index(), 1);
        assert_eq!(theme.controlled.color, Rgb::WHITE);
        assert_eq!(theme.target.slot.index(), 2);
        assert_eq!(theme.target.color, Rgb::RED);
    }
}
