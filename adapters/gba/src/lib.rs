#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Register-level display adapter for the handheld console.
//!
//! [`GbaDisplay`] translates the display contract into scanline polling,
//! object attribute writes, 15-bit palette entries and 4bpp tile uploads.
//! All register traffic goes through the [`Registers`] trait so the encoding
//! can be exercised off-device; [`MemoryMapped`] is the on-device
//! implementation.

mod control;
mod memory;

use bit_field::BitField;
use sprite_chase_core::Buttons;
use sprite_chase_display::{DisplayAdapter, PaletteSlot, Rgb, SpriteId, TilePattern};

pub use control::DisplayControl;
pub use memory::MemoryMapped;

/// Number of scanlines drawn before vertical blanking begins.
pub const VISIBLE_LINES: u16 = 160;

/// Total scanlines per refresh, blanking included.
pub const TOTAL_LINES: u16 = 228;

/// Bits of the key register that carry a button.
pub const KEY_MASK: u16 = 0x03FF;

/// First object tile used for sprites; each sprite reserves four tiles.
const FIRST_SPRITE_TILE: u16 = 1;
const TILES_PER_SPRITE: u16 = 4;

/// Converts the active-low key register into a pressed-button mask.
#[must_use]
pub fn pressed_buttons(raw: u16) -> Buttons {
    Buttons::from_bits_truncate(!raw & KEY_MASK)
}

/// Tile index shown by `sprite`. The controlled sprite uses tile 1, the
/// target tile 5.
#[must_use]
pub fn sprite_tile(sprite: SpriteId) -> u16 {
    FIRST_SPRITE_TILE + TILES_PER_SPRITE * u16::from(sprite.index())
}

/// 15-bit BGR color as stored in palette memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb15(u16);

impl Rgb15 {
    /// Packs five-bit channels as `r | g << 5 | b << 10`. Excess bits are dropped.
    #[must_use]
    pub fn from_channels(red: u16, green: u16, blue: u16) -> Self {
        let mut value = 0_u16;
        let _ = value.set_bits(0..5, red & 0x1f);
        let _ = value.set_bits(5..10, green & 0x1f);
        let _ = value.set_bits(10..15, blue & 0x1f);
        Self(value)
    }

    /// Raw register value.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl From<Rgb> for Rgb15 {
    fn from(color: Rgb) -> Self {
        Self::from_channels(
            u16::from(color.red >> 3),
            u16::from(color.green >> 3),
            u16::from(color.blue >> 3),
        )
    }
}

/// First three attribute words of an object entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjectAttributes {
    /// Y coordinate, shape and mode bits.
    pub attr0: u16,
    /// X coordinate, size and flip bits.
    pub attr1: u16,
    /// Tile index, priority and palette bank.
    pub attr2: u16,
}

impl ObjectAttributes {
    /// Vertical coordinate held in `attr0`.
    #[must_use]
    pub fn y(&self) -> u16 {
        self.attr0.get_bits(0..8)
    }

    /// Horizontal coordinate held in `attr1`.
    #[must_use]
    pub fn x(&self) -> u16 {
        self.attr1.get_bits(0..9)
    }

    /// Tile index held in `attr2`.
    #[must_use]
    pub fn tile(&self) -> u16 {
        self.attr2.get_bits(0..10)
    }

    /// Replaces the coordinates, leaving every other attribute bit intact.
    ///
    /// Coordinates wrap to the field widths (8 bits for y, 9 bits for x).
    #[must_use]
    pub fn with_position(mut self, x: u32, y: u32) -> Self {
        let x = u16::try_from(x & 0x1ff).unwrap_or_default();
        let y = u16::try_from(y & 0xff).unwrap_or_default();
        let _ = self.attr1.set_bits(0..9, x);
        let _ = self.attr0.set_bits(0..8, y);
        self
    }

    /// Replaces the tile index, leaving priority and palette bank intact.
    #[must_use]
    pub fn with_tile(mut self, tile: u16) -> Self {
        let _ = self.attr2.set_bits(0..10, tile & 0x3ff);
        self
    }
}

/// Register surface the adapter drives.
pub trait Registers {
    /// Current scanline.
    fn vcount(&mut self) -> u16;

    /// Raw, active-low key register.
    fn key_input(&mut self) -> u16;

    /// Writes the display control register.
    fn set_display_control(&mut self, control: DisplayControl);

    /// Reads an object attribute entry.
    fn object(&mut self, index: u8) -> ObjectAttributes;

    /// Writes an object attribute entry.
    fn set_object(&mut self, index: u8, attributes: ObjectAttributes);

    /// Writes an object palette entry.
    fn set_object_palette(&mut self, index: u8, color: Rgb15);

    /// Writes one 4bpp object tile, one word per row.
    fn set_object_tile(&mut self, tile: u16, rows: &[u32; 8]);
}

/// Display adapter backed by console registers.
#[derive(Debug)]
pub struct GbaDisplay<R> {
    registers: R,
}

impl<R: Registers> GbaDisplay<R> {
    /// Enables objects with one-dimensional tile mapping and wraps `registers`.
    pub fn new(mut registers: R) -> Self {
        registers
            .set_display_control(DisplayControl::OBJECTS | DisplayControl::OBJECT_1D_MAPPING);
        Self { registers }
    }

    /// Underlying registers.
    #[must_use]
    pub fn registers(&self) -> &R {
        &self.registers
    }

    /// Releases the underlying registers.
    #[must_use]
    pub fn into_registers(self) -> R {
        self.registers
    }
}

impl<R: Registers> DisplayAdapter for GbaDisplay<R> {
    fn wait_for_blanking_boundary_start(&mut self) {
        while self.registers.vcount() >= VISIBLE_LINES {
            core::hint::spin_loop();
        }
    }

    fn wait_for_blanking_boundary_end(&mut self) {
        while self.registers.vcount() < VISIBLE_LINES {
            core::hint::spin_loop();
        }
    }

    fn read_raw_input(&mut self) -> Buttons {
        pressed_buttons(self.registers.key_input())
    }

    fn set_sprite_position(&mut self, sprite: SpriteId, x: u32, y: u32) {
        let index = sprite.index();
        let attributes = self.registers.object(index).with_position(x, y);
        self.registers.set_object(index, attributes);
    }

    fn set_palette_color(&mut self, slot: PaletteSlot, color: Rgb) {
        self.registers
            .set_object_palette(slot.index(), Rgb15::from(color));
    }

    fn init_sprite_tile(&mut self, sprite: SpriteId, pattern: &TilePattern) {
        let tile = sprite_tile(sprite);
        self.registers.set_object_tile(tile, &pattern.rows_4bpp());
        self.registers
            .set_object(sprite.index(), ObjectAttributes::default().with_tile(tile));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colors_pack_five_bit_channels() {
        assert_eq!(Rgb15::from(Rgb::WHITE).bits(), 0x7fff);
        assert_eq!(Rgb15::from(Rgb::RED).bits(), 0x001f);
        assert_eq!(Rgb15::from_channels(0, 0x1f, 0).bits(), 0x03e0);
    }

    #[test]
    fn key_register_is_active_low() {
        assert_eq!(pressed_buttons(0x03ff), Buttons::empty());
        assert_eq!(pressed_buttons(0x03ff & !0x0040), Buttons::UP);
        assert_eq!(
            pressed_buttons(0xffff & !(0x0010 | 0x0001)),
            Buttons::RIGHT | Buttons::A
        );
    }

    #[test]
    fn position_write_preserves_other_attribute_bits() {
        let attributes = ObjectAttributes {
            attr0: 0x2000 | 0x00aa,
            attr1: 0x4000 | 0x01ff,
            attr2: 5,
        }
        .with_position(56, 16);

        assert_eq!(attributes.attr0, 0x2000 | 16);
        assert_eq!(attributes.attr1, 0x4000 | 56);
        assert_eq!(attributes.attr2, 5);
        assert_eq!((attributes.x(), attributes.y()), (56, 16));
    }

    #[test]
    fn sprites_use_tiles_one_and_five() {
        assert_eq!(sprite_tile(SpriteId::CONTROLLED), 1);
        assert_eq!(sprite_tile(SpriteId::TARGET), 5);
    }
}
