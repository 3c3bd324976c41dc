#![allow(unsafe_code)]

use core::ptr;

use crate::{DisplayControl, ObjectAttributes, Registers, Rgb15};

const REG_DISPLAY_CONTROL: usize = 0x0400_0000;
const REG_VCOUNT: usize = 0x0400_0006;
const REG_KEY_INPUT: usize = 0x0400_0130;
const OBJECT_PALETTE: usize = 0x0500_0200;
const OBJECT_TILES: usize = 0x0601_0000;
const OAM: usize = 0x0700_0000;

const OBJECT_STRIDE: usize = 8;
const TILE_STRIDE: usize = 32;

/// Registers reached through the console's memory map.
///
/// Only an on-device entry point constructs this, wrapping it as
/// `GbaDisplay<MemoryMapped>`. Hosted builds drive [`GbaDisplay`] through
/// other [`Registers`] implementations.
///
/// [`GbaDisplay`]: crate::GbaDisplay
#[derive(Debug)]
pub struct MemoryMapped {
    _private: (),
}

impl MemoryMapped {
    /// Creates the on-device register accessor.
    ///
    /// # Safety
    ///
    /// Must only be called when running on the console, where every address
    /// this type touches is mapped I/O, palette, VRAM or OAM memory, and at
    /// most one accessor may exist at a time.
    #[must_use]
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }

    fn read16(address: usize) -> u16 {
        // SAFETY: `new` guarantees the address is mapped console memory.
        unsafe { ptr::read_volatile(address as *const u16) }
    }

    fn write16(address: usize, value: u16) {
        // SAFETY: `new` guarantees the address is mapped console memory.
        unsafe { ptr::write_volatile(address as *mut u16, value) }
    }

    fn write32(address: usize, value: u32) {
        // SAFETY: `new` guarantees the address is mapped console memory.
        unsafe { ptr::write_volatile(address as *mut u32, value) }
    }
}

impl Registers for MemoryMapped {
    fn vcount(&mut self) -> u16 {
        Self::read16(REG_VCOUNT)
    }

    fn key_input(&mut self) -> u16 {
        Self::read16(REG_KEY_INPUT)
    }

    fn set_display_control(&mut self, control: DisplayControl) {
        Self::write16(REG_DISPLAY_CONTROL, control.bits());
    }

    fn object(&mut self, index: u8) -> ObjectAttributes {
        let base = OAM + usize::from(index) * OBJECT_STRIDE;
        ObjectAttributes {
            attr0: Self::read16(base),
            attr1: Self::read16(base + 2),
            attr2: Self::read16(base + 4),
        }
    }

    fn set_object(&mut self, index: u8, attributes: ObjectAttributes) {
        let base = OAM + usize::from(index) * OBJECT_STRIDE;
        Self::write16(base, attributes.attr0);
        Self::write16(base + 2, attributes.attr1);
        Self::write16(base + 4, attributes.attr2);
    }

    fn set_object_palette(&mut self, index: u8, color: Rgb15) {
        Self::write16(OBJECT_PALETTE + usize::from(index) * 2, color.bits());
    }

    fn set_object_tile(&mut self, tile: u16, rows: &[u32; 8]) {
        let base = OBJECT_TILES + usize::from(tile) * TILE_STRIDE;
        for (row, value) in rows.iter().enumerate() {
            Self::write32(base + row * 4, *value);
        }
    }
}
