// bitflags expands its internal flag storage as `pub` items.
#![allow(unreachable_pub)]

use crate::Heading;

bitflags::bitflags! {
    /// Normalized pressed-button bitmask. A set bit means "pressed".
    ///
    /// Bit positions follow the handheld key register so hardware adapters
    /// only need to invert and mask the raw value.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        /// Face button A.
        const A      = 0x0001;
        /// Face button B.
        const B      = 0x0002;
        /// Select button.
        const SELECT = 0x0004;
        /// Start button.
        const START  = 0x0008;
        /// Directional pad right.
        const RIGHT  = 0x0010;
        /// Directional pad left.
        const LEFT   = 0x0020;
        /// Directional pad up.
        const UP     = 0x0040;
        /// Directional pad down.
        const DOWN   = 0x0080;
        /// Right shoulder button.
        const R      = 0x0100;
        /// Left shoulder button.
        const L      = 0x0200;

        /// Every directional pad bit.
        const DPAD = Self::RIGHT.bits() | Self::LEFT.bits() | Self::UP.bits() | Self::DOWN.bits();
    }
}

impl Buttons {
    /// Pressed directions, yielded in Up, Right, Down, Left priority order.
    pub fn headings(self) -> impl Iterator<Item = Heading> {
        Heading::PRIORITY
            .into_iter()
            .filter(move |heading| self.contains(heading.button()))
    }

    /// Highest-priority pressed direction, if any.
    #[must_use]
    pub fn first_heading(self) -> Option<Heading> {
        self.headings().next()
    }

    /// Only the directional pad bits of the mask.
    #[must_use]
    pub fn directions(self) -> Self {
        self & Self::DPAD
    }
}
