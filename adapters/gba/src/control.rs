// bitflags expands its internal flag storage as `pub` items.
#![allow(unreachable_pub)]

bitflags::bitflags! {
    /// Display control register bits used by the adapter.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DisplayControl: u16 {
        /// Object tiles are laid out one after another rather than in a 2D sheet.
        const OBJECT_1D_MAPPING = 0x0040;
        /// Objects are drawn.
        const OBJECTS = 0x1000;
    }
}
