#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed desktop window emulating the handheld display.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the crate depends on macroquad without default features.
//!
//! The window owns the main thread. The game loop runs on a worker thread and
//! talks to the window through a [`DesktopDisplay`]: every presented window
//! frame is one blanking pulse, sprite writes land in a shared table the
//! window draws from, and the keyboard state is published as a button mask.

mod window;

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU16, Ordering},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
};

use sprite_chase_core::{Buttons, Position, Size};
use sprite_chase_display::{DisplayAdapter, PaletteSlot, Rgb, SpriteId, TilePattern};

pub use window::{run_window, WindowOptions};

#[derive(Debug, Default)]
struct Clock {
    presented: u64,
    closed: bool,
    finished: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct SpriteState {
    position: Option<Position>,
    tile: Option<TilePattern>,
}

#[derive(Debug, Default)]
struct SpriteTable {
    palette: BTreeMap<PaletteSlot, Rgb>,
    sprites: BTreeMap<SpriteId, SpriteState>,
}

#[derive(Debug, Default)]
struct Shared {
    clock: Mutex<Clock>,
    pulse: Condvar,
    buttons: AtomicU16,
    table: Mutex<SpriteTable>,
}

impl Shared {
    fn clock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn table(&self) -> MutexGuard<'_, SpriteTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_clock(&self, update: impl FnOnce(&mut Clock)) {
        update(&mut *self.clock());
        self.pulse.notify_all();
    }
}

/// Creates the two ends of an emulated display.
#[must_use]
pub fn display_pair() -> (DesktopDisplay, Presenter) {
    let shared = Arc::new(Shared::default());
    (
        DesktopDisplay {
            shared: Arc::clone(&shared),
            observed: 0,
        },
        Presenter { shared },
    )
}

/// Game-thread end of the emulated display.
///
/// Dropping it tells the window the loop has finished.
#[derive(Debug)]
pub struct DesktopDisplay {
    shared: Arc<Shared>,
    observed: u64,
}

impl DisplayAdapter for DesktopDisplay {
    fn wait_for_blanking_boundary_start(&mut self) {
        self.observed = self.shared.clock().presented;
    }

    fn wait_for_blanking_boundary_end(&mut self) {
        let observed = self.observed;
        let clock = self
            .shared
            .pulse
            .wait_while(self.shared.clock(), |clock| {
                clock.presented <= observed && !clock.closed
            })
            .unwrap_or_else(PoisonError::into_inner);
        self.observed = clock.presented;
    }

    fn read_raw_input(&mut self) -> Buttons {
        Buttons::from_bits_truncate(self.shared.buttons.load(Ordering::Acquire))
    }

    fn set_sprite_position(&mut self, sprite: SpriteId, x: u32, y: u32) {
        self.shared
            .table()
            .sprites
            .entry(sprite)
            .or_default()
            .position = Some(Position::new(x, y));
    }

    fn set_palette_color(&mut self, slot: PaletteSlot, color: Rgb) {
        let _ = self.shared.table().palette.insert(slot, color);
    }

    fn init_sprite_tile(&mut self, sprite: SpriteId, pattern: &TilePattern) {
        self.shared.table().sprites.entry(sprite).or_default().tile = Some(*pattern);
    }

    fn is_open(&self) -> bool {
        !self.shared.clock().closed
    }
}

impl Drop for DesktopDisplay {
    fn drop(&mut self) {
        self.shared.update_clock(|clock| clock.finished = true);
    }
}

/// Sprite ready to be drawn by the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleSprite {
    /// Sprite slot.
    pub sprite: SpriteId,
    /// Upper-left corner in display pixels.
    pub position: Position,
    /// Extent in display pixels.
    pub size: Size,
    /// Fill color.
    pub color: Rgb,
}

/// Window-thread end of the emulated display.
#[derive(Clone, Debug)]
pub struct Presenter {
    shared: Arc<Shared>,
}

impl Presenter {
    /// Publishes the buttons held during the current window frame.
    pub fn set_buttons(&self, buttons: Buttons) {
        self.shared.buttons.store(buttons.bits(), Ordering::Release);
    }

    /// Signals that a frame was presented, releasing one blanking wait.
    pub fn present(&self) {
        self.shared.update_clock(|clock| clock.presented += 1);
    }

    /// Marks the display closed, releasing every pending and future wait.
    pub fn close(&self) {
        self.shared.update_clock(|clock| clock.closed = true);
    }

    /// Reports whether the game side has dropped its display.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.shared.clock().finished
    }

    /// Sprites that have a position and a tile, in slot order.
    #[must_use]
    pub fn visible_sprites(&self) -> Vec<VisibleSprite> {
        let table = self.shared.table();
        table
            .sprites
            .iter()
            .filter_map(|(sprite, state)| {
                let position = state.position?;
                let tile = state.tile?;
                let color = table.palette.get(&tile.palette()).copied()?;
                Some(VisibleSprite {
                    sprite: *sprite,
                    position,
                    size: tile.size(),
                    color,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn blanking_wait_releases_once_per_presented_frame() {
        let (mut display, presenter) = display_pair();
        display.wait_for_blanking_boundary_start();

        let worker = thread::spawn(move || {
            display.wait_for_vblank();
            let first = display.observed;
            display.wait_for_vblank();
            (first, display.observed)
        });
        while !worker.is_finished() {
            presenter.present();
            thread::yield_now();
        }

        let (first, second) = worker.join().expect("worker finished");
        assert!(first >= 1);
        assert!(second > first);
    }

    #[test]
    fn closing_releases_waits_and_reports_closed() {
        let (mut display, presenter) = display_pair();
        let worker = thread::spawn(move || {
            display.wait_for_vblank();
            display.is_open()
        });
        presenter.close();
        assert!(!worker.join().expect("worker finished"));
    }

    #[test]
    fn dropping_the_display_marks_the_loop_finished() {
        let (display, presenter) = display_pair();
        assert!(!presenter.is_finished());
        drop(display);
        assert!(presenter.is_finished());
    }

    #[test]
    fn buttons_cross_the_thread_boundary() {
        let (mut display, presenter) = display_pair();
        presenter.set_buttons(Buttons::UP | Buttons::A);
        assert_eq!(display.read_raw_input(), Buttons::UP | Buttons::A);
    }

    #[test]
    fn only_fully_configured_sprites_are_visible() {
        let (mut display, presenter) = display_pair();
        display.set_palette_color(PaletteSlot::new(1), Rgb::WHITE);
        display.init_sprite_tile(
            SpriteId::CONTROLLED,
            &TilePattern::solid(PaletteSlot::new(1), Size::square(8)),
        );
        display.set_sprite_position(SpriteId::CONTROLLED, 32, 40);
        display.set_sprite_position(SpriteId::TARGET, 56, 16);

        assert_eq!(
            presenter.visible_sprites(),
            vec![VisibleSprite {
                sprite: SpriteId::CONTROLLED,
                position: Position::new(32, 40),
                size: Size::square(8),
                color: Rgb::WHITE,
            }]
        );
    }
}
