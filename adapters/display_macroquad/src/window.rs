use std::thread;

use anyhow::{anyhow, Context, Result};
use macroquad::{
    color::{Color, BLACK},
    input::{is_key_down, is_key_pressed, is_quit_requested, prevent_quit, KeyCode},
    shapes::draw_rectangle,
    window::{clear_background, next_frame, Conf},
};
use sprite_chase_core::{Buttons, Size};
use tracing::info;

use crate::{display_pair, DesktopDisplay, Presenter};

const KEY_BINDINGS: [(KeyCode, Buttons); 8] = [
    (KeyCode::Up, Buttons::UP),
    (KeyCode::Down, Buttons::DOWN),
    (KeyCode::Left, Buttons::LEFT),
    (KeyCode::Right, Buttons::RIGHT),
    (KeyCode::Z, Buttons::A),
    (KeyCode::X, Buttons::B),
    (KeyCode::Enter, Buttons::START),
    (KeyCode::Backspace, Buttons::SELECT),
];

/// Window presentation parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowOptions {
    /// Title shown by the window manager.
    pub title: String,
    /// Emulated display extent in pixels.
    pub display: Size,
    /// Integer magnification applied to every display pixel.
    pub scale: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: String::from("Sprite Chase"),
            display: Size::new(240, 160),
            scale: 4,
        }
    }
}

/// Opens the window on the current thread and runs `game` on a worker thread.
///
/// Returns once the window closes and the worker has finished. Closing the
/// window or pressing Escape releases the worker's blanking waits and marks
/// the display closed; the worker finishing closes the window.
pub fn run_window<F, T>(options: WindowOptions, game: F) -> Result<T>
where
    F: FnOnce(DesktopDisplay) -> T + Send + 'static,
    T: Send + 'static,
{
    let (display, presenter) = display_pair();
    let worker = thread::Builder::new()
        .name(String::from("game-loop"))
        .spawn(move || game(display))
        .context("failed to spawn game loop thread")?;

    let scale = options.scale.max(1);
    let width = i32::try_from(options.display.width().saturating_mul(scale))
        .context("window width does not fit the platform")?;
    let height = i32::try_from(options.display.height().saturating_mul(scale))
        .context("window height does not fit the platform")?;
    let config = Conf {
        window_title: options.title,
        window_width: width,
        window_height: height,
        window_resizable: false,
        ..Conf::default()
    };

    info!(width, height, scale, "desktop_window_opened");
    let window_presenter = presenter.clone();
    macroquad::Window::from_config(config, async move {
        present_frames(window_presenter, scale).await;
    });

    presenter.close();
    worker
        .join()
        .map_err(|_| anyhow!("game loop thread panicked"))
}

async fn present_frames(presenter: Presenter, scale: u32) {
    prevent_quit();
    let scale = scale as f32;

    loop {
        if is_quit_requested() {
            info!(reason = "window_close", "shutdown_requested");
            break;
        }
        if is_key_pressed(KeyCode::Escape) {
            info!(reason = "escape_key", "shutdown_requested");
            break;
        }
        if presenter.is_finished() {
            info!(reason = "game_finished", "shutdown_requested");
            break;
        }

        presenter.set_buttons(sample_keyboard());

        clear_background(BLACK);
        for sprite in presenter.visible_sprites() {
            draw_rectangle(
                sprite.position.x() as f32 * scale,
                sprite.position.y() as f32 * scale,
                sprite.size.width() as f32 * scale,
                sprite.size.height() as f32 * scale,
                Color::from_rgba(sprite.color.red, sprite.color.green, sprite.color.blue, 255),
            );
        }

        next_frame().await;
        presenter.present();
    }

    presenter.close();
}

fn sample_keyboard() -> Buttons {
    KEY_BINDINGS
        .iter()
        .filter(|(key, _)| is_key_down(*key))
        .fold(Buttons::empty(), |pressed, (_, button)| pressed | *button)
}
