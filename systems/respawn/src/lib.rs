#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded target placement system.
//!
//! Positions are drawn uniformly from the target's valid range with the
//! controlled entity's position excluded, so a freshly placed target never
//! counts as reached on the frame it appears.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sprite_chase_core::{Command, CoordinateMode, Event, PlacementView, Position};

const PIXEL_ATTEMPTS: usize = 64;

/// Pure system that emits a target placement whenever the target is acquired.
#[derive(Debug)]
pub struct Respawn {
    rng: ChaCha8Rng,
}

impl Respawn {
    /// Creates a respawn system whose draws are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes world events and emits a placement for every acquisition.
    ///
    /// A rejected placement is retried with a fresh draw.
    pub fn handle(&mut self, events: &[Event], view: &PlacementView, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TargetReached { .. } | Event::TargetPlacementRejected { .. } => {
                    let position = self.draw(view);
                    out.push(Command::PlaceTarget { position });
                }
                _ => {}
            }
        }
    }

    /// Draws a target position inside the view's bounds that does not collide
    /// with the controlled entity.
    ///
    /// Returns the controlled position itself only when the bounds leave no
    /// other choice, which a validated configuration rules out.
    pub fn draw(&mut self, view: &PlacementView) -> Position {
        match view.mode {
            CoordinateMode::Grid => self.draw_cell(view),
            CoordinateMode::Pixel => self.draw_pixel(view),
        }
    }

    fn draw_cell(&mut self, view: &PlacementView) -> Position {
        let bounds = view.target_bounds;
        let columns = u64::from(bounds.max_x()) + 1;
        let rows = u64::from(bounds.max_y()) + 1;
        let cells = columns * rows;

        let excluded = bounds
            .contains(view.controlled)
            .then(|| u64::from(view.controlled.y()) * columns + u64::from(view.controlled.x()));
        let available = cells - u64::from(excluded.is_some());
        if available == 0 {
            return bounds.clamp(view.controlled);
        }

        let mut index = self.rng.gen_range(0..available);
        if let Some(excluded) = excluded {
            if index >= excluded {
                index += 1;
            }
        }

        let x = u32::try_from(index % columns).unwrap_or(bounds.max_x());
        let y = u32::try_from(index / columns).unwrap_or(bounds.max_y());
        Position::new(x, y)
    }

    fn draw_pixel(&mut self, view: &PlacementView) -> Position {
        let bounds = view.target_bounds;
        for _ in 0..PIXEL_ATTEMPTS {
            let candidate = Position::new(
                self.rng.gen_range(0..=bounds.max_x()),
                self.rng.gen_range(0..=bounds.max_y()),
            );
            if !view.collides(candidate) {
                return candidate;
            }
        }

        // Fall back to the edge furthest from the controlled entity.
        let controlled = view.controlled;
        let far_x = far_edge(controlled.x(), bounds.max_x());
        if far_x.abs_diff(controlled.x()) > view.target_size.width() {
            return Position::new(far_x, self.rng.gen_range(0..=bounds.max_y()));
        }
        let far_y = far_edge(controlled.y(), bounds.max_y());
        if far_y.abs_diff(controlled.y()) > view.target_size.height() {
            return Position::new(self.rng.gen_range(0..=bounds.max_x()), far_y);
        }
        Position::new(far_x, far_y)
    }
}

fn far_edge(value: u32, max: u32) -> u32 {
    if value >= max.saturating_sub(value) {
        0
    } else {
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprite_chase_core::{Bounds, Size};

    fn pixel_view(controlled: Position) -> PlacementView {
        PlacementView {
            mode: CoordinateMode::Pixel,
            target_bounds: Bounds::new(232, 152),
            target_size: Size::square(8),
            controlled,
        }
    }

    #[test]
    fn far_edge_picks_the_more_distant_side() {
        assert_eq!(far_edge(10, 232), 232);
        assert_eq!(far_edge(200, 232), 0);
        assert_eq!(far_edge(116, 232), 0);
    }

    #[test]
    fn cramped_pixel_field_uses_far_edge() {
        // Only x offsets above 8 escape the band on a 17-pixel-wide range.
        let view = PlacementView {
            mode: CoordinateMode::Pixel,
            target_bounds: Bounds::new(16, 4),
            target_size: Size::square(8),
            controlled: Position::new(2, 2),
        };
        let mut respawn = Respawn::new(3);
        for _ in 0..200 {
            let position = respawn.draw(&view);
            assert!(view.target_bounds.contains(position));
            assert!(!view.collides(position), "{position:?} collides");
        }
    }

    #[test]
    fn grid_excludes_controlled_cell_on_two_cell_board() {
        let view = PlacementView {
            mode: CoordinateMode::Grid,
            target_bounds: Bounds::for_grid(2, 1),
            target_size: Size::square(1),
            controlled: Position::new(0, 0),
        };
        let mut respawn = Respawn::new(11);
        for _ in 0..50 {
            assert_eq!(respawn.draw(&view), Position::new(1, 0));
        }
    }

    #[test]
    fn pixel_draws_stay_clear_of_centered_entity() {
        let view = pixel_view(Position::new(116, 76));
        let mut respawn = Respawn::new(0xdead_beef);
        for _ in 0..1_000 {
            assert!(!view.collides(respawn.draw(&view)));
        }
    }
}
