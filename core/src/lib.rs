#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sprite Chase engine.
//!
//! This crate defines the message surface that connects the frame loop, the
//! authoritative world, and pure systems. The loop submits [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.
//!
//! The coordinate model also lives here: both supported coordinate spaces,
//! the shared saturating [`clamp`], and the [`target_reached`] rule used by
//! the world and the respawn system alike.

mod buttons;
pub mod config;

use serde::{Deserialize, Serialize};

pub use buttons::Buttons;
pub use config::{ConfigError, ConfigOverrides, GameConfig, Seed};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Sprite Chase.";

/// Coordinate space the play field and both entities are expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateMode {
    /// Continuous integer pixels; motion adds a fixed pixel step.
    Pixel,
    /// Discrete cells; motion moves exactly one cell along the heading.
    Grid,
}

/// Saturating clamp shared by both coordinate modes.
///
/// Values below `min` are pulled up to `min`, values above `max` down to
/// `max`; anything in between is returned unchanged. The caller guarantees
/// `min <= max`.
#[must_use]
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Location in the active coordinate space (pixels or cells).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new position from its components.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Converts a grid cell into the pixel position of its upper-left corner.
    #[must_use]
    pub const fn cell_to_pixels(self, cell_size: u32) -> Self {
        Self::new(
            self.x.saturating_mul(cell_size),
            self.y.saturating_mul(cell_size),
        )
    }
}

/// Extent of an entity or a field, measured in the active coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Creates a square size descriptor.
    #[must_use]
    pub const fn square(length: u32) -> Self {
        Self::new(length, length)
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Inclusive range of positions an entity may occupy.
///
/// Every position handed out by [`Bounds::clamp`] and [`Bounds::offset`]
/// satisfies `0 <= x <= max_x` and `0 <= y <= max_y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    max_x: u32,
    max_y: u32,
}

impl Bounds {
    /// Creates bounds with the provided inclusive maxima.
    #[must_use]
    pub const fn new(max_x: u32, max_y: u32) -> Self {
        Self { max_x, max_y }
    }

    /// Bounds for an entity of `entity` size inside a pixel field.
    ///
    /// Yields `[0, field - entity]` on each axis, saturating at zero when the
    /// entity is larger than the field.
    #[must_use]
    pub const fn for_pixels(field: Size, entity: Size) -> Self {
        Self::new(
            field.width.saturating_sub(entity.width),
            field.height.saturating_sub(entity.height),
        )
    }

    /// Bounds for a single-cell entity on a `columns x rows` grid.
    #[must_use]
    pub const fn for_grid(columns: u32, rows: u32) -> Self {
        Self::new(columns.saturating_sub(1), rows.saturating_sub(1))
    }

    /// Largest permitted horizontal component.
    #[must_use]
    pub const fn max_x(&self) -> u32 {
        self.max_x
    }

    /// Largest permitted vertical component.
    #[must_use]
    pub const fn max_y(&self) -> u32 {
        self.max_y
    }

    /// Reports whether the position already lies inside the bounds.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x <= self.max_x && position.y <= self.max_y
    }

    /// Pulls the position onto the nearest in-bounds position.
    #[must_use]
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            clamp(position.x, 0, self.max_x),
            clamp(position.y, 0, self.max_y),
        )
    }

    /// Displaces the position by `(dx, dy)` and saturates the result.
    ///
    /// Moving into an edge leaves that component at the edge rather than
    /// wrapping or failing.
    #[must_use]
    pub fn offset(&self, position: Position, dx: i64, dy: i64) -> Position {
        Position::new(
            saturate_axis(position.x, dx, self.max_x),
            saturate_axis(position.y, dy, self.max_y),
        )
    }
}

fn saturate_axis(value: u32, delta: i64, max: u32) -> u32 {
    let attempted = i64::from(value).saturating_add(delta);
    let clamped = clamp(attempted, 0, i64::from(max));
    u32::try_from(clamped).unwrap_or(max)
}

/// Cardinal directions, listed in input priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Heading {
    /// Every heading in the fixed priority order used when sampling input.
    pub const PRIORITY: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    /// Unit displacement along the heading.
    #[must_use]
    pub const fn unit_delta(self) -> (i64, i64) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Button that commands this heading.
    #[must_use]
    pub const fn button(self) -> Buttons {
        match self {
            Self::Up => Buttons::UP,
            Self::Right => Buttons::RIGHT,
            Self::Down => Buttons::DOWN,
            Self::Left => Buttons::LEFT,
        }
    }
}

/// Decides whether the controlled entity has acquired the target.
///
/// Grid mode requires exact cell equality. Pixel mode accepts any offset with
/// `|dx| <= target width` and `|dy| <= target height`, i.e. a band twice the
/// target's extent centred on the target's origin rather than a strict
/// bounding-box intersection. The band is inclusive at both edges.
#[must_use]
pub fn target_reached(
    mode: CoordinateMode,
    controlled: Position,
    target: Position,
    target_size: Size,
) -> bool {
    match mode {
        CoordinateMode::Grid => controlled == target,
        CoordinateMode::Pixel => {
            controlled.x().abs_diff(target.x()) <= target_size.width()
                && controlled.y().abs_diff(target.y()) <= target_size.height()
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the frame counter by exactly one displayed frame.
    AdvanceFrame,
    /// Replaces the grid-mode heading of the controlled entity.
    SetHeading {
        /// Heading that subsequent commits travel along.
        heading: Heading,
    },
    /// Replaces the pixel-mode direction set of the controlled entity.
    SetDirections {
        /// Direction buttons applied on every subsequent commit.
        directions: Buttons,
    },
    /// Applies exactly one motion step using the current heading or directions.
    CommitMotion,
    /// Tests whether the controlled entity currently overlaps the target.
    CheckTargetReached,
    /// Moves the target to a new position.
    PlaceTarget {
        /// Position the target should occupy.
        position: Position,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that one more displayed frame elapsed.
    FrameAdvanced {
        /// Number of frames elapsed, including this one.
        frame: u64,
    },
    /// Confirms that the grid-mode heading changed.
    HeadingChanged {
        /// Heading that became active.
        heading: Heading,
    },
    /// Confirms that the pixel-mode direction set changed.
    DirectionsChanged {
        /// Direction buttons that became active.
        directions: Buttons,
    },
    /// Reports a committed motion step. `from == to` when pinned at an edge.
    MotionCommitted {
        /// Position before the step.
        from: Position,
        /// Position after the step.
        to: Position,
    },
    /// Announces that the controlled entity acquired the target.
    TargetReached {
        /// Position of the target that was acquired.
        position: Position,
        /// Score after counting this acquisition.
        score: u32,
    },
    /// Confirms that the target was moved.
    TargetPlaced {
        /// Position the target now occupies.
        position: Position,
    },
    /// Reports that a placement would have put the target on the controlled entity.
    TargetPlacementRejected {
        /// Position that was requested.
        position: Position,
    },
}

/// Read-only inputs required to choose a new target position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementView {
    /// Active coordinate space.
    pub mode: CoordinateMode,
    /// Inclusive range of positions the target may occupy.
    pub target_bounds: Bounds,
    /// Extent of the target entity.
    pub target_size: Size,
    /// Current position of the controlled entity, excluded from placement.
    pub controlled: Position,
}

impl PlacementView {
    /// Reports whether placing the target at `candidate` would immediately
    /// count as reached.
    #[must_use]
    pub fn collides(&self, candidate: Position) -> bool {
        target_reached(self.mode, self.controlled, candidate, self.target_size)
    }
}
