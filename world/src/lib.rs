#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Sprite Chase.
//!
//! The world owns the controlled entity, the target, and the play field. It
//! is mutated exclusively through [`apply`], which keeps every position inside
//! the field and, in grid mode, keeps the occupancy marks in agreement with
//! both entity positions.

use sprite_chase_core::{
    target_reached, Bounds, Buttons, Command, CoordinateMode, Event, GameConfig, Heading,
    Position, Size, WELCOME_BANNER,
};

/// Mark carried by a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupancy {
    /// Nothing occupies the cell.
    Empty,
    /// The controlled entity occupies the cell.
    Controlled,
    /// The target occupies the cell.
    Target,
}

#[derive(Clone, Copy, Debug)]
struct Entity {
    position: Position,
    size: Size,
    bounds: Bounds,
}

impl Entity {
    fn new(position: Position, size: Size, bounds: Bounds) -> Self {
        Self {
            position: bounds.clamp(position),
            size,
            bounds,
        }
    }
}

#[derive(Clone, Debug)]
enum PlayField {
    Pixel,
    Grid(OccupancyGrid),
}

/// Represents the authoritative Sprite Chase world state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    mode: CoordinateMode,
    field_size: Size,
    field: PlayField,
    controlled: Entity,
    target: Entity,
    heading: Heading,
    directions: Buttons,
    step: u32,
    score: u32,
    frames: u64,
}

impl World {
    /// Creates a world from a validated configuration and the initial target position.
    ///
    /// Both positions are clamped into their bounds. The caller is expected to
    /// pick a target that does not collide with the controlled start.
    #[must_use]
    pub fn new(config: &GameConfig, target: Position) -> Self {
        let controlled = Entity::new(
            config.controlled_start,
            config.controlled_size,
            config.controlled_bounds(),
        );
        let target = Entity::new(target, config.target_size, config.target_bounds());

        let field = match config.mode {
            CoordinateMode::Pixel => PlayField::Pixel,
            CoordinateMode::Grid => {
                let mut grid = OccupancyGrid::new(config.field.width(), config.field.height());
                grid.mark(target.position, Occupancy::Target);
                grid.mark(controlled.position, Occupancy::Controlled);
                PlayField::Grid(grid)
            }
        };

        Self {
            banner: WELCOME_BANNER,
            mode: config.mode,
            field_size: config.field,
            field,
            controlled,
            target,
            heading: config.initial_heading,
            directions: Buttons::empty(),
            step: config.step_length(),
            score: 0,
            frames: 0,
        }
    }

    fn commit_motion(&mut self) -> (Position, Position) {
        let from = self.controlled.position;
        let bounds = self.controlled.bounds;
        let step = i64::from(self.step);

        let to = match self.mode {
            CoordinateMode::Grid => {
                let (dx, dy) = self.heading.unit_delta();
                bounds.offset(from, dx, dy)
            }
            CoordinateMode::Pixel => self
                .directions
                .headings()
                .fold(from, |position, heading| {
                    let (dx, dy) = heading.unit_delta();
                    bounds.offset(position, dx * step, dy * step)
                }),
        };

        let target = self.target.position;
        if let PlayField::Grid(grid) = &mut self.field {
            let vacated = if from == target {
                Occupancy::Target
            } else {
                Occupancy::Empty
            };
            grid.mark(from, vacated);
            grid.mark(to, Occupancy::Controlled);
        }

        self.controlled.position = to;
        (from, to)
    }

    fn place_target(&mut self, position: Position) -> Result<Position, Position> {
        let position = self.target.bounds.clamp(position);
        if target_reached(
            self.mode,
            self.controlled.position,
            position,
            self.target.size,
        ) {
            return Err(position);
        }

        let previous = self.target.position;
        let controlled = self.controlled.position;
        if let PlayField::Grid(grid) = &mut self.field {
            let vacated = if previous == controlled {
                Occupancy::Controlled
            } else {
                Occupancy::Empty
            };
            grid.mark(previous, vacated);
            grid.mark(position, Occupancy::Target);
        }

        self.target.position = position;
        Ok(position)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AdvanceFrame => {
            world.frames = world.frames.saturating_add(1);
            out_events.push(Event::FrameAdvanced {
                frame: world.frames,
            });
        }
        Command::SetHeading { heading } => {
            if world.mode == CoordinateMode::Grid && world.heading != heading {
                world.heading = heading;
                out_events.push(Event::HeadingChanged { heading });
            }
        }
        Command::SetDirections { directions } => {
            let directions = directions.directions();
            if world.mode == CoordinateMode::Pixel
                && !directions.is_empty()
                && world.directions != directions
            {
                world.directions = directions;
                out_events.push(Event::DirectionsChanged { directions });
            }
        }
        Command::CommitMotion => {
            let (from, to) = world.commit_motion();
            out_events.push(Event::MotionCommitted { from, to });
        }
        Command::CheckTargetReached => {
            if target_reached(
                world.mode,
                world.controlled.position,
                world.target.position,
                world.target.size,
            ) {
                world.score = world.score.saturating_add(1);
                out_events.push(Event::TargetReached {
                    position: world.target.position,
                    score: world.score,
                });
            }
        }
        Command::PlaceTarget { position } => match world.place_target(position) {
            Ok(position) => out_events.push(Event::TargetPlaced { position }),
            Err(position) => out_events.push(Event::TargetPlacementRejected { position }),
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use sprite_chase_core::{
        Bounds, Buttons, CoordinateMode, Heading, PlacementView, Position, Size,
    };

    use super::{Occupancy, OccupancyGrid, PlayField, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Coordinate space the world was created in.
    #[must_use]
    pub fn mode(world: &World) -> CoordinateMode {
        world.mode
    }

    /// Field extent in the active coordinate space.
    #[must_use]
    pub fn field_size(world: &World) -> Size {
        world.field_size
    }

    /// Captures the controlled entity.
    #[must_use]
    pub fn controlled(world: &World) -> EntitySnapshot {
        EntitySnapshot {
            position: world.controlled.position,
            size: world.controlled.size,
            bounds: world.controlled.bounds,
        }
    }

    /// Captures the target entity.
    #[must_use]
    pub fn target(world: &World) -> EntitySnapshot {
        EntitySnapshot {
            position: world.target.position,
            size: world.target.size,
            bounds: world.target.bounds,
        }
    }

    /// Heading committed by grid-mode motion.
    #[must_use]
    pub fn heading(world: &World) -> Heading {
        world.heading
    }

    /// Direction set committed by pixel-mode motion.
    #[must_use]
    pub fn directions(world: &World) -> Buttons {
        world.directions
    }

    /// Number of targets acquired so far.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of frames advanced so far.
    #[must_use]
    pub fn frames(world: &World) -> u64 {
        world.frames
    }

    /// Inputs the respawn system needs to pick the next target position.
    #[must_use]
    pub fn placement_view(world: &World) -> PlacementView {
        PlacementView {
            mode: world.mode,
            target_bounds: world.target.bounds,
            target_size: world.target.size,
            controlled: world.controlled.position,
        }
    }

    /// Exposes the occupancy grid; `None` in pixel mode.
    #[must_use]
    pub fn occupancy_view(world: &World) -> Option<OccupancyView<'_>> {
        match &world.field {
            PlayField::Grid(grid) => Some(OccupancyView { grid }),
            PlayField::Pixel => None,
        }
    }

    /// Immutable representation of an entity used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EntitySnapshot {
        /// Current position in the active coordinate space.
        pub position: Position,
        /// Extent of the entity.
        pub size: Size,
        /// Inclusive range the position is confined to.
        pub bounds: Bounds,
    }

    /// Read-only view into the dense occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        grid: &'a OccupancyGrid,
    }

    impl<'a> OccupancyView<'a> {
        /// Returns the mark carried by the provided cell, if it lies on the grid.
        #[must_use]
        pub fn at(&self, cell: Position) -> Option<Occupancy> {
            self.grid
                .index(cell)
                .and_then(|index| self.grid.cells.get(index).copied())
        }

        /// Counts the cells carrying the provided mark.
        #[must_use]
        pub fn count(&self, mark: Occupancy) -> usize {
            self.grid.cells.iter().filter(|cell| **cell == mark).count()
        }

        /// Returns an iterator over all cells in row-major order.
        pub fn iter(&self) -> impl Iterator<Item = Occupancy> + 'a {
            let grid = self.grid;
            grid.cells.iter().copied()
        }

        /// Provides the dimensions of the underlying occupancy grid.
        #[must_use]
        pub fn dimensions(&self) -> (u32, u32) {
            (self.grid.columns, self.grid.rows)
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Occupancy>,
}

impl OccupancyGrid {
    fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Occupancy::Empty; capacity],
        }
    }

    fn mark(&mut self, cell: Position, mark: Occupancy) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = mark;
            }
        }
    }

    fn index(&self, cell: Position) -> Option<usize> {
        if cell.x() < self.columns && cell.y() < self.rows {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
