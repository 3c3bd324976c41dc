//! Startup configuration for both game variants.
//!
//! Configuration is fixed for the lifetime of a run. Adapters start from one
//! of the presets, apply [`ConfigOverrides`] parsed from a file or the command
//! line, and call [`GameConfig::validate`] before constructing the loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Bounds, CoordinateMode, Heading, Position, Size};

/// Largest number of cells a grid-mode field may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 16;

/// Source of the seed that drives target placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seed {
    /// Reproducible runs from a fixed value.
    Fixed(u64),
    /// Seed resolved from ambient entropy when the run starts.
    Entropy,
}

/// Complete configuration surface of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Coordinate space of the play field.
    pub mode: CoordinateMode,
    /// Field extent: pixels in pixel mode, cells in grid mode.
    pub field: Size,
    /// Edge length of a grid cell in display pixels. Ignored in pixel mode.
    pub cell_size: u32,
    /// Extent of the controlled entity. Must be one cell in grid mode.
    pub controlled_size: Size,
    /// Extent of the target entity. Must be one cell in grid mode.
    pub target_size: Size,
    /// Starting position of the controlled entity.
    pub controlled_start: Position,
    /// Starting position of the target; drawn at random when absent.
    pub target_start: Option<Position>,
    /// Pixels moved per committed step in pixel mode. Grid mode always moves one cell.
    pub step: u32,
    /// Frames between motion commits.
    pub speed: u32,
    /// Heading before the first direction press.
    pub initial_heading: Heading,
    /// Seed source for target placement.
    pub seed: Seed,
}

impl GameConfig {
    /// Snake-style preset: a 10x10 board of 8px cells, one move every 30 frames.
    #[must_use]
    pub fn grid() -> Self {
        Self {
            mode: CoordinateMode::Grid,
            field: Size::square(10),
            cell_size: 8,
            controlled_size: Size::square(1),
            target_size: Size::square(1),
            controlled_start: Position::new(4, 4),
            target_start: None,
            step: 1,
            speed: 30,
            initial_heading: Heading::Up,
            seed: Seed::Entropy,
        }
    }

    /// Collector preset: a 240x160 screen, 8x8 sprites moving 2px every frame.
    #[must_use]
    pub fn pixel() -> Self {
        let field = Size::new(240, 160);
        let sprite = Size::square(8);
        Self {
            mode: CoordinateMode::Pixel,
            field,
            cell_size: 1,
            controlled_size: sprite,
            target_size: sprite,
            controlled_start: Position::new(
                (field.width() - sprite.width()) / 2,
                (field.height() - sprite.height()) / 2,
            ),
            target_start: None,
            step: 2,
            speed: 1,
            initial_heading: Heading::Up,
            seed: Seed::Entropy,
        }
    }

    /// Preset matching the requested mode.
    #[must_use]
    pub fn preset(mode: CoordinateMode) -> Self {
        match mode {
            CoordinateMode::Grid => Self::grid(),
            CoordinateMode::Pixel => Self::pixel(),
        }
    }

    /// Builds a configuration from the preset named by `overrides.mode`,
    /// falling back to `default_mode`, with the remaining overrides applied.
    #[must_use]
    pub fn from_overrides(default_mode: CoordinateMode, overrides: &ConfigOverrides) -> Self {
        Self::preset(overrides.mode.unwrap_or(default_mode)).with_overrides(overrides)
    }

    /// Returns a copy with every provided override applied. The preset mode
    /// is left untouched.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(field) = overrides.field {
            self.field = field;
        }
        if let Some(cell_size) = overrides.cell_size {
            self.cell_size = cell_size;
        }
        if let Some(size) = overrides.controlled_size {
            self.controlled_size = size;
        }
        if let Some(size) = overrides.target_size {
            self.target_size = size;
        }
        if let Some(start) = overrides.controlled_start {
            self.controlled_start = start;
        }
        if let Some(start) = overrides.target_start {
            self.target_start = Some(start);
        }
        if let Some(step) = overrides.step {
            self.step = step;
        }
        if let Some(speed) = overrides.speed {
            self.speed = speed;
        }
        if let Some(heading) = overrides.initial_heading {
            self.initial_heading = heading;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        self
    }

    /// Inclusive position range of the controlled entity.
    #[must_use]
    pub fn controlled_bounds(&self) -> Bounds {
        self.bounds_for(self.controlled_size)
    }

    /// Inclusive position range of the target entity.
    #[must_use]
    pub fn target_bounds(&self) -> Bounds {
        self.bounds_for(self.target_size)
    }

    /// On-screen sprite extent, in display pixels, of an entity of `size`.
    #[must_use]
    pub fn sprite_size(&self, size: Size) -> Size {
        match self.mode {
            CoordinateMode::Grid => Size::square(self.cell_size),
            CoordinateMode::Pixel => size,
        }
    }

    /// Display pixel position of an entity located at `position`.
    #[must_use]
    pub fn sprite_position(&self, position: Position) -> Position {
        match self.mode {
            CoordinateMode::Grid => position.cell_to_pixels(self.cell_size),
            CoordinateMode::Pixel => position,
        }
    }

    /// Per-commit displacement magnitude in the active coordinate space.
    #[must_use]
    pub fn step_length(&self) -> u32 {
        match self.mode {
            CoordinateMode::Grid => 1,
            CoordinateMode::Pixel => self.step,
        }
    }

    fn bounds_for(&self, size: Size) -> Bounds {
        match self.mode {
            CoordinateMode::Grid => Bounds::for_grid(self.field.width(), self.field.height()),
            CoordinateMode::Pixel => Bounds::for_pixels(self.field, size),
        }
    }

    /// Checks that every value can be honoured without breaking a world invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field.is_empty() {
            return Err(ConfigError::EmptyField);
        }
        if self.speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }

        match self.mode {
            CoordinateMode::Grid => self.validate_grid()?,
            CoordinateMode::Pixel => self.validate_pixel()?,
        }

        if !self.controlled_bounds().contains(self.controlled_start) {
            return Err(ConfigError::StartOutOfBounds {
                entity: "controlled",
                position: self.controlled_start,
            });
        }

        if let Some(target) = self.target_start {
            if !self.target_bounds().contains(target) {
                return Err(ConfigError::StartOutOfBounds {
                    entity: "target",
                    position: target,
                });
            }
            if crate::target_reached(self.mode, self.controlled_start, target, self.target_size) {
                return Err(ConfigError::TargetOverlapsControlled { position: target });
            }
        }

        Ok(())
    }

    fn validate_grid(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.controlled_size != Size::square(1) || self.target_size != Size::square(1) {
            return Err(ConfigError::GridEntitySize);
        }
        let cells = u64::from(self.field.width()) * u64::from(self.field.height());
        if cells < 2 {
            return Err(ConfigError::GridTooSmall);
        }
        if cells > MAX_GRID_CELLS {
            return Err(ConfigError::GridTooLarge { cells });
        }
        Ok(())
    }

    fn validate_pixel(&self) -> Result<(), ConfigError> {
        if self.step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        for (entity, size) in [
            ("controlled", self.controlled_size),
            ("target", self.target_size),
        ] {
            if size.is_empty() {
                return Err(ConfigError::EmptyEntity { entity });
            }
            if size.width() > self.field.width() || size.height() > self.field.height() {
                return Err(ConfigError::EntityLargerThanField { entity });
            }
        }

        // A target can always be placed clear of the controlled entity when at
        // least one axis spans more than twice the target's extent.
        let bounds = self.target_bounds();
        let size = self.target_size;
        if bounds.max_x() <= size.width().saturating_mul(2)
            && bounds.max_y() <= size.height().saturating_mul(2)
        {
            return Err(ConfigError::FieldTooSmallForTarget);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::grid()
    }
}

/// Partial configuration layered on top of a preset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Preset to start from.
    pub mode: Option<CoordinateMode>,
    /// Replacement field extent.
    pub field: Option<Size>,
    /// Replacement grid cell size.
    pub cell_size: Option<u32>,
    /// Replacement controlled entity extent.
    pub controlled_size: Option<Size>,
    /// Replacement target entity extent.
    pub target_size: Option<Size>,
    /// Replacement controlled start position.
    pub controlled_start: Option<Position>,
    /// Fixed target start position.
    pub target_start: Option<Position>,
    /// Replacement pixel step.
    pub step: Option<u32>,
    /// Replacement motion-commit threshold.
    pub speed: Option<u32>,
    /// Replacement initial heading.
    pub initial_heading: Option<Heading>,
    /// Replacement seed source.
    pub seed: Option<Seed>,
}

/// Reasons a configuration is rejected at startup.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The field has a zero dimension.
    #[error("play field must have non-zero width and height")]
    EmptyField,
    /// Motion would never be committed.
    #[error("speed must be at least one frame per commit")]
    ZeroSpeed,
    /// Grid cells would render with no extent.
    #[error("cell size must be non-zero in grid mode")]
    ZeroCellSize,
    /// Pixel motion would never displace the entity.
    #[error("step must be non-zero in pixel mode")]
    ZeroStep,
    /// Grid entities occupy exactly one cell.
    #[error("grid mode entities must be exactly one cell in size")]
    GridEntitySize,
    /// A grid needs room for both entities.
    #[error("grid must contain at least two cells")]
    GridTooSmall,
    /// The occupancy grid would exceed its cell budget.
    #[error("grid of {cells} cells exceeds the limit of {}", MAX_GRID_CELLS)]
    GridTooLarge {
        /// Cells the configured field would hold.
        cells: u64,
    },
    /// An entity has a zero dimension.
    #[error("{entity} entity must have non-zero width and height")]
    EmptyEntity {
        /// Entity with the offending size.
        entity: &'static str,
    },
    /// An entity does not fit inside the field.
    #[error("{entity} entity is larger than the play field")]
    EntityLargerThanField {
        /// Entity with the offending size.
        entity: &'static str,
    },
    /// A configured start lies outside the entity's bounds.
    #[error("{entity} start position ({}, {}) lies outside the play field", position.x(), position.y())]
    StartOutOfBounds {
        /// Entity with the offending start.
        entity: &'static str,
        /// Position that was requested.
        position: Position,
    },
    /// The configured target starts already reached.
    #[error("target start position ({}, {}) overlaps the controlled entity", position.x(), position.y())]
    TargetOverlapsControlled {
        /// Position that was requested.
        position: Position,
    },
    /// No target position could avoid the controlled entity.
    #[error("pixel field is too small to place the target clear of the controlled entity")]
    FieldTooSmallForTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert_eq!(GameConfig::grid().validate(), Ok(()));
        assert_eq!(GameConfig::pixel().validate(), Ok(()));
    }

    #[test]
    fn pixel_preset_centres_controlled_entity() {
        let config = GameConfig::pixel();
        assert_eq!(config.controlled_start, Position::new(116, 76));
        assert_eq!(config.controlled_bounds(), Bounds::new(232, 152));
    }

    #[test]
    fn zero_speed_is_rejected() {
        let mut config = GameConfig::grid();
        config.speed = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSpeed));
    }

    #[test]
    fn start_outside_grid_is_rejected() {
        let mut config = GameConfig::grid();
        config.controlled_start = Position::new(10, 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StartOutOfBounds {
                entity: "controlled",
                ..
            })
        ));
    }

    #[test]
    fn target_on_controlled_cell_is_rejected() {
        let mut config = GameConfig::grid();
        config.target_start = Some(config.controlled_start);
        assert_eq!(
            config.validate(),
            Err(ConfigError::TargetOverlapsControlled {
                position: Position::new(4, 4)
            })
        );
    }

    #[test]
    fn target_inside_pixel_band_is_rejected() {
        let mut config = GameConfig::pixel();
        config.target_start = Some(Position::new(124, 84));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TargetOverlapsControlled { .. })
        ));
    }

    #[test]
    fn single_cell_grid_is_rejected() {
        let mut config = GameConfig::grid();
        config.field = Size::square(1);
        config.controlled_start = Position::new(0, 0);
        assert_eq!(config.validate(), Err(ConfigError::GridTooSmall));
    }

    #[test]
    fn oversized_grid_is_rejected_before_allocation() {
        let overrides: ConfigOverrides =
            toml::from_str("field = { width = 200000, height = 200000 }").expect("parse");
        let config = GameConfig::grid().with_overrides(&overrides);
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooLarge {
                cells: 40_000_000_000
            })
        );

        let mut largest = GameConfig::grid();
        largest.field = Size::square(256);
        assert_eq!(largest.validate(), Ok(()));
        largest.field = Size::new(256, 257);
        assert!(matches!(
            largest.validate(),
            Err(ConfigError::GridTooLarge { cells: 65_792 })
        ));
    }

    #[test]
    fn cramped_pixel_field_is_rejected() {
        let mut config = GameConfig::pixel();
        config.field = Size::new(24, 24);
        config.controlled_start = Position::new(0, 0);
        assert_eq!(config.validate(), Err(ConfigError::FieldTooSmallForTarget));
    }

    #[test]
    fn grid_sprites_scale_with_cell_size() {
        let config = GameConfig::grid();
        assert_eq!(config.sprite_size(config.controlled_size), Size::square(8));
        assert_eq!(
            config.sprite_position(Position::new(7, 2)),
            Position::new(56, 16)
        );
    }

    #[test]
    fn overrides_parse_from_partial_toml() {
        let overrides: ConfigOverrides = toml::from_str(
            r#"
            speed = 12
            target_start = { x = 7, y = 2 }
            seed = { fixed = 99 }
            "#,
        )
        .expect("parse overrides");

        let config = GameConfig::grid().with_overrides(&overrides);
        assert_eq!(config.speed, 12);
        assert_eq!(config.target_start, Some(Position::new(7, 2)));
        assert_eq!(config.seed, Seed::Fixed(99));
        assert_eq!(config.field, Size::square(10));
    }

    #[test]
    fn override_mode_selects_preset() {
        let overrides: ConfigOverrides =
            toml::from_str("mode = \"pixel\"\nstep = 3").expect("parse overrides");
        let config = GameConfig::from_overrides(CoordinateMode::Grid, &overrides);
        assert_eq!(config.mode, CoordinateMode::Pixel);
        assert_eq!(config.field, Size::new(240, 160));
        assert_eq!(config.step_length(), 3);
    }

    #[test]
    fn unknown_override_keys_are_rejected() {
        let parsed: Result<ConfigOverrides, _> = toml::from_str("velocity = 3");
        assert!(parsed.is_err());
    }
}
