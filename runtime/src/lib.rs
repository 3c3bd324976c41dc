#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame loop shared by both Sprite Chase variants.
//!
//! [`GameLoop`] drives one displayed frame at a time through a fixed phase
//! sequence: wait for the refresh, sample input, maybe commit motion, test for
//! the target, push sprite positions. All state lives in the world; the loop
//! only routes commands and events between the world, the pure systems and a
//! [`DisplayAdapter`].

mod stop;

use std::time::{SystemTime, UNIX_EPOCH};

use sprite_chase_core::{
    Command, ConfigError, CoordinateMode, Event, GameConfig, PlacementView, Position, Seed,
};
use sprite_chase_display::{DisplayAdapter, SpriteId, Theme, TilePattern};
use sprite_chase_system_cadence::Cadence;
use sprite_chase_system_input::InputMapper;
use sprite_chase_system_respawn::Respawn;
use sprite_chase_world::{self as world, query, World};
use tracing::{debug, info, warn};

pub use stop::StopHandle;

const PLACEMENT_ATTEMPTS: usize = 8;

/// Resolves the configured seed source into a concrete seed.
///
/// Entropy is taken from the wall clock at the moment of the call.
#[must_use]
pub fn resolve_seed(seed: Seed) -> u64 {
    match seed {
        Seed::Fixed(value) => value,
        Seed::Entropy => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() ^ (u64::from(elapsed.subsec_nanos()) << 32))
            .unwrap_or_default(),
    }
}

/// Phases a single frame walks through, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    /// Waiting for any blanking in progress to end.
    WaitForFrameStart,
    /// Waiting for the next blanking interval to begin.
    WaitForFrameActive,
    /// Reading buttons and updating the heading or direction set.
    SampleInput,
    /// Advancing the timing counter and committing motion when it fires.
    MaybeCommitMotion,
    /// Testing for the target and placing a new one when reached.
    CheckTargetReached,
    /// Writing sprite positions to the display.
    PushPositions,
}

/// Bounds how many frames [`GameLoop::run`] executes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunLimit {
    /// Runs until stopped or the display closes.
    #[default]
    Forever,
    /// Runs at most the given number of frames.
    Frames(u64),
}

/// Outcome of a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frames elapsed since the loop was created, including this one.
    pub frame: u64,
    /// Whether a motion step was committed on this frame.
    pub committed: bool,
    /// Whether the target was reached on this frame.
    pub target_reached: bool,
    /// Score after this frame.
    pub score: u32,
}

/// Outcome of a call to [`GameLoop::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames executed by this call.
    pub frames: u64,
    /// Score when the loop stopped.
    pub score: u32,
}

#[derive(Debug, Default)]
struct FrameState {
    committed: bool,
    target_reached: bool,
    target_changed: bool,
}

/// Real-time loop connecting the world, the systems and a display.
#[derive(Debug)]
pub struct GameLoop {
    config: GameConfig,
    theme: Theme,
    seed: u64,
    world: World,
    input: InputMapper,
    cadence: Cadence,
    respawn: Respawn,
    stop: StopHandle,
    ready: bool,
}

impl GameLoop {
    /// Validates `config` and creates the world with its initial target.
    ///
    /// Without a configured target start, the first target is drawn from the
    /// same seeded sequence as every later one, excluding the controlled
    /// entity's start.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut respawn = Respawn::new(seed);
        let target = match config.target_start {
            Some(position) => position,
            None => respawn.draw(&PlacementView {
                mode: config.mode,
                target_bounds: config.target_bounds(),
                target_size: config.target_size,
                controlled: config.controlled_start,
            }),
        };

        Ok(Self {
            world: World::new(&config, target),
            input: InputMapper::new(),
            cadence: Cadence::new(config.speed),
            respawn,
            theme: Theme::default(),
            stop: StopHandle::new(),
            ready: false,
            seed,
            config,
        })
    }

    /// Replaces the sprite colors loaded during setup.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Returns a handle that stops [`GameLoop::run`] at the next frame boundary.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Authoritative world driven by the loop.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the loop was created with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Seed driving target placement.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Loads palette colors and sprite tiles, then shows both sprites.
    ///
    /// Runs once; later calls do nothing. [`GameLoop::step`] invokes it on
    /// demand.
    pub fn setup<D: DisplayAdapter>(&mut self, display: &mut D) {
        if self.ready {
            return;
        }
        self.ready = true;

        let controlled = query::controlled(&self.world);
        let target = query::target(&self.world);

        display.set_palette_color(self.theme.controlled.slot, self.theme.controlled.color);
        display.set_palette_color(self.theme.target.slot, self.theme.target.color);
        display.init_sprite_tile(
            SpriteId::CONTROLLED,
            &TilePattern::solid(
                self.theme.controlled.slot,
                self.config.sprite_size(controlled.size),
            ),
        );
        display.init_sprite_tile(
            SpriteId::TARGET,
            &TilePattern::solid(self.theme.target.slot, self.config.sprite_size(target.size)),
        );

        self.push_sprite(display, SpriteId::CONTROLLED, controlled.position);
        self.push_sprite(display, SpriteId::TARGET, target.position);
    }

    /// Runs exactly one displayed frame.
    pub fn step<D: DisplayAdapter>(&mut self, display: &mut D) -> FrameReport {
        self.setup(display);

        let mut state = FrameState::default();
        let mut phase = FramePhase::WaitForFrameStart;
        loop {
            phase = match phase {
                FramePhase::WaitForFrameStart => {
                    display.wait_for_blanking_boundary_start();
                    FramePhase::WaitForFrameActive
                }
                FramePhase::WaitForFrameActive => {
                    display.wait_for_blanking_boundary_end();
                    FramePhase::SampleInput
                }
                FramePhase::SampleInput => {
                    let pressed = display.read_raw_input();
                    let mut commands = Vec::new();
                    self.input
                        .handle(pressed, query::mode(&self.world), &mut commands);
                    let _ = self.execute(commands, &mut state);
                    FramePhase::MaybeCommitMotion
                }
                FramePhase::MaybeCommitMotion => {
                    let events = self.execute(vec![Command::AdvanceFrame], &mut state);
                    let mut commands = Vec::new();
                    self.cadence.handle(&events, &mut commands);
                    let _ = self.execute(commands, &mut state);
                    FramePhase::CheckTargetReached
                }
                FramePhase::CheckTargetReached => {
                    let mut events = self.execute(vec![Command::CheckTargetReached], &mut state);
                    for _ in 0..PLACEMENT_ATTEMPTS {
                        let mut commands = Vec::new();
                        self.respawn.handle(
                            &events,
                            &query::placement_view(&self.world),
                            &mut commands,
                        );
                        if commands.is_empty() {
                            break;
                        }
                        events = self.execute(commands, &mut state);
                    }
                    FramePhase::PushPositions
                }
                FramePhase::PushPositions => {
                    let controlled = query::controlled(&self.world).position;
                    self.push_sprite(display, SpriteId::CONTROLLED, controlled);
                    if state.target_changed {
                        let target = query::target(&self.world).position;
                        self.push_sprite(display, SpriteId::TARGET, target);
                    }
                    break;
                }
            };
        }

        FrameReport {
            frame: query::frames(&self.world),
            committed: state.committed,
            target_reached: state.target_reached,
            score: query::score(&self.world),
        }
    }

    /// Runs frames until `limit` is reached, the stop handle fires, or the
    /// display closes.
    pub fn run<D: DisplayAdapter>(&mut self, display: &mut D, limit: RunLimit) -> RunSummary {
        info!(
            mode = mode_name(self.config.mode),
            seed = self.seed,
            speed = self.config.speed,
            limit = ?limit,
            "game_loop_started"
        );

        let mut frames = 0_u64;
        let reason = loop {
            if self.stop.is_stopped() {
                break "stop_requested";
            }
            if !display.is_open() {
                break "display_closed";
            }
            if let RunLimit::Frames(limit) = limit {
                if frames >= limit {
                    break "frame_limit";
                }
            }

            let _ = self.step(display);
            frames += 1;
        };

        let summary = RunSummary {
            frames,
            score: query::score(&self.world),
        };
        info!(
            reason,
            frames = summary.frames,
            score = summary.score,
            "game_loop_stopped"
        );
        summary
    }

    fn execute(&mut self, commands: Vec<Command>, state: &mut FrameState) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        for event in &events {
            match *event {
                Event::MotionCommitted { from, to } => {
                    state.committed = true;
                    debug!(
                        from_x = from.x(),
                        from_y = from.y(),
                        to_x = to.x(),
                        to_y = to.y(),
                        "controlled_moved"
                    );
                }
                Event::TargetReached { position, score } => {
                    state.target_reached = true;
                    info!(x = position.x(), y = position.y(), score, "target_reached");
                }
                Event::TargetPlaced { position } => {
                    state.target_changed = true;
                    info!(x = position.x(), y = position.y(), "target_placed");
                }
                Event::TargetPlacementRejected { position } => {
                    warn!(
                        x = position.x(),
                        y = position.y(),
                        "target_placement_rejected"
                    );
                }
                Event::FrameAdvanced { .. }
                | Event::HeadingChanged { .. }
                | Event::DirectionsChanged { .. } => {}
            }
        }

        events
    }

    fn push_sprite<D: DisplayAdapter>(&self, display: &mut D, sprite: SpriteId, position: Position) {
        let pixels = self.config.sprite_position(position);
        display.set_sprite_position(sprite, pixels.x(), pixels.y());
    }
}

fn mode_name(mode: CoordinateMode) -> &'static str {
    match mode {
        CoordinateMode::Grid => "grid",
        CoordinateMode::Pixel => "pixel",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_seed_resolves_to_itself() {
        assert_eq!(resolve_seed(Seed::Fixed(17)), 17);
    }

    #[test]
    fn invalid_config_is_rejected_before_world_creation() {
        let mut config = GameConfig::grid();
        config.speed = 0;
        assert!(matches!(
            GameLoop::new(config, 1),
            Err(ConfigError::ZeroSpeed)
        ));
    }

    #[test]
    fn initial_draw_never_lands_on_controlled_start() {
        for seed in 0..256 {
            let game = GameLoop::new(GameConfig::grid(), seed).expect("valid preset");
            assert_ne!(
                query::target(game.world()).position,
                GameConfig::grid().controlled_start,
                "seed {seed}"
            );
        }
    }
}
