use std::collections::HashSet;

use sprite_chase_core::{Command, Event, GameConfig, Heading, Position};
use sprite_chase_system_respawn::Respawn;
use sprite_chase_world::{self as world, query, World};

#[test]
fn ten_thousand_grid_draws_stay_in_bounds_and_off_the_head() {
    let world = World::new(&GameConfig::grid(), Position::new(7, 2));
    let view = query::placement_view(&world);
    let mut respawn = Respawn::new(42);
    let mut seen = HashSet::new();

    for _ in 0..10_000 {
        let position = respawn.draw(&view);
        assert!(position.x() < 10 && position.y() < 10, "{position:?}");
        assert_ne!(position, Position::new(4, 4));
        let _ = seen.insert(position);
    }

    assert_eq!(seen.len(), 99, "every other cell should be reachable");
}

#[test]
fn ten_thousand_pixel_draws_stay_in_bounds_and_clear() {
    let config = GameConfig::pixel();
    let world = World::new(&config, Position::new(0, 0));
    let view = query::placement_view(&world);
    let mut respawn = Respawn::new(7);

    for _ in 0..10_000 {
        let position = respawn.draw(&view);
        assert!(position.x() <= 232 && position.y() <= 152, "{position:?}");
        assert!(!view.collides(position), "{position:?} overlaps the collector");
    }
}

#[test]
fn equal_seeds_produce_equal_sequences() {
    let world = World::new(&GameConfig::grid(), Position::new(7, 2));
    let view = query::placement_view(&world);
    let mut first = Respawn::new(1234);
    let mut second = Respawn::new(1234);

    let a: Vec<Position> = (0..64).map(|_| first.draw(&view)).collect();
    let b: Vec<Position> = (0..64).map(|_| second.draw(&view)).collect();
    assert_eq!(a, b);
}

#[test]
fn acquisition_is_followed_by_a_placement() {
    let mut config = GameConfig::grid();
    config.initial_heading = Heading::Right;
    let mut world = World::new(&config, Position::new(5, 4));
    let mut respawn = Respawn::new(9);

    let mut events = Vec::new();
    world::apply(&mut world, Command::CommitMotion, &mut events);
    world::apply(&mut world, Command::CheckTargetReached, &mut events);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TargetReached { score: 1, .. })));

    let mut commands = Vec::new();
    respawn.handle(&events, &query::placement_view(&world), &mut commands);
    assert_eq!(commands.len(), 1);

    let mut placed = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut placed);
    }
    match placed.as_slice() {
        [Event::TargetPlaced { position }] => assert_ne!(*position, Position::new(5, 4)),
        other => panic!("unexpected events: {other:?}"),
    }
}
