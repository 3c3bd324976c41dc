use sprite_chase_core::{Buttons, Command, CoordinateMode, GameConfig, Heading, Position};
use sprite_chase_system_input::InputMapper;
use sprite_chase_world::{self as world, query, World};

fn sample(pressed: Buttons, mode: CoordinateMode) -> Vec<Command> {
    let mut mapper = InputMapper::new();
    let mut commands = Vec::new();
    mapper.handle(pressed, mode, &mut commands);
    commands
}

#[test]
fn grid_takes_highest_priority_direction() {
    assert_eq!(
        sample(Buttons::DOWN | Buttons::LEFT | Buttons::UP, CoordinateMode::Grid),
        vec![Command::SetHeading {
            heading: Heading::Up
        }]
    );
    assert_eq!(
        sample(Buttons::DOWN | Buttons::RIGHT, CoordinateMode::Grid),
        vec![Command::SetHeading {
            heading: Heading::Right
        }]
    );
}

#[test]
fn pixel_forwards_every_direction_without_face_buttons() {
    assert_eq!(
        sample(
            Buttons::UP | Buttons::LEFT | Buttons::A | Buttons::START,
            CoordinateMode::Pixel
        ),
        vec![Command::SetDirections {
            directions: Buttons::UP | Buttons::LEFT
        }]
    );
}

#[test]
fn released_pad_emits_nothing() {
    for mode in [CoordinateMode::Grid, CoordinateMode::Pixel] {
        assert!(sample(Buttons::empty(), mode).is_empty());
        assert!(sample(Buttons::B | Buttons::SELECT, mode).is_empty());
    }
}

#[test]
fn heading_survives_released_pad_in_world() {
    let mut world = World::new(&GameConfig::grid(), Position::new(7, 2));
    let mut mapper = InputMapper::new();
    let mut events = Vec::new();

    for pressed in [Buttons::LEFT, Buttons::empty(), Buttons::A] {
        let mut commands = Vec::new();
        mapper.handle(pressed, query::mode(&world), &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }

    assert_eq!(query::heading(&world), Heading::Left);
}
