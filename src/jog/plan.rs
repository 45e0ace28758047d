use super::keys::{Key, KeyState};
use crate::axis::AxisId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JogBinding {
    pub key: Key,
    pub axis: AxisId,
    pub direction: Direction,
}

/// Evaluated in this order every tick.
pub const BINDINGS: [JogBinding; 6] = [
    JogBinding {
        key: Key::Left,
        axis: AxisId::X,
        direction: Direction::Negative,
    },
    JogBinding {
        key: Key::Right,
        axis: AxisId::X,
        direction: Direction::Positive,
    },
    JogBinding {
        key: Key::Up,
        axis: AxisId::Y,
        direction: Direction::Negative,
    },
    JogBinding {
        key: Key::Down,
        axis: AxisId::Y,
        direction: Direction::Positive,
    },
    JogBinding {
        key: Key::Plus,
        axis: AxisId::Z,
        direction: Direction::Positive,
    },
    JogBinding {
        key: Key::Minus,
        axis: AxisId::Z,
        direction: Direction::Negative,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogCommand {
    Start { axis: AxisId, direction: Direction },
    Stop { axis: AxisId },
    ReportPositions,
    Cancel,
}

/// Commands for one tick, derived only from the key edges between two
/// snapshots.
///
/// A held cancel key pre-empts everything else in its tick, so each axis
/// receives exactly one stop on the way out. Two opposite keys pressed in
/// the same tick both start, in binding order, so the later binding is the
/// command the axis ends up executing. Releasing either of two held
/// opposite keys stops the axis.
pub fn plan_tick(previous: &KeyState, current: &KeyState) -> Vec<JogCommand> {
    if current.is_pressed(Key::Cancel) {
        return vec![JogCommand::Cancel];
    }

    let mut commands = Vec::new();
    for binding in BINDINGS {
        if current.rising(previous, binding.key) {
            commands.push(JogCommand::Start {
                axis: binding.axis,
                direction: binding.direction,
            });
        } else if current.falling(previous, binding.key) {
            commands.push(JogCommand::Stop { axis: binding.axis });
        }
    }

    if current.is_pressed(Key::Print) {
        commands.push(JogCommand::ReportPositions);
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[Key]) -> KeyState {
        KeyState::of(list)
    }

    #[test]
    fn every_binding_starts_its_axis_on_press() {
        let idle = KeyState::released();
        let cases = [
            (Key::Left, AxisId::X, Direction::Negative),
            (Key::Right, AxisId::X, Direction::Positive),
            (Key::Up, AxisId::Y, Direction::Negative),
            (Key::Down, AxisId::Y, Direction::Positive),
            (Key::Plus, AxisId::Z, Direction::Positive),
            (Key::Minus, AxisId::Z, Direction::Negative),
        ];
        for (key, axis, direction) in cases {
            assert_eq!(
                plan_tick(&idle, &keys(&[key])),
                vec![JogCommand::Start { axis, direction }]
            );
            assert_eq!(
                plan_tick(&keys(&[key]), &idle),
                vec![JogCommand::Stop { axis }]
            );
        }
    }

    #[test]
    fn held_and_idle_keys_issue_nothing() {
        let held = keys(&[Key::Left, Key::Plus]);
        assert!(plan_tick(&held, &held).is_empty());
        assert!(plan_tick(&KeyState::released(), &KeyState::released()).is_empty());
    }

    #[test]
    fn opposite_presses_in_one_tick_start_both_in_binding_order() {
        let plan = plan_tick(&KeyState::released(), &keys(&[Key::Right, Key::Left]));
        assert_eq!(
            plan,
            vec![
                JogCommand::Start {
                    axis: AxisId::X,
                    direction: Direction::Negative,
                },
                JogCommand::Start {
                    axis: AxisId::X,
                    direction: Direction::Positive,
                },
            ]
        );
    }

    #[test]
    fn releasing_one_of_two_opposite_keys_stops_the_axis() {
        let plan = plan_tick(&keys(&[Key::Left, Key::Right]), &keys(&[Key::Right]));
        assert_eq!(plan, vec![JogCommand::Stop { axis: AxisId::X }]);
    }

    #[test]
    fn cancel_preempts_edges_in_its_tick() {
        let plan = plan_tick(&keys(&[Key::Up]), &keys(&[Key::Cancel, Key::Left, Key::Print]));
        assert_eq!(plan, vec![JogCommand::Cancel]);
    }

    #[test]
    fn print_is_level_triggered() {
        let printing = keys(&[Key::Print]);
        assert_eq!(plan_tick(&printing, &printing), vec![JogCommand::ReportPositions]);
    }
}
