#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Movement {
    Reverse,
    #[default]
    Stopped,
    Forward,
}

impl Movement {
    pub fn value(&self) -> f64 {
        match self {
            Movement::Reverse => -1.0,
            Movement::Stopped => 0.0,
            Movement::Forward => 1.0,
        }
    }

    /// Maps a raw input value onto the closed set {-1, 0, 1}.
    pub fn from_value(value: f64) -> Option<Self> {
        [Movement::Reverse, Movement::Stopped, Movement::Forward]
            .into_iter()
            .find(|movement| movement.value() == value)
    }
}

/// One of the five discrete steering wheel positions. Positive values steer
/// right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SteeringPosition {
    HardLeft,
    HalfLeft,
    #[default]
    Straight,
    HalfRight,
    HardRight,
}

impl SteeringPosition {
    pub const ALL: [SteeringPosition; 5] = [
        SteeringPosition::HardLeft,
        SteeringPosition::HalfLeft,
        SteeringPosition::Straight,
        SteeringPosition::HalfRight,
        SteeringPosition::HardRight,
    ];

    pub fn value(&self) -> f64 {
        match self {
            SteeringPosition::HardLeft => -1.0,
            SteeringPosition::HalfLeft => -0.5,
            SteeringPosition::Straight => 0.0,
            SteeringPosition::HalfRight => 0.5,
            SteeringPosition::HardRight => 1.0,
        }
    }

    /// Maps a raw input value onto the closed set {-1, -0.5, 0, 0.5, 1}.
    pub fn from_value(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|position| position.value() == value)
    }
}

/// Control input for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Command {
    pub movement: Movement,
    pub steering: SteeringPosition,
}

impl Command {
    pub const IDLE: Command = Command {
        movement: Movement::Stopped,
        steering: SteeringPosition::Straight,
    };

    pub fn new(movement: Movement, steering: SteeringPosition) -> Self {
        Self { movement, steering }
    }

    /// Builds a command from raw `{movement, steeringPosition}` values as
    /// produced by an input layer. Values outside the closed sets yield `None`.
    pub fn from_values(movement: f64, steering: f64) -> Option<Self> {
        Some(Self {
            movement: Movement::from_value(movement)?,
            steering: SteeringPosition::from_value(steering)?,
        })
    }
}
