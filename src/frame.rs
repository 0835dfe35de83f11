//! Body-frame to world-frame placement of wheels and body corners.
//!
//! The body frame has its origin on the rear axle center, +x pointing forward
//! and +y pointing to the right of the car. The world frame is screen-like
//! (y grows downward), so a heading of 0 faces +x and increasing heading
//! rotates clockwise on screen.

use crate::geometry::VehicleGeometry;
use nalgebra::{Point2, Rotation2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Places a body-frame offset (`forward`, `right`) around `origin` for a car
/// facing `heading`.
pub fn body_to_world(origin: &Point2<f64>, heading: f64, forward: f64, right: f64) -> Point2<f64> {
    origin + Rotation2::new(heading) * Vector2::new(forward, right)
}

/// Moves `origin` by `distance` along `heading`.
pub fn advance(origin: &Point2<f64>, heading: f64, distance: f64) -> Point2<f64> {
    body_to_world(origin, heading, distance, 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WheelPosition {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    pub fn index(&self) -> usize {
        match self {
            WheelPosition::FrontLeft => 0,
            WheelPosition::FrontRight => 1,
            WheelPosition::RearLeft => 2,
            WheelPosition::RearRight => 3,
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::FrontRight)
    }

    pub fn is_left(&self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::RearLeft)
    }
}

/// A wheel as the renderer draws it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheel {
    pub position: WheelPosition,
    pub center: Point2<f64>,
    /// World-frame orientation; front wheels include the steering angle.
    pub angle: f64,
}

impl Wheel {
    pub fn is_front(&self) -> bool {
        self.position.is_front()
    }
}

pub fn wheels(
    rear_axle: &Point2<f64>,
    heading: f64,
    steering_angle: f64,
    geometry: &VehicleGeometry,
    inset: f64,
) -> [Wheel; 4] {
    let half_track = geometry.width / 2.0 - inset;

    WheelPosition::ALL.map(|position| {
        let (forward, angle) = if position.is_front() {
            (geometry.wheelbase, heading + steering_angle)
        } else {
            (0.0, heading)
        };
        let right = if position.is_left() {
            -half_track
        } else {
            half_track
        };

        Wheel {
            position,
            center: body_to_world(rear_axle, heading, forward, right),
            angle,
        }
    })
}

/// Corners of the body footprint in drawing order: front-left, front-right,
/// rear-right, rear-left.
pub fn corners(
    rear_axle: &Point2<f64>,
    heading: f64,
    geometry: &VehicleGeometry,
) -> [Point2<f64>; 4] {
    let front = geometry.front_distance();
    let back = -geometry.rear_overhang;
    let half_width = geometry.width / 2.0;

    [
        (front, -half_width),
        (front, half_width),
        (back, half_width),
        (back, -half_width),
    ]
    .map(|(forward, right)| body_to_world(rear_axle, heading, forward, right))
}
