use crate::{command::SteeringPosition, geometry::VehicleGeometry};

/// Drives the steering angle toward the angle selected by the discrete
/// steering position, no faster than `steering_rate`.
#[derive(Debug, Clone)]
pub struct SteerController {
    pub steering_angle: f64,
    pub target_steering_angle: f64,
    pub max_steering_angle: f64,
    pub steering_rate: f64,
}

impl SteerController {
    pub fn from_geometry(geometry: &VehicleGeometry, steering_rate: f64) -> Self {
        Self::new(geometry.max_steering_angle, steering_rate)
    }

    pub fn new(max_steering_angle: f64, steering_rate: f64) -> Self {
        Self {
            steering_angle: 0.0,
            target_steering_angle: 0.0,
            max_steering_angle,
            steering_rate,
        }
    }

    pub fn set_target(&mut self, position: SteeringPosition) {
        let max = self.max_steering_angle;
        self.target_steering_angle = (position.value() * max).clamp(-max, max);
    }

    /// Adopts a new steering limit, pulling the current angle and target
    /// back inside it.
    pub fn set_max_steering_angle(&mut self, max_steering_angle: f64) {
        let max = max_steering_angle;
        self.max_steering_angle = max;
        self.steering_angle = self.steering_angle.clamp(-max, max);
        self.target_steering_angle = self.target_steering_angle.clamp(-max, max);
    }

    /// Advances the steering angle by at most `steering_rate * dt` and
    /// returns the new angle.
    pub fn step(&mut self, dt: f64) -> f64 {
        let Self {
            steering_angle,
            target_steering_angle,
            max_steering_angle,
            steering_rate,
        } = *self;

        let max_delta = steering_rate * dt;
        let delta = (target_steering_angle - steering_angle).clamp(-max_delta, max_delta);
        let next = (steering_angle + delta).clamp(-max_steering_angle, max_steering_angle);
        self.steering_angle = next;
        next
    }

    pub fn reset(&mut self) {
        self.steering_angle = 0.0;
        self.target_steering_angle = 0.0;
    }

    pub fn steer_ratio(&self) -> f64 {
        self.steering_angle / self.max_steering_angle
    }
}
