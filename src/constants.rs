/// Maximum rate at which the steering angle follows its target, in rad/s.
pub const STEERING_RATE_RADS: f64 = 5.0;

/// Below this speed magnitude the car is considered parked for the tick.
pub const MOVING_SPEED_EPSILON: f64 = 0.1;

/// Steering angles at or below this magnitude are driven as straight.
pub const STRAIGHT_STEERING_EPSILON: f64 = 0.001;

/// Distance from the body side to the wheel center.
pub const DEFAULT_WHEEL_INSET: f64 = 5.0;
