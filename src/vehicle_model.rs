use crate::{
    command::Command,
    constants::{
        DEFAULT_WHEEL_INSET, MOVING_SPEED_EPSILON, STEERING_RATE_RADS, STRAIGHT_STEERING_EPSILON,
    },
    frame::{self, Wheel},
    geometry::VehicleGeometry,
    steer_control::SteerController,
    trail::{TrailConfig, WheelTrails},
};
use log::{debug, warn};
use nalgebra::Point2;
use noisy_float::types::R64;
use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wraps a heading into `[0, 2π)`.
pub fn normalize_heading(heading: f64) -> f64 {
    let normalized = heading.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if normalized >= TAU {
        0.0
    } else {
        normalized
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleState {
    /// Rear axle center, the pivot the car turns around.
    pub rear_axle: Point2<f64>,
    pub heading: f64,
    pub steering_angle: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleModelInit {
    pub geometry: VehicleGeometry,
    pub trail: TrailConfig,
    /// Steering slew rate in rad/s.
    pub steering_rate: f64,
    /// Distance from the body side to the wheel centers.
    pub wheel_inset: f64,
}

impl Default for VehicleModelInit {
    fn default() -> Self {
        Self {
            geometry: VehicleGeometry::default(),
            trail: TrailConfig::default(),
            steering_rate: STEERING_RATE_RADS,
            wheel_inset: DEFAULT_WHEEL_INSET,
        }
    }
}

impl VehicleModelInit {
    pub fn from_geometry(geometry: VehicleGeometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    /// Builds a parked car whose visual center sits at `center`.
    pub fn build(&self, center: Point2<f64>, heading: f64) -> VehicleModel {
        let Self {
            ref geometry,
            ref trail,
            steering_rate,
            wheel_inset,
        } = *self;
        assert_valid_geometry(geometry);
        assert!(steering_rate > 0.0);
        assert!(
            (0.0..geometry.width / 2.0).contains(&wheel_inset),
            "wheel inset {wheel_inset} must lie within half the body width {}",
            geometry.width / 2.0
        );

        let heading = normalize_heading(heading);

        VehicleModel {
            state: VehicleState {
                rear_axle: rear_axle_from_center(&center, heading, geometry),
                heading,
                steering_angle: 0.0,
                velocity: 0.0,
            },
            steer_controller: SteerController::from_geometry(geometry, steering_rate),
            trails: WheelTrails::new(trail.capacity),
            config: self.clone(),
        }
    }
}

/// Kinematic bicycle model of a car driven by discrete commands.
///
/// Integration pivots on the rear axle: each moving tick first turns the
/// heading by `v / R * dt` with `R = wheelbase / tan(steering)`, then
/// translates the rear axle along the new heading.
#[derive(Debug, Clone)]
pub struct VehicleModel {
    config: VehicleModelInit,
    state: VehicleState,
    steer_controller: SteerController,
    trails: WheelTrails,
}

impl VehicleModel {
    pub fn new(center_x: f64, center_y: f64, heading: f64, geometry: VehicleGeometry) -> Self {
        VehicleModelInit::from_geometry(geometry).build(Point2::new(center_x, center_y), heading)
    }

    /// Swaps the geometry profile. The visual center and heading stay put;
    /// the rear axle moves to match the new lever arm.
    pub fn set_geometry(&mut self, geometry: VehicleGeometry) {
        assert_valid_geometry(&geometry);
        assert!(
            self.config.wheel_inset < geometry.width / 2.0,
            "wheel inset {} must lie within half the body width {}",
            self.config.wheel_inset,
            geometry.width / 2.0
        );

        let center = self.center();
        let Self {
            config,
            state,
            steer_controller,
            trails,
        } = self;

        config.geometry = geometry;
        state.rear_axle = rear_axle_from_center(&center, state.heading, &geometry);
        steer_controller.set_max_steering_angle(geometry.max_steering_angle);
        state.steering_angle = steer_controller.steering_angle;
        state.velocity = state.velocity.clamp(-geometry.speed, geometry.speed);

        if config.trail.clear_on_geometry_swap {
            trails.clear();
        }

        debug!(
            "geometry swapped: length {} wheelbase {} (trails {})",
            geometry.length,
            geometry.wheelbase,
            if config.trail.clear_on_geometry_swap {
                "cleared"
            } else {
                "kept"
            }
        );
    }

    pub fn set_clear_trails_on_geometry_swap(&mut self, clear: bool) {
        self.config.trail.clear_on_geometry_swap = clear;
    }

    /// Advances the car by `dt` seconds under `command`.
    pub fn update(&mut self, dt: f64, command: Command) {
        let dt = sanitize_time_step(dt);

        let Self {
            config,
            state,
            steer_controller,
            trails,
        } = self;
        let geometry = &config.geometry;

        steer_controller.set_target(command.steering);
        state.steering_angle = steer_controller.step(dt);
        state.velocity = command.movement.value() * geometry.speed;

        if state.velocity.abs() < MOVING_SPEED_EPSILON {
            return;
        }

        // Trails hold where the wheels were before this tick's motion
        trails.record(&frame::wheels(
            &state.rear_axle,
            state.heading,
            state.steering_angle,
            geometry,
            config.wheel_inset,
        ));

        if state.steering_angle.abs() > STRAIGHT_STEERING_EPSILON {
            let turning_radius = geometry.wheelbase / state.steering_angle.tan();
            let yaw_rate = state.velocity / turning_radius;
            state.heading += yaw_rate * dt;
        }

        state.rear_axle = frame::advance(&state.rear_axle, state.heading, state.velocity * dt);
        state.heading = normalize_heading(state.heading);
    }

    /// Places the car at a new pose, parked with straight wheels and no trails.
    pub fn reset(&mut self, center_x: f64, center_y: f64, heading: f64) {
        let heading = normalize_heading(heading);
        let center = Point2::new(center_x, center_y);

        self.state = VehicleState {
            rear_axle: rear_axle_from_center(&center, heading, &self.config.geometry),
            heading,
            steering_angle: 0.0,
            velocity: 0.0,
        };
        self.steer_controller.reset();
        self.trails.clear();

        debug!("vehicle reset to ({center_x}, {center_y}) heading {heading}");
    }

    pub fn clear_trails(&mut self) {
        self.trails.clear();
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn geometry(&self) -> &VehicleGeometry {
        &self.config.geometry
    }

    pub fn config(&self) -> &VehicleModelInit {
        &self.config
    }

    pub fn rear_axle(&self) -> Point2<f64> {
        self.state.rear_axle
    }

    pub fn front_axle(&self) -> Point2<f64> {
        frame::advance(
            &self.state.rear_axle,
            self.state.heading,
            self.config.geometry.wheelbase,
        )
    }

    /// Visual center of the body, the point a renderer rotates around.
    pub fn center(&self) -> Point2<f64> {
        frame::advance(
            &self.state.rear_axle,
            self.state.heading,
            self.config.geometry.center_offset(),
        )
    }

    pub fn heading(&self) -> f64 {
        self.state.heading
    }

    pub fn steering_angle(&self) -> f64 {
        self.state.steering_angle
    }

    /// Current steering angle as a fraction of full lock, in `[-1, 1]`.
    pub fn steer_ratio(&self) -> f64 {
        self.steer_controller.steer_ratio()
    }

    pub fn velocity(&self) -> f64 {
        self.state.velocity
    }

    pub fn is_moving(&self) -> bool {
        self.state.velocity.abs() >= MOVING_SPEED_EPSILON
    }

    /// Signed radius of the rear axle's arc; positive when turning right.
    /// `None` while driving straight.
    pub fn turning_radius(&self) -> Option<f64> {
        let steering_angle = self.state.steering_angle;
        (steering_angle.abs() > STRAIGHT_STEERING_EPSILON)
            .then(|| self.config.geometry.wheelbase / steering_angle.tan())
    }

    pub fn wheels(&self) -> [Wheel; 4] {
        let VehicleState {
            ref rear_axle,
            heading,
            steering_angle,
            ..
        } = self.state;
        frame::wheels(
            rear_axle,
            heading,
            steering_angle,
            &self.config.geometry,
            self.config.wheel_inset,
        )
    }

    pub fn corners(&self) -> [Point2<f64>; 4] {
        frame::corners(&self.state.rear_axle, self.state.heading, &self.config.geometry)
    }

    pub fn trails(&self) -> &WheelTrails {
        &self.trails
    }
}

fn rear_axle_from_center(
    center: &Point2<f64>,
    heading: f64,
    geometry: &VehicleGeometry,
) -> Point2<f64> {
    frame::advance(center, heading, -geometry.center_offset())
}

fn assert_valid_geometry(geometry: &VehicleGeometry) {
    if let Err(err) = geometry.validate() {
        panic!("invalid vehicle geometry: {err}");
    }
    if geometry.front_axle_outside_body() {
        warn!(
            "wheelbase {} reaches past the front bumper ({} ahead of the rear axle)",
            geometry.wheelbase,
            geometry.front_distance()
        );
    }
}

fn sanitize_time_step(dt: f64) -> f64 {
    match R64::try_new(dt) {
        Some(dt) if dt.raw() >= 0.0 => dt.raw(),
        _ => {
            debug_assert!(false, "time step must be finite and non-negative, got {dt}");
            warn!("ignoring invalid time step {dt}");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::{Movement, SteeringPosition},
        frame::WheelPosition,
        geometry::Preset,
    };
    use std::f64::consts::{FRAC_PI_2, PI};

    const DT: f64 = 1.0 / 60.0;
    const EPS: f64 = 1e-9;

    fn forward(steering: SteeringPosition) -> Command {
        Command::new(Movement::Forward, steering)
    }

    #[test]
    fn heading_wraps_into_range() {
        assert!((normalize_heading(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < EPS);
        assert!((normalize_heading(5.0 * PI) - PI).abs() < EPS);
        assert_eq!(normalize_heading(TAU), 0.0);
        assert_eq!(normalize_heading(-1e-20), 0.0);
        assert_eq!(normalize_heading(0.0), 0.0);
    }

    #[test]
    fn construction_places_rear_axle_behind_center() {
        let model = VehicleModel::new(100.0, 100.0, 0.0, Preset::SmallCar.geometry());
        assert!((model.rear_axle().x - 60.0).abs() < EPS);
        assert!((model.rear_axle().y - 100.0).abs() < EPS);
        assert!((model.front_axle().x - 140.0).abs() < EPS);

        let model = VehicleModel::new(0.0, 0.0, FRAC_PI_2, Preset::SmallCar.geometry());
        assert!(model.rear_axle().x.abs() < EPS);
        assert!((model.rear_axle().y + 40.0).abs() < EPS);
        assert!((model.center() - Point2::new(0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn idle_tick_keeps_pose() {
        let mut model = VehicleModel::new(10.0, 20.0, 1.0, Preset::Suv.geometry());
        let before = *model.state();
        model.update(DT, Command::IDLE);
        assert_eq!(*model.state(), before);
        assert!(!model.is_moving());
        assert!(model.trails().is_empty());
    }

    #[test]
    fn parked_car_still_turns_its_wheels() {
        let mut model = VehicleModel::new(0.0, 0.0, 0.0, Preset::SmallCar.geometry());
        model.update(DT, Command::new(Movement::Stopped, SteeringPosition::HardLeft));
        assert!((model.steering_angle() + 5.0 * DT).abs() < EPS);
        assert_eq!(model.heading(), 0.0);
        assert!((model.center() - Point2::new(0.0, 0.0)).norm() < EPS);
        assert!(model.trails().is_empty());
    }

    #[test]
    fn reverse_drives_backwards() {
        let mut model = VehicleModel::new(0.0, 0.0, 0.0, Preset::SmallCar.geometry());
        model.update(0.5, Command::new(Movement::Reverse, SteeringPosition::Straight));
        assert!((model.velocity() + 60.0).abs() < EPS);
        assert!((model.center().x + 30.0).abs() < EPS);
        assert_eq!(model.trails().len(), 1);
    }

    #[test]
    fn turning_radius_follows_steering() {
        let mut model = VehicleModel::new(0.0, 0.0, 0.0, Preset::SmallCar.geometry());
        assert_eq!(model.turning_radius(), None);
        for _ in 0..30 {
            model.update(DT, forward(SteeringPosition::HardRight));
        }
        let radius = model.turning_radius().unwrap();
        assert!((radius - 80.0).abs() < 1e-6);

        for _ in 0..60 {
            model.update(DT, forward(SteeringPosition::HardLeft));
        }
        assert!((model.turning_radius().unwrap() + 80.0).abs() < 1e-6);
    }

    #[test]
    fn reset_restores_pose_and_clears_trails() {
        let mut model = VehicleModel::new(0.0, 0.0, 0.0, Preset::Van.geometry());
        for _ in 0..20 {
            model.update(DT, forward(SteeringPosition::HalfRight));
        }
        assert_eq!(model.trails().len(), 20);

        model.reset(50.0, -25.0, 2.0);
        let center = model.center();
        assert!((center.x - 50.0).abs() < EPS);
        assert!((center.y + 25.0).abs() < EPS);
        assert!((model.heading() - 2.0).abs() < EPS);
        assert_eq!(model.steering_angle(), 0.0);
        assert_eq!(model.velocity(), 0.0);
        assert!(model.trails().is_empty());

        // steering restarts from straight
        model.update(DT, Command::IDLE);
        assert_eq!(model.steering_angle(), 0.0);
    }

    #[test]
    fn geometry_swap_keeps_center() {
        let mut model = VehicleModel::new(100.0, 100.0, 0.5, Preset::SmallCar.geometry());
        for _ in 0..30 {
            model.update(DT, forward(SteeringPosition::HardRight));
        }
        let center = model.center();
        let heading = model.heading();

        model.set_geometry(Preset::Van.geometry());
        assert!((model.center() - center).norm() < EPS);
        assert_eq!(model.heading(), heading);
        assert!(model.steering_angle() <= Preset::Van.geometry().max_steering_angle + EPS);
        assert!(model.velocity().abs() <= Preset::Van.geometry().speed);
        assert!(model.trails().is_empty());
        assert_eq!(*model.geometry(), Preset::Van.geometry());
    }

    #[test]
    fn geometry_swap_can_keep_trails() {
        let init = VehicleModelInit {
            trail: TrailConfig {
                clear_on_geometry_swap: false,
                ..TrailConfig::default()
            },
            ..VehicleModelInit::default()
        };
        let mut model = init.build(Point2::new(0.0, 0.0), 0.0);
        for _ in 0..5 {
            model.update(DT, forward(SteeringPosition::Straight));
        }
        model.set_geometry(Preset::Suv.geometry());
        assert_eq!(model.trails().len(), 5);

        model.set_clear_trails_on_geometry_swap(true);
        model.set_geometry(Preset::SmallCar.geometry());
        assert!(model.trails().is_empty());
    }

    #[test]
    fn bounded_trails() {
        let init = VehicleModelInit {
            trail: TrailConfig {
                capacity: Some(10),
                ..TrailConfig::default()
            },
            ..VehicleModelInit::default()
        };
        let mut model = init.build(Point2::new(0.0, 0.0), 0.0);
        for _ in 0..50 {
            model.update(DT, forward(SteeringPosition::HalfLeft));
        }
        assert_eq!(model.trails().len(), 10);
        assert_eq!(model.trails().get(WheelPosition::FrontLeft).len(), 10);

        model.clear_trails();
        assert!(model.trails().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_and_state_serialize() {
        let init = VehicleModelInit::from_geometry(Preset::Suv.geometry());
        let json = serde_json::to_string(&init).unwrap();
        let parsed: VehicleModelInit = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, init);

        let model = parsed.build(Point2::new(1.0, 2.0), 0.25);
        let json = serde_json::to_value(model.state()).unwrap();
        assert_eq!(json["heading"], 0.25);
        assert_eq!(
            serde_json::to_string(&Preset::SmallCar).unwrap(),
            "\"small-car\""
        );
    }

    #[test]
    fn steer_ratio_tracks_lock() {
        let mut model = VehicleModel::new(0.0, 0.0, 0.0, Preset::SmallCar.geometry());
        assert_eq!(model.steer_ratio(), 0.0);
        for _ in 0..30 {
            model.update(DT, Command::new(Movement::Stopped, SteeringPosition::HalfLeft));
        }
        assert!((model.steer_ratio() + 0.5).abs() < EPS);
        for _ in 0..30 {
            model.update(DT, forward(SteeringPosition::HardRight));
        }
        assert!((model.steer_ratio() - 1.0).abs() < EPS);
    }

    #[test]
    #[should_panic(expected = "wheel inset")]
    fn rejects_inset_past_body_center() {
        let init = VehicleModelInit {
            wheel_inset: 30.0,
            ..VehicleModelInit::default()
        };
        init.build(Point2::new(0.0, 0.0), 0.0);
    }

    #[test]
    #[should_panic(expected = "wheel inset")]
    fn rejects_narrow_swap_for_inset() {
        let mut model = VehicleModel::new(0.0, 0.0, 0.0, Preset::SmallCar.geometry());
        model.set_geometry(VehicleGeometry {
            width: 8.0,
            ..Preset::SmallCar.geometry()
        });
    }

    #[test]
    #[should_panic(expected = "invalid vehicle geometry")]
    fn rejects_invalid_geometry() {
        let geometry = VehicleGeometry {
            wheelbase: 200.0,
            ..Preset::SmallCar.geometry()
        };
        VehicleModel::new(0.0, 0.0, 0.0, geometry);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "time step must be finite")]
    fn non_finite_time_step_is_fatal_in_debug() {
        let mut model = VehicleModel::new(0.0, 0.0, 0.0, Preset::SmallCar.geometry());
        model.update(f64::NAN, forward(SteeringPosition::Straight));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn non_finite_time_step_is_ignored_in_release() {
        let mut model = VehicleModel::new(0.0, 0.0, 0.0, Preset::SmallCar.geometry());
        let before = model.center();
        model.update(f64::INFINITY, forward(SteeringPosition::HardLeft));
        model.update(-1.0, forward(SteeringPosition::HardLeft));
        assert_eq!(model.center(), before);
        assert_eq!(model.steering_angle(), 0.0);
    }
}
