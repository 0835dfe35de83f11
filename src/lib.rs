pub mod command;
pub mod constants;
pub mod frame;
pub mod geometry;
pub mod steer_control;
pub mod trail;
pub mod vehicle_model;

pub use command::{Command, Movement, SteeringPosition};
pub use frame::{Wheel, WheelPosition};
pub use geometry::{InvalidGeometry, Preset, VehicleGeometry};
pub use trail::{TrailConfig, WheelTrails};
pub use vehicle_model::{normalize_heading, VehicleModel, VehicleModelInit, VehicleState};
