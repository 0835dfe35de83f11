use std::{error::Error, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable dimensions and limits of one car.
///
/// Lengths share whatever unit the caller draws in; the presets use
/// pixels. `rear_overhang` is measured from the rear axle to the back
/// bumper.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleGeometry {
    pub length: f64,
    pub width: f64,
    pub wheelbase: f64,
    pub max_steering_angle: f64,
    pub speed: f64,
    pub rear_overhang: f64,
}

impl VehicleGeometry {
    pub fn validate(&self) -> Result<(), InvalidGeometry> {
        let Self {
            length,
            width,
            wheelbase,
            max_steering_angle,
            speed,
            rear_overhang,
        } = *self;

        let positive = [
            ("length", length),
            ("width", width),
            ("wheelbase", wheelbase),
            ("max_steering_angle", max_steering_angle),
            ("speed", speed),
        ];
        let non_negative = [("rear_overhang", rear_overhang)];

        let mut all = positive.iter().chain(non_negative.iter());
        if let Some(&(field, _)) = all.find(|(_, value)| !value.is_finite()) {
            return Err(InvalidGeometry::NonFinite { field });
        }
        if let Some(&(field, value)) = positive.iter().find(|(_, value)| *value <= 0.0) {
            return Err(InvalidGeometry::NonPositive { field, value });
        }
        if let Some(&(field, value)) = non_negative.iter().find(|(_, value)| *value < 0.0) {
            return Err(InvalidGeometry::NonPositive { field, value });
        }
        if wheelbase >= length {
            return Err(InvalidGeometry::WheelbaseTooLong { wheelbase, length });
        }
        if rear_overhang >= length {
            return Err(InvalidGeometry::OverhangTooLong {
                rear_overhang,
                length,
            });
        }

        Ok(())
    }

    /// Whether the front axle ends up ahead of the front bumper. Such a
    /// profile still drives; it only looks odd when drawn.
    pub fn front_axle_outside_body(&self) -> bool {
        self.wheelbase > self.front_distance()
    }

    /// Distance from the rear axle forward to the visual center of the body.
    pub fn center_offset(&self) -> f64 {
        self.length / 2.0 - self.rear_overhang
    }

    /// Distance from the rear axle forward to the front bumper.
    pub fn front_distance(&self) -> f64 {
        self.length - self.rear_overhang
    }

    /// Radius traced by the rear axle at full lock.
    pub fn min_turning_radius(&self) -> f64 {
        self.wheelbase / self.max_steering_angle.tan()
    }
}

impl Default for VehicleGeometry {
    fn default() -> Self {
        Preset::SmallCar.geometry()
    }
}

/// Named geometry profiles offered by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Preset {
    SmallCar,
    Suv,
    Van,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::SmallCar, Preset::Suv, Preset::Van];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::SmallCar => "small-car",
            Preset::Suv => "suv",
            Preset::Van => "van",
        }
    }

    pub fn geometry(&self) -> VehicleGeometry {
        match self {
            Preset::SmallCar => VehicleGeometry {
                length: 120.0,
                width: 60.0,
                wheelbase: 80.0,
                max_steering_angle: std::f64::consts::FRAC_PI_4,
                speed: 60.0,
                rear_overhang: 20.0,
            },
            Preset::Suv => VehicleGeometry {
                length: 140.0,
                width: 70.0,
                wheelbase: 95.0,
                max_steering_angle: 0.6,
                speed: 55.0,
                rear_overhang: 22.0,
            },
            Preset::Van => VehicleGeometry {
                length: 170.0,
                width: 75.0,
                wheelbase: 115.0,
                max_steering_angle: 0.55,
                speed: 50.0,
                rear_overhang: 25.0,
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Preset::ALL
            .into_iter()
            .find(|preset| {
                preset.name() == normalized || preset.name().replace('-', "") == normalized
            })
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPreset(pub String);

impl fmt::Display for UnknownPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown vehicle preset '{}', expected one of small-car, suv, van",
            self.0
        )
    }
}

impl Error for UnknownPreset {}

#[derive(Debug, Clone, PartialEq)]
pub enum InvalidGeometry {
    NonFinite {
        field: &'static str,
    },
    NonPositive {
        field: &'static str,
        value: f64,
    },
    WheelbaseTooLong {
        wheelbase: f64,
        length: f64,
    },
    OverhangTooLong {
        rear_overhang: f64,
        length: f64,
    },
}

impl fmt::Display for InvalidGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            InvalidGeometry::NonFinite { field } => write!(f, "{field} is not finite"),
            InvalidGeometry::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            InvalidGeometry::WheelbaseTooLong { wheelbase, length } => write!(
                f,
                "wheelbase {wheelbase} must be shorter than body length {length}"
            ),
            InvalidGeometry::OverhangTooLong {
                rear_overhang,
                length,
            } => write!(
                f,
                "rear overhang {rear_overhang} must be shorter than body length {length}"
            ),
        }
    }
}

impl Error for InvalidGeometry {}
