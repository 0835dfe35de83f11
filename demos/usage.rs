use ackermann_kinematics::{
    Command, Movement, Preset, SteeringPosition, TrailConfig, VehicleModelInit,
};
use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use nalgebra::Point2;
use rand::prelude::*;

#[derive(Parser)]
struct Opts {
    /// Vehicle profile: small-car, suv or van
    #[clap(long, default_value = "small-car")]
    pub preset: Preset,
    #[clap(long, default_value = "5.0")]
    pub seconds: f64,
    #[clap(long, default_value = "60.0")]
    pub fps: f64,
    /// -1, 0 or 1
    #[clap(long, default_value = "1", allow_hyphen_values = true)]
    pub movement: f64,
    /// -1, -0.5, 0, 0.5 or 1
    #[clap(long, default_value = "0.5", allow_hyphen_values = true)]
    pub steering: f64,
    /// Pick a random command every half second instead
    #[clap(long)]
    pub random: bool,
    #[clap(long, default_value = "0")]
    pub seed: u64,
    /// Keep only the newest N trail points per wheel
    #[clap(long)]
    pub trail_capacity: Option<usize>,
}

// Frame hitches never integrate more than this at once.
const MAX_FRAME_SECS: f64 = 0.1;

fn main() -> Result<()> {
    env_logger::init();

    let Opts {
        preset,
        seconds,
        fps,
        movement,
        steering,
        random,
        seed,
        trail_capacity,
    } = Opts::parse();

    if !(fps > 0.0) || !(seconds >= 0.0) {
        bail!("fps must be positive and seconds non-negative");
    }
    let Some(fixed_command) = Command::from_values(movement, steering) else {
        bail!("unsupported command movement={movement} steering={steering}");
    };

    let geometry = preset.geometry();
    geometry.validate()?;

    // Create a car parked at the origin
    let init = VehicleModelInit {
        trail: TrailConfig {
            capacity: trail_capacity,
            ..TrailConfig::default()
        },
        ..VehicleModelInit::from_geometry(geometry)
    };
    let mut model = init.build(Point2::new(0.0, 0.0), 0.0);
    let start = model.center();

    let mut rng = StdRng::seed_from_u64(seed);
    let dt = (1.0 / fps).min(MAX_FRAME_SECS);
    let frames = (seconds / dt).round() as usize;
    let frames_per_command = ((0.5 / dt).round() as usize).max(1);
    let mut command = fixed_command;

    info!("driving a {preset} for {frames} frames at dt={dt:.4}");

    for frame in 0..frames {
        if random && frame % frames_per_command == 0 {
            command = Command::new(
                *[Movement::Reverse, Movement::Stopped, Movement::Forward]
                    .choose(&mut rng)
                    .unwrap_or(&Movement::Stopped),
                *SteeringPosition::ALL
                    .choose(&mut rng)
                    .unwrap_or(&SteeringPosition::Straight),
            );
            info!("frame {frame}: {command:?}");
        }

        model.update(dt, command);
    }

    let center = model.center();
    println!("preset          {preset}");
    println!("start center    ({:.2}, {:.2})", start.x, start.y);
    println!("final center    ({:.2}, {:.2})", center.x, center.y);
    println!("heading         {:.4} rad", model.heading());
    println!("steering angle  {:.4} rad", model.steering_angle());
    match model.turning_radius() {
        Some(radius) => println!("turning radius  {radius:.2}"),
        None => println!("turning radius  straight"),
    }
    for (position, track) in model.trails().iter() {
        let name = format!("{position:?}");
        println!("{name:<15} {} trail points", track.len());
    }

    Ok(())
}
