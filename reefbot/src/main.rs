use std::{path::PathBuf, process};

use clap::{Parser, ValueEnum};
use rio_command::{preferences::Preferences, robot::CompetitionMode, station::DriverStation};
use tracing_subscriber::EnvFilter;

use crate::robot::Robot;

mod autonomous;
mod commands;
mod constants;
mod hardware;
mod parameters;
mod robot;
mod subsystems;

#[derive(Parser, Debug)]
#[command(name = "reefbot", about = "Competition robot control program", long_about = None)]
struct Args {
    /// Run against simulated hardware
    #[arg(long)]
    sim: bool,

    /// Competition mode to start in (the station normally drives this)
    #[arg(long, value_enum, default_value_t = ModeArg::Disabled)]
    mode: ModeArg,

    /// Operator preferences file
    #[arg(long, default_value = "reefbot-prefs.toml")]
    prefs: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Disabled,
    Auto,
    Teleop,
}

impl From<ModeArg> for CompetitionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Disabled => CompetitionMode::Disabled,
            ModeArg::Auto => CompetitionMode::Autonomous,
            ModeArg::Teleop => CompetitionMode::Teleop,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run(Args::parse()) {
        tracing::error!(%err, "robot program stopped");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    rio_command::robot::set_simulation(args.sim);
    Preferences::load(&args.prefs)?;
    DriverStation::instance().set_mode(args.mode.into());

    ctrlc::set_handler(rio_command::robot::request_shutdown)?;

    let robot = Robot::new()?;
    rio_command::robot::start_robot(robot)?;

    // Persist any defaults recorded during the run.
    Preferences::save()?;
    Ok(())
}
