use crate::dynamics::SampledTrajectory;
use crate::io::{read_input, write_footer, write_header};
use crate::utils::Timer;
use anyhow::Context;
use clap::{App, Arg};
use cpash_dynamics::dynamics::TrajectoryStatus;
use cpash_dynamics::initialization::restart::read_restart_parameters;
use cpash_dynamics::initialization::{
    DynamicConfiguration, DynamicSettings, Simulation, SystemData,
};
use cpash_dynamics::output::{
    print_dynamics_settings, print_footer_dynamics, restart_file_path, RestartOutput,
    TrajectoryWriter,
};
use env_logger::Builder;
use log::{error, info, LevelFilter};
use std::io::Write;

mod defaults;
mod dynamics;
mod io;
mod utils;

#[macro_use]
extern crate clap;

fn main() -> anyhow::Result<()> {
    // Input.
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .about("fewest-switches surface hopping along a frozen nuclear path")
        .arg(
            Arg::new("xyz-File")
                .help("Sets the xyz file to use")
                .required(true)
                .index(1),
        )
        .get_matches();
    // The file containing the cartesian coordinates is the only mandatory file to
    // start a trajectory.
    let geometry_file: &str = matches
        .value_of("xyz-File")
        .context("No geometry file was given")?;
    let (system, config): (SystemData, DynamicConfiguration) = read_input(geometry_file)?;
    let settings: DynamicSettings = config.validate()?;

    // Logging.
    // The log level is set.
    let log_level: LevelFilter = match settings.verbose {
        2 => LevelFilter::Trace,
        1 => LevelFilter::Debug,
        0 => LevelFilter::Info,
        -1 => LevelFilter::Warn,
        -2 => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    // and the logger is build.
    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, log_level)
        .init();

    // The program header is written to the command line.
    write_header();
    // and the total wall-time timer is started.
    let timer: Timer = Timer::start();
    print_dynamics_settings(&settings);

    let mut simulation: Simulation = Simulation::new(&system, settings.clone());
    if settings.restart.is_some() {
        let restart: RestartOutput =
            read_restart_parameters(&restart_file_path(&settings.output_directory))?;
        simulation.restore(&restart)?;
        info!("Electronic state restored from step {}", restart.step + 1);
    }

    let mut path: SampledTrajectory =
        SampledTrajectory::new(&settings.data_directory, settings.index_start);
    let mut writer: TrajectoryWriter = TrajectoryWriter::new(system.symbols.clone(), &settings)
        .with_context(|| {
            format!(
                "Unable to prepare the output directory {}",
                settings.output_directory.display()
            )
        })?;

    match simulation.surface_hopping_dynamics(&mut path, &mut writer)? {
        TrajectoryStatus::Completed => {}
        TrajectoryStatus::Halted { step, reason } => {
            error!("Trajectory halted at step {}: {}", step + 1, reason);
        }
    }
    print_footer_dynamics(timer.elapsed());

    // The total wall-time is printed.
    write_footer(timer);
    Ok(())
}
