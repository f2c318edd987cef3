use crate::constants;
use crate::initialization::{DynamicSettings, RestartMode};
use crate::output::StepRecord;
use log::{debug, info, warn};

pub fn print_dynamics_settings(settings: &DynamicSettings) {
    info!("{:^118}", "Surface Hopping Dynamics along a frozen nuclear path");
    info!("{:-^118}", "");
    info!("  {:<25}= {:>16}", "Number of states", settings.nstates);
    info!("  {:<25}= {:>16}", "Initial state", settings.initial_state);
    info!(
        "  {:<25}= {:>16.6} fs",
        "Time interval",
        settings.dt / constants::FS_TO_AU
    );
    info!("  {:<25}= {:>16}", "Nuclear steps", settings.nstep);
    info!("  {:<25}= {:>16}", "Electronic steps", settings.nestep);
    info!(
        "  {:<25}= {:>16}",
        "Electronic object",
        settings.electronic_object.as_str()
    );
    info!(
        "  {:<25}= {:>16}",
        "Decoherence correction",
        settings.decoherence.name()
    );
    info!("  {:<25}= {:>16}", "Output frequency", settings.output_frequency);
    info!(
        "  {:<25}= {:>16}",
        "Frozen path data",
        settings.data_directory.display()
    );
    info!("  {:<25}= {:>16}", "Index of the first record", settings.index_start);
    match settings.restart {
        None => {}
        Some(RestartMode::Write) => info!("  Restart: electronic state restored, output rewritten"),
        Some(RestartMode::Append) => info!("  Restart: trajectory continued, output appended"),
    }
}

/// Print the column headers of the per step output
pub fn print_header_dynamics_step() {
    warn!("{:^118}", "");
    warn!("{:-^118}", "");
    warn!("{:>65}", "Start Dynamics");
    warn!("{:-^118}", "");
    info!(
        " #INFO{:>8}{:>7}{:>14}{:>15}{:>13}{:>17}{:>8}",
        "STEP", "State", "Kinetic(H)", "Potential(H)", "Total(H)", "Temperature(K)", "Norm."
    );
    debug!(" #DEBUG1{:>6}{:>11}{:>28}", "STEP", "Rand.", "Acc. Hopping Prob.");
}

/// Print the energies of the step, the random number, the cumulative probabilities
/// and the hop events.
pub fn print_step(record: &StepRecord) {
    let step: isize = record.step + 1;
    info!(
        " INFO{:>9}{:>5}{:16.8}{:15.8}{:15.8}{:13.6}{:11.5}",
        step,
        record.active_state,
        record.kinetic_energy,
        record.potential_energy,
        record.total_energy,
        record.temperature,
        record.norm
    );

    let nstates: usize = record.populations.len();
    let mut debug_line: String = format!(" DEBUG1{:>7}{:11.5}", step, record.random_number);
    for state in 0..nstates {
        debug_line.push_str(&format!(
            "{:12.5} ({}->{})",
            record.cumulative[state], record.active_state, state
        ));
    }
    debug!("{}", debug_line);

    for event in record.events.iter() {
        info!(" HOP{:>9}  {}", step, event);
    }
}

pub fn print_footer_dynamics(timing: f64) {
    warn!("{:-<118} ", "");
    warn!(
        "{:>106} {:>8.2} s",
        "Surface Hopping Dynamics finished in", timing
    );
}
