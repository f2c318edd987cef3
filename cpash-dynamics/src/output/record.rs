use crate::c64;
use crate::output::RestartOutput;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use std::io;

/// Snapshot of the trajectory after a completed step
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StepRecord {
    /// trajectory step, -1 is the initial condition
    pub step: isize,
    pub active_state: usize,
    pub probabilities: Array1<f64>,
    pub cumulative: Array1<f64>,
    pub random_number: f64,
    pub populations: Array1<f64>,
    /// upper triangle of the density matrix, row by row
    pub coherences: Vec<c64>,
    pub coefficients: Array1<c64>,
    pub energies: Array1<f64>,
    pub nacme: Array2<f64>,
    pub dotpopnac: Array1<f64>,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
    /// temperature in Kelvin
    pub temperature: f64,
    /// trace of the density matrix
    pub norm: f64,
    /// positions in bohr
    pub positions: Array2<f64>,
    pub velocities: Array2<f64>,
    pub events: Vec<String>,
}

/// Receiver of the trajectory output. Only [StepSink::write_step] is required, the
/// restart file and the final geometry are optional.
pub trait StepSink {
    fn write_step(&mut self, record: &StepRecord) -> io::Result<()>;

    fn write_restart(&mut self, _restart: &RestartOutput) -> io::Result<()> {
        Ok(())
    }

    fn finalize(&mut self, _record: &StepRecord) -> io::Result<()> {
        Ok(())
    }
}

/// Collects the records in memory
impl StepSink for Vec<StepRecord> {
    fn write_step(&mut self, record: &StepRecord) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}
