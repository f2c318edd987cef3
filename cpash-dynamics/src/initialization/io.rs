use crate::c64;
use crate::constants;
use crate::defaults::*;
use crate::dynamics::decoherence::DecoherenceScheme;
use crate::errors::ConfigError;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_nstep() -> usize {
    NSTEP
}
fn default_nestep() -> usize {
    NESTEP
}
fn default_stepsize() -> f64 {
    STEPSIZE
}
fn default_time_unit() -> String {
    String::from(TIME_UNIT)
}
fn default_nstates() -> usize {
    NSTATES
}
fn default_initial_state() -> usize {
    INITIAL_STATE
}
fn default_electronic_object() -> String {
    String::from(ELECTRONIC_OBJECT)
}
fn default_propagator() -> String {
    String::from(PROPAGATOR)
}
fn default_edc_parameter() -> f64 {
    EDC_PARAMETER
}
fn default_print_density_matrix() -> bool {
    PRINT_DENSITY_MATRIX
}
fn default_data_directory() -> String {
    String::from(DATA_DIRECTORY)
}
fn default_index_start() -> isize {
    INDEX_START
}
fn default_output_directory() -> String {
    String::from(OUTPUT_DIRECTORY)
}
fn default_output_frequency() -> usize {
    OUTPUT_FREQUENCY
}
fn default_verbose() -> i8 {
    VERBOSE
}

/// Struct that loads the configuration of the dynamics from the file "dynamics.toml".
/// Every option has a default, an empty file yields a complete configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DynamicConfiguration {
    #[serde(default = "default_nstep")]
    pub nstep: usize,
    #[serde(default = "default_nestep")]
    pub nestep: usize,
    #[serde(default = "default_stepsize")]
    pub stepsize: f64,
    #[serde(default = "default_time_unit")]
    pub time_unit: String,
    #[serde(default = "default_nstates")]
    pub nstates: usize,
    #[serde(default = "default_initial_state")]
    pub initial_state: usize,
    /// real and imaginary part of the initial coefficient of every state
    #[serde(default)]
    pub initial_coefficients: Option<Vec<[f64; 2]>>,
    #[serde(default = "default_electronic_object")]
    pub electronic_object: String,
    #[serde(default = "default_propagator")]
    pub propagator: String,
    #[serde(default)]
    pub decoherence_correction: Option<String>,
    #[serde(default = "default_edc_parameter")]
    pub edc_parameter: f64,
    #[serde(default = "default_print_density_matrix")]
    pub print_density_matrix: bool,
    #[serde(default = "default_data_directory")]
    pub data_directory: String,
    #[serde(default = "default_index_start")]
    pub index_start: isize,
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    #[serde(default = "default_output_frequency")]
    pub output_frequency: usize,
    #[serde(default)]
    pub restart: Option<String>,
    #[serde(default)]
    pub random_seed: Option<u64>,
    #[serde(default = "default_verbose")]
    pub verbose: i8,
}

impl Default for DynamicConfiguration {
    fn default() -> Self {
        Self {
            nstep: NSTEP,
            nestep: NESTEP,
            stepsize: STEPSIZE,
            time_unit: default_time_unit(),
            nstates: NSTATES,
            initial_state: INITIAL_STATE,
            initial_coefficients: None,
            electronic_object: default_electronic_object(),
            propagator: default_propagator(),
            decoherence_correction: None,
            edc_parameter: EDC_PARAMETER,
            print_density_matrix: PRINT_DENSITY_MATRIX,
            data_directory: default_data_directory(),
            index_start: INDEX_START,
            output_directory: default_output_directory(),
            output_frequency: OUTPUT_FREQUENCY,
            restart: None,
            random_seed: None,
            verbose: VERBOSE,
        }
    }
}

/// Primary representation of the electronic wavefunction
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElectronicObject {
    Coefficient,
    Density,
}

impl ElectronicObject {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectronicObject::Coefficient => "coefficient",
            ElectronicObject::Density => "density",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Femtosecond,
    AtomicUnit,
}

impl TimeUnit {
    /// Convert a time given in this unit to atomic units
    pub fn to_au(&self, time: f64) -> f64 {
        match self {
            TimeUnit::Femtosecond => time * constants::FS_TO_AU,
            TimeUnit::AtomicUnit => time,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropagatorKind {
    RungeKutta4,
}

/// Controls where the step numbering of a restarted trajectory begins.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RestartMode {
    /// Rewrite the output from the initial step on, keeping the electronic state.
    Write,
    /// Continue after the last completed step and append to the output.
    Append,
}

/// Validated settings of a trajectory. Created once from the [DynamicConfiguration].
#[derive(Clone, Debug)]
pub struct DynamicSettings {
    pub nstep: usize,
    pub nestep: usize,
    /// nuclear time step in atomic units
    pub dt: f64,
    pub nstates: usize,
    pub initial_state: usize,
    pub initial_coefficients: Option<Array1<c64>>,
    pub electronic_object: ElectronicObject,
    pub propagator: PropagatorKind,
    pub decoherence: DecoherenceScheme,
    pub print_density_matrix: bool,
    pub data_directory: PathBuf,
    pub index_start: isize,
    pub output_directory: PathBuf,
    pub output_frequency: usize,
    pub restart: Option<RestartMode>,
    pub random_seed: Option<u64>,
    pub verbose: i8,
}

impl DynamicConfiguration {
    /// Check all options and resolve the string options to their typed variants.
    pub fn validate(&self) -> Result<DynamicSettings, ConfigError> {
        if self.nstates == 0 {
            return Err(ConfigError::InvalidValue {
                name: "nstates",
                reason: String::from("at least one electronic state is required"),
            });
        }
        if self.initial_state >= self.nstates {
            return Err(ConfigError::InitialStateOutOfRange {
                initial_state: self.initial_state,
                nstates: self.nstates,
            });
        }
        if !(self.stepsize > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "stepsize",
                reason: format!("{} is not positive", self.stepsize),
            });
        }
        if self.nestep == 0 {
            return Err(ConfigError::InvalidValue {
                name: "nestep",
                reason: String::from("at least one electronic step is required"),
            });
        }
        if self.output_frequency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "output_frequency",
                reason: String::from("must be at least 1"),
            });
        }

        let time_unit: TimeUnit = match self.time_unit.to_lowercase().as_str() {
            "fs" => TimeUnit::Femtosecond,
            "au" => TimeUnit::AtomicUnit,
            _ => return Err(ConfigError::InvalidTimeUnit(self.time_unit.clone())),
        };
        let electronic_object: ElectronicObject =
            match self.electronic_object.to_lowercase().as_str() {
                "coefficient" => ElectronicObject::Coefficient,
                "density" => ElectronicObject::Density,
                _ => {
                    return Err(ConfigError::InvalidElectronicObject(
                        self.electronic_object.clone(),
                    ))
                }
            };
        let propagator: PropagatorKind = match self.propagator.to_lowercase().as_str() {
            "rk4" => PropagatorKind::RungeKutta4,
            _ => return Err(ConfigError::InvalidPropagator(self.propagator.clone())),
        };
        let restart: Option<RestartMode> = match self.restart.as_deref() {
            None => None,
            Some(mode) => match mode.to_lowercase().as_str() {
                "write" => Some(RestartMode::Write),
                "append" => Some(RestartMode::Append),
                _ => return Err(ConfigError::InvalidRestart(mode.to_string())),
            },
        };
        let decoherence: DecoherenceScheme = DecoherenceScheme::from_input(
            self.decoherence_correction.as_deref(),
            self.edc_parameter,
        )?;

        let initial_coefficients: Option<Array1<c64>> = match &self.initial_coefficients {
            None => None,
            Some(coefficients) => Some(self.check_initial_coefficients(coefficients)?),
        };

        Ok(DynamicSettings {
            nstep: self.nstep,
            nestep: self.nestep,
            dt: time_unit.to_au(self.stepsize),
            nstates: self.nstates,
            initial_state: self.initial_state,
            initial_coefficients,
            electronic_object,
            propagator,
            decoherence,
            print_density_matrix: self.print_density_matrix,
            data_directory: PathBuf::from(&self.data_directory),
            index_start: self.index_start,
            output_directory: PathBuf::from(&self.output_directory),
            output_frequency: self.output_frequency,
            restart,
            random_seed: self.random_seed,
            verbose: self.verbose,
        })
    }

    fn check_initial_coefficients(&self, input: &[[f64; 2]]) -> Result<Array1<c64>, ConfigError> {
        if input.len() != self.nstates {
            return Err(ConfigError::InvalidCoefficients(format!(
                "{} coefficients given for {} states",
                input.len(),
                self.nstates
            )));
        }
        let coefficients: Array1<c64> = input.iter().map(|c| c64::new(c[0], c[1])).collect();
        let norm: f64 = coefficients.iter().map(|c| c.norm_sqr()).sum();
        if (norm - 1.0).abs() > 1.0e-6 {
            return Err(ConfigError::InvalidCoefficients(format!(
                "norm of the coefficients is {:.8}",
                norm
            )));
        }
        Ok(coefficients)
    }
}
