use std::path::PathBuf;
use thiserror::Error;

/// Errors in the dynamics input. All of them are detected before the first step.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid decoherence correction in FSSH method: {0}")]
    InvalidDecoherence(String),
    #[error("Index for initial state must be smaller than number of states: {initial_state} >= {nstates}")]
    InitialStateOutOfRange { initial_state: usize, nstates: usize },
    #[error("Invalid electronic object: {0}")]
    InvalidElectronicObject(String),
    #[error("Invalid unit for time step: {0}")]
    InvalidTimeUnit(String),
    #[error("Invalid electronic propagator: {0}")]
    InvalidPropagator(String),
    #[error("Invalid restart option: {0}")]
    InvalidRestart(String),
    #[error("Invalid initial coefficients: {0}")]
    InvalidCoefficients(String),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
    #[error("Unknown element symbol: {0}")]
    UnknownElement(String),
}

/// A record of the frozen nuclear path could not be provided.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Missing {kind} record for step {step}: {path}")]
    Missing {
        kind: &'static str,
        step: isize,
        path: PathBuf,
    },
    #[error("Corrupt {kind} record for step {step}: {reason}")]
    Corrupt {
        kind: &'static str,
        step: isize,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum DynamicsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Unable to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Restart file error: {0}")]
    Restart(String),
}
