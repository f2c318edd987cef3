// config file
pub const CONFIG_FILE_NAME: &str = "dynamics.toml";
// restart file, written to the output directory after every step
pub const RESTART_FILE_NAME: &str = "RESTART.yaml";
// print level
pub const VERBOSE: i8 = 0;
// number of nuclear steps
pub const NSTEP: usize = 1000;
// number of electronic steps per nuclear step
pub const NESTEP: usize = 20;
// nuclear stepsize, unit given by TIME_UNIT
pub const STEPSIZE: f64 = 0.5;
// "fs" or "au"
pub const TIME_UNIT: &str = "fs";
// number of electronic states
pub const NSTATES: usize = 2;
// initial running state
pub const INITIAL_STATE: usize = 0;
// primary representation of the electronic wavefunction: "density" or "coefficient"
pub const ELECTRONIC_OBJECT: &str = "density";
// electronic propagator
pub const PROPAGATOR: &str = "rk4";
// constant C (hartree) of the energy-based decoherence correction,
// see eqn. (17) of JCP 126, 134114 (2007)
pub const EDC_PARAMETER: f64 = 0.1;
// write populations and coherences also when propagating coefficients
pub const PRINT_DENSITY_MATRIX: bool = true;
// directory that holds the QM.<step>.npz and RP.<step>.npz records
pub const DATA_DIRECTORY: &str = "./Data";
// file index of step 0 of the trajectory
pub const INDEX_START: isize = 0;
pub const OUTPUT_DIRECTORY: &str = "./md";
pub const OUTPUT_FREQUENCY: usize = 1;
