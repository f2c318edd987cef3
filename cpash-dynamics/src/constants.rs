// one femtosecond in atomic units of time
pub const FS_TO_AU: f64 = 41.341374575751;
// hartree to kelvin
pub const AU_TO_K: f64 = 315774.64;
pub const BOHR_TO_ANGS: f64 = 0.529177210903;
// atomic mass unit in electron masses
pub const AMU_TO_AU: f64 = 1822.888486209;
// numerical zero for populations and kinetic energies
pub const EPS: f64 = 1.0e-12;
