use crate::errors::DataError;
pub use ndarray::prelude::*;

/// Electronic structure data of a single step of the frozen path
#[derive(Clone, Debug)]
pub struct ElectronicRecord {
    /// adiabatic energies of all states
    pub energies: Array1<f64>,
    /// forces acting on the nuclei, shape (n_atoms, 3)
    pub forces: Array2<f64>,
    /// nonadiabatic coupling matrix elements, antisymmetric
    pub nacme: Array2<f64>,
}

/// Nuclear positions and velocities of a single step of the frozen path
#[derive(Clone, Debug)]
pub struct NuclearRecord {
    pub positions: Array2<f64>,
    pub velocities: Array2<f64>,
}

/// Trait that provides the precomputed nuclear trajectory.
/// The records are indexed by the trajectory step, where step -1 is the
/// initial condition. A missing or unreadable record halts the trajectory.
pub trait FrozenPathSource {
    fn electronic_record(&mut self, step: isize) -> Result<ElectronicRecord, DataError>;

    fn nuclear_record(&mut self, step: isize) -> Result<NuclearRecord, DataError>;
}

/// A frozen path that is completely held in memory. The first entry
/// belongs to `first_step`.
pub struct PreloadedPath {
    pub first_step: isize,
    pub electronic: Vec<ElectronicRecord>,
    pub nuclear: Vec<NuclearRecord>,
}

impl PreloadedPath {
    pub fn new(
        first_step: isize,
        electronic: Vec<ElectronicRecord>,
        nuclear: Vec<NuclearRecord>,
    ) -> Self {
        Self {
            first_step,
            electronic,
            nuclear,
        }
    }

    fn index(&self, step: isize) -> Option<usize> {
        usize::try_from(step - self.first_step).ok()
    }
}

impl FrozenPathSource for PreloadedPath {
    fn electronic_record(&mut self, step: isize) -> Result<ElectronicRecord, DataError> {
        self.index(step)
            .and_then(|idx| self.electronic.get(idx))
            .cloned()
            .ok_or(DataError::Missing {
                kind: "electronic",
                step,
                path: "memory".into(),
            })
    }

    fn nuclear_record(&mut self, step: isize) -> Result<NuclearRecord, DataError> {
        self.index(step)
            .and_then(|idx| self.nuclear.get(idx))
            .cloned()
            .ok_or(DataError::Missing {
                kind: "nuclear",
                step,
                path: "memory".into(),
            })
    }
}
