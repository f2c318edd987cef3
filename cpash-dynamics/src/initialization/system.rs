use crate::constants;
use crate::errors::ConfigError;
use chemfiles::{Atom, Frame};
use ndarray::prelude::*;

/// Struct that hold the data of the molecular system:
/// the element symbols, atomic numbers, the reference cartesian coordinates and the masses
#[derive(Clone, Debug)]
pub struct SystemData {
    pub n_atoms: usize,
    pub symbols: Vec<String>,
    pub atomic_numbers: Vec<u8>,
    /// reference geometry in bohr
    pub coordinates: Array2<f64>,
    /// atomic masses in atomic units
    pub masses: Array1<f64>,
}

impl SystemData {
    /// Number of nuclear degrees of freedom, translation and rotation removed
    pub fn degrees_of_freedom(&self) -> usize {
        match self.n_atoms {
            0 | 1 => 3,
            2 => 1,
            n => 3 * n - 6,
        }
    }

    fn from_atoms(atoms: Vec<Atom>, coordinates: Array2<f64>) -> Result<Self, ConfigError> {
        if coordinates.dim() != (atoms.len(), 3) {
            return Err(ConfigError::InvalidValue {
                name: "coordinates",
                reason: format!(
                    "shape {:?} does not match {} atoms",
                    coordinates.dim(),
                    atoms.len()
                ),
            });
        }
        // the element is resolved from the atom type, unknown types have the atomic number 0
        if let Some(atom) = atoms.iter().find(|atom| atom.atomic_number() == 0) {
            return Err(ConfigError::UnknownElement(atom.atomic_type()));
        }
        let masses: Array1<f64> = atoms
            .iter()
            .map(|atom| atom.mass() * constants::AMU_TO_AU)
            .collect();

        Ok(Self {
            n_atoms: atoms.len(),
            symbols: atoms.iter().map(|atom| atom.atomic_type()).collect(),
            atomic_numbers: atoms.iter().map(|atom| atom.atomic_number() as u8).collect(),
            coordinates,
            masses,
        })
    }
}

/// Extract the atoms and the positions (in bohr) from a [Frame](chemfiles::Frame)
pub fn frame_to_atoms(frame: &Frame) -> (Vec<Atom>, Array2<f64>) {
    let positions: &[[f64; 3]] = frame.positions();
    // transform the coordinates from angstrom to bohr
    let coordinates: Array2<f64> = Array2::from_shape_fn((frame.size(), 3), |(atom, xyz)| {
        positions[atom][xyz] / constants::BOHR_TO_ANGS
    });
    let atoms: Vec<Atom> = (0..frame.size())
        .map(|idx| (*frame.atom(idx)).clone())
        .collect();
    (atoms, coordinates)
}

impl TryFrom<(Vec<String>, Array2<f64>)> for SystemData {
    type Error = ConfigError;

    /// Creates the struct [SystemData] from the element symbols and the
    /// cartesian coordinates (bohr). Unknown elements are rejected.
    fn try_from(molecule: (Vec<String>, Array2<f64>)) -> Result<Self, Self::Error> {
        let (symbols, coordinates) = molecule;
        let atoms: Vec<Atom> = symbols
            .iter()
            .map(|symbol| Atom::new(symbol.as_str()))
            .collect();
        Self::from_atoms(atoms, coordinates)
    }
}

impl TryFrom<&Frame> for SystemData {
    type Error = ConfigError;

    /// Creates a new [SystemData] from a [Frame](chemfiles::Frame), the positions of the
    /// frame are given in angstrom.
    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        let (atoms, coordinates) = frame_to_atoms(frame);
        Self::from_atoms(atoms, coordinates)
    }
}

impl TryFrom<Frame> for SystemData {
    type Error = ConfigError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        Self::try_from(&frame)
    }
}
