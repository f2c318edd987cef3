use crate::defaults::*;
use cpash_dynamics::errors::DataError;
use cpash_dynamics::interface::{ElectronicRecord, FrozenPathSource, NuclearRecord};
use ndarray::prelude::*;
use ndarray_npy::NpzReader;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The frozen path as it is stored on disk. Step `t` of the trajectory is read from
/// `QM.<index_start + t>.npz` (energy, force, nacme) and `RP.<index_start + t>.npz`
/// (pos, vel) inside the data directory.
pub struct SampledTrajectory {
    data_directory: PathBuf,
    index_start: isize,
}

impl SampledTrajectory {
    pub fn new(data_directory: &Path, index_start: isize) -> Self {
        Self {
            data_directory: data_directory.to_path_buf(),
            index_start,
        }
    }

    pub fn file_path(&self, prefix: &str, step: isize) -> PathBuf {
        self.data_directory
            .join(format!("{}.{}.npz", prefix, self.index_start + step))
    }

    fn open(
        &self,
        prefix: &str,
        kind: &'static str,
        step: isize,
    ) -> Result<NpzReader<File>, DataError> {
        let path: PathBuf = self.file_path(prefix, step);
        let file: File = match File::open(&path) {
            Ok(file) => file,
            Err(_) => return Err(DataError::Missing { kind, step, path }),
        };
        NpzReader::new(file).map_err(|err| DataError::Corrupt {
            kind,
            step,
            reason: err.to_string(),
        })
    }
}

/// Read a single array from the archive. Archives written by numpy store the
/// arrays with the extension .npy, both names are accepted.
fn read_array<D: Dimension>(
    npz: &mut NpzReader<File>,
    name: &str,
    kind: &'static str,
    step: isize,
) -> Result<Array<f64, D>, DataError> {
    let corrupt = |reason: String| DataError::Corrupt { kind, step, reason };

    let names: Vec<String> = npz.names().map_err(|err| corrupt(err.to_string()))?;
    let entry: &String = names
        .iter()
        .find(|entry| entry.as_str() == name || entry.strip_suffix(".npy") == Some(name))
        .ok_or_else(|| corrupt(format!("array '{}' is missing", name)))?;
    npz.by_name(entry)
        .map_err(|err| corrupt(format!("array '{}': {}", name, err)))
}

impl FrozenPathSource for SampledTrajectory {
    fn electronic_record(&mut self, step: isize) -> Result<ElectronicRecord, DataError> {
        let kind: &'static str = "electronic";
        let mut npz = self.open(ELECTRONIC_FILE_PREFIX, kind, step)?;
        Ok(ElectronicRecord {
            energies: read_array(&mut npz, ENERGY_KEY, kind, step)?,
            forces: read_array(&mut npz, FORCE_KEY, kind, step)?,
            nacme: read_array(&mut npz, NACME_KEY, kind, step)?,
        })
    }

    fn nuclear_record(&mut self, step: isize) -> Result<NuclearRecord, DataError> {
        let kind: &'static str = "nuclear";
        let mut npz = self.open(NUCLEAR_FILE_PREFIX, kind, step)?;
        Ok(NuclearRecord {
            positions: read_array(&mut npz, POSITION_KEY, kind, step)?,
            velocities: read_array(&mut npz, VELOCITY_KEY, kind, step)?,
        })
    }
}
