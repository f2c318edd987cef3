use anyhow::{Context, Result};
use chemfiles::{Frame, Trajectory};
use std::path::Path;

/// Read a geometry file like .xyz or .pdb and returns a [Frame](chemfiles::Frame). The
/// positions of the frame are given in angstrom. If multiple geometries are contained in
/// the file, only the first one is used.
pub fn read_file_to_frame(filename: &Path) -> Result<Frame> {
    let mut trajectory = Trajectory::open(filename, 'r')
        .with_context(|| format!("Unable to open geometry file {}", filename.display()))?;
    let mut frame = Frame::new();
    trajectory
        .read(&mut frame)
        .with_context(|| format!("Unable to read a geometry from {}", filename.display()))?;
    Ok(frame)
}
