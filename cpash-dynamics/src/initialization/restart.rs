use crate::errors::DynamicsError;
use crate::output::RestartOutput;
use std::fs;
use std::path::Path;

/// Load the necessary parameters from the restart file
pub fn read_restart_parameters(path: &Path) -> Result<RestartOutput, DynamicsError> {
    let restart_string: String = fs::read_to_string(path).map_err(|error| {
        DynamicsError::Restart(format!("Unable to read {}: {}", path.display(), error))
    })?;
    serde_yaml::from_str(&restart_string).map_err(|error| {
        DynamicsError::Restart(format!("Unable to parse {}: {}", path.display(), error))
    })
}
