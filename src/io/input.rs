use crate::io::read_file_to_frame;
use anyhow::{Context, Result};
use cpash_dynamics::defaults::CONFIG_FILE_NAME;
use cpash_dynamics::initialization::{DynamicConfiguration, SystemData};
use std::fs;
use std::path::Path;

pub fn read_input(geom_file: &str) -> Result<(SystemData, DynamicConfiguration)> {
    // The file containing the cartesian coordinates is the only mandatory file to
    // start a trajectory.
    let frame = read_file_to_frame(Path::new(geom_file))?;
    let system: SystemData = SystemData::try_from(&frame)
        .with_context(|| format!("Unable to set up the molecule from {}", geom_file))?;

    // The configuration file is read, if it does not exist in the directory
    // the default settings are used and written to the directory.
    read_configuration(Path::new(CONFIG_FILE_NAME)).map(|config| (system, config))
}

pub fn read_configuration(config_file_path: &Path) -> Result<DynamicConfiguration> {
    let config_string: String = if config_file_path.exists() {
        fs::read_to_string(config_file_path).with_context(|| {
            format!("Unable to read config file {}", config_file_path.display())
        })?
    } else {
        String::from("")
    };
    let config: DynamicConfiguration = toml::from_str(&config_string)
        .with_context(|| format!("Invalid config file {}", config_file_path.display()))?;
    // The configuration file is saved if it does not exist already so that the user can see
    // all the used options.
    if !config_file_path.exists() {
        let config_string: String =
            toml::to_string(&config).context("Unable to serialize the configuration")?;
        fs::write(config_file_path, config_string).with_context(|| {
            format!("Unable to write config file {}", config_file_path.display())
        })?;
    }
    Ok(config)
}
