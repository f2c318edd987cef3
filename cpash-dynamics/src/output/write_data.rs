use crate::c64;
use crate::constants;
use crate::defaults;
use crate::initialization::{DynamicSettings, ElectronicObject, RestartMode};
use crate::output::{StepRecord, StepSink};
use itertools::Itertools;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Struct that stores the parameters, which are necessary to restart the dynamics simulation
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RestartOutput {
    /// last completed step
    pub step: isize,
    pub active_state: usize,
    pub coefficients: Array1<c64>,
    pub rho: Array2<c64>,
    pub energies: Array1<f64>,
    pub nacme: Array2<f64>,
}

impl RestartOutput {
    pub fn new(
        step: isize,
        active_state: usize,
        coefficients: ArrayView1<c64>,
        rho: ArrayView2<c64>,
        energies: ArrayView1<f64>,
        nacme: ArrayView2<f64>,
    ) -> RestartOutput {
        RestartOutput {
            step,
            active_state,
            coefficients: coefficients.to_owned(),
            rho: rho.to_owned(),
            energies: energies.to_owned(),
            nacme: nacme.to_owned(),
        }
    }
}

/// Writes the trajectory into plain text files in the output directory:
/// MOVIE.xyz, MDENERGY, BOPOP, BOCOH, BOCOEF, NACME, SHSTATE, SHPROB,
/// DOTPOPNAC, the restart file and FINAL.xyz.
pub struct TrajectoryWriter {
    directory: PathBuf,
    symbols: Vec<String>,
    nstates: usize,
    electronic_object: ElectronicObject,
    print_density_matrix: bool,
    verbose: i8,
}

impl TrajectoryWriter {
    /// Create the output directory. The files are started anew unless the
    /// trajectory is appended to a previous run.
    pub fn new(symbols: Vec<String>, settings: &DynamicSettings) -> io::Result<Self> {
        fs::create_dir_all(&settings.output_directory)?;
        let writer = TrajectoryWriter {
            directory: settings.output_directory.clone(),
            symbols,
            nstates: settings.nstates,
            electronic_object: settings.electronic_object,
            print_density_matrix: settings.print_density_matrix,
            verbose: settings.verbose,
        };
        if settings.restart != Some(RestartMode::Append) {
            writer.touch_files()?;
        }
        Ok(writer)
    }

    fn prints_density(&self) -> bool {
        self.electronic_object == ElectronicObject::Density || self.print_density_matrix
    }

    /// Write the headers of all output files
    fn touch_files(&self) -> io::Result<()> {
        let mut header: String = format!(
            "{:5}{:9}{:15}{:15}{:15}",
            "#", "Step", "Kinetic(H)", "Potential(H)", "Total(H)"
        );
        for state in 0..self.nstates {
            header.push_str(&format!("E({})(H){:8}", state, ""));
        }
        self.new_file("MDENERGY", Some(&header))?;

        if self.electronic_object == ElectronicObject::Coefficient {
            self.new_file(
                "BOCOEF",
                Some("#     BO State Coefficients: state Re-Im"),
            )?;
        }
        if self.prints_density() {
            self.new_file("BOPOP", Some("#     Density Matrix: population Re"))?;
            self.new_file("BOCOH", Some("#     Density Matrix: coherence Re-Im"))?;
        }
        self.new_file(
            "NACME",
            Some("#    Non-Adiabatic Coupling Matrix Elements: off-diagonal"),
        )?;
        self.new_file("SHSTATE", Some(&format!("{:5}{:8}{:10}", "#", "Step", "Running State")))?;

        let mut header: String = format!("{:5}{:12}", "#", "Step");
        for state in 0..self.nstates {
            header.push_str(&format!("Prob({}){:8}", state, ""));
        }
        self.new_file("SHPROB", Some(&header))?;

        if self.verbose >= 1 {
            self.new_file(
                "DOTPOPNAC",
                Some("#     Time-derivative Density Matrix by NAC: population"),
            )?;
        }
        self.new_file("MOVIE.xyz", None)
    }

    fn new_file(&self, name: &str, header: Option<&str>) -> io::Result<()> {
        let mut string: String = String::new();
        if let Some(header) = header {
            string.push_str(header);
            string.push('\n');
        }
        fs::write(self.directory.join(name), string)
    }

    fn append(&self, name: &str, string: &str) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.directory.join(name))?;
        let mut stream = BufWriter::new(file);
        stream.write_all(string.as_bytes())?;
        stream.flush()
    }

    /// Positions in angstrom and velocities in atomic units
    fn geometry(&self, record: &StepRecord) -> String {
        let mut string: String = format!(
            "{:6}\n{:2}Step:{:6}{:12}Position(A){:34}Velocity(au)\n",
            self.symbols.len(),
            "",
            record.step + 1,
            "",
            ""
        );
        for (atom, symbol) in self.symbols.iter().enumerate() {
            string.push_str(&format!("{:5}", symbol));
            for position in record.positions.row(atom) {
                string.push_str(&format!("{:15.8}", position * constants::BOHR_TO_ANGS));
            }
            for velocity in record.velocities.row(atom) {
                string.push_str(&format!("{:15.8}", velocity));
            }
            string.push('\n');
        }
        string
    }
}

impl StepSink for TrajectoryWriter {
    fn write_step(&mut self, record: &StepRecord) -> io::Result<()> {
        let step: isize = record.step + 1;
        self.append("MOVIE.xyz", &self.geometry(record))?;

        let mut string: String = format!(
            "{:9}{:15.8}{:15.8}{:15.8}",
            step, record.kinetic_energy, record.potential_energy, record.total_energy
        );
        for energy in record.energies.iter() {
            string.push_str(&format!("{:15.8}", energy));
        }
        string.push('\n');
        self.append("MDENERGY", &string)?;

        if self.electronic_object == ElectronicObject::Coefficient {
            let mut string: String = format!("{:9}", step);
            for coefficient in record.coefficients.iter() {
                string.push_str(&format!("{:15.8}{:15.8}", coefficient.re, coefficient.im));
            }
            string.push('\n');
            self.append("BOCOEF", &string)?;
        }
        if self.prints_density() {
            let mut string: String = format!("{:9}", step);
            for population in record.populations.iter() {
                string.push_str(&format!("{:15.8}", population));
            }
            string.push('\n');
            self.append("BOPOP", &string)?;

            let mut string: String = format!("{:9}", step);
            for coherence in record.coherences.iter() {
                string.push_str(&format!("{:15.8}{:15.8}", coherence.re, coherence.im));
            }
            string.push('\n');
            self.append("BOCOH", &string)?;
        }

        let mut string: String = format!("{:10}", step);
        for (i, j) in (0..self.nstates).tuple_combinations() {
            string.push_str(&format!("{:15.8}", record.nacme[[i, j]]));
        }
        string.push('\n');
        self.append("NACME", &string)?;

        self.append(
            "SHSTATE",
            &format!("{:9}{:14}{}\n", step, "", record.active_state),
        )?;

        let mut string: String = format!("{:9}", step);
        for probability in record.probabilities.iter() {
            string.push_str(&format!("{:15.8}", probability));
        }
        string.push('\n');
        self.append("SHPROB", &string)?;

        if self.verbose >= 1 {
            let mut string: String = format!("{:9}", step);
            for value in record.dotpopnac.iter() {
                string.push_str(&format!("{:15.8}", value));
            }
            string.push('\n');
            self.append("DOTPOPNAC", &string)?;
        }
        Ok(())
    }

    /// Print the restart parameters from the struct [RestartOutput] in the yaml format.
    fn write_restart(&mut self, restart: &RestartOutput) -> io::Result<()> {
        let restart: String = serde_yaml::to_string(restart)
            .map_err(|error| io::Error::new(io::ErrorKind::Other, error))?;
        fs::write(self.directory.join(defaults::RESTART_FILE_NAME), restart)
    }

    fn finalize(&mut self, record: &StepRecord) -> io::Result<()> {
        fs::write(self.directory.join("FINAL.xyz"), self.geometry(record))
    }
}

/// Path of the restart file inside the output directory
pub fn restart_file_path(directory: &Path) -> PathBuf {
    directory.join(defaults::RESTART_FILE_NAME)
}
