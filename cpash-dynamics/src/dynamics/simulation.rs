use crate::constants;
use crate::errors::{DataError, DynamicsError};
use crate::initialization::{RestartMode, Simulation};
use crate::interface::{ElectronicRecord, FrozenPathSource, NuclearRecord};
use crate::output::{print_header_dynamics_step, print_step, StepRecord, StepSink};
use log::{info, warn};
use ndarray::prelude::*;

/// Outcome of a trajectory that was not stopped by an output error
#[derive(Debug)]
pub enum TrajectoryStatus {
    /// all steps were computed
    Completed,
    /// a record of the frozen path was not available at this step
    Halted { step: isize, reason: DataError },
}

impl Simulation {
    /// Surface hopping dynamics along the frozen path. The trajectory starts at the
    /// initial step -1 or continues a restored run, depending on the restart mode.
    pub fn surface_hopping_dynamics(
        &mut self,
        path: &mut dyn FrozenPathSource,
        sink: &mut dyn StepSink,
    ) -> Result<TrajectoryStatus, DynamicsError> {
        print_header_dynamics_step();

        let first_step: isize = match self.settings.restart {
            None => -1,
            Some(RestartMode::Write) => {
                if let Err(reason) = self.load_step(-1, path) {
                    return self.halt(-1, reason, sink);
                }
                self.update_energy();
                self.report(-1, sink, true)?;
                0
            }
            Some(RestartMode::Append) => match self.restart_step {
                Some(step) => step + 1,
                None => {
                    return Err(DynamicsError::Restart(String::from(
                        "no electronic state was restored for appending",
                    )))
                }
            },
        };

        for step in first_step..self.settings.nstep as isize {
            if let Err(reason) = self.surface_hopping_step(step, path) {
                return self.halt(step, reason, sink);
            }
            let written: bool = (step + 1) % self.settings.output_frequency as isize == 0;
            self.report(step, sink, written)?;
        }

        let last_step: isize = (self.settings.nstep as isize - 1).max(first_step - 1);
        sink.finalize(&self.step_record(last_step))?;
        Ok(TrajectoryStatus::Completed)
    }

    /// A single step of the trajectory: load the frozen path, propagate the electronic
    /// state, decide the hop and correct the decoherence. The initial step -1 is not
    /// propagated.
    pub fn surface_hopping_step(
        &mut self,
        step: isize,
        path: &mut dyn FrozenPathSource,
    ) -> Result<(), DataError> {
        self.electronic.backup();
        self.load_step(step, path)?;

        if step >= 0 {
            self.propagator.propagate(
                &mut self.electronic,
                self.settings.electronic_object,
                self.settings.dt,
            );
        }

        self.hopping
            .compute_hop_probabilities(&self.electronic, self.settings.dt);
        self.hopping.decide_hop(self.rng.as_mut());

        self.kinetic_energy = self.get_kinetic_energy();
        self.settings.decoherence.correct(
            &mut self.electronic,
            &self.hopping,
            self.settings.electronic_object,
            self.kinetic_energy,
            self.settings.dt,
        );

        self.update_energy();
        Ok(())
    }

    /// Read the records of the step and check them against the system
    fn load_step(&mut self, step: isize, path: &mut dyn FrozenPathSource) -> Result<(), DataError> {
        let electronic: ElectronicRecord = path.electronic_record(step)?;
        let nuclear: NuclearRecord = path.nuclear_record(step)?;

        let nstates: usize = self.settings.nstates;
        let geometry: (usize, usize) = (self.n_atoms, 3);
        let corrupt = |kind: &'static str, reason: String| DataError::Corrupt { kind, step, reason };
        if electronic.energies.len() != nstates {
            return Err(corrupt(
                "electronic",
                format!("{} energies for {} states", electronic.energies.len(), nstates),
            ));
        }
        if electronic.nacme.dim() != (nstates, nstates) {
            return Err(corrupt(
                "electronic",
                format!("nacme of shape {:?}", electronic.nacme.dim()),
            ));
        }
        if electronic.forces.dim() != geometry {
            return Err(corrupt(
                "electronic",
                format!("forces of shape {:?}", electronic.forces.dim()),
            ));
        }
        if nuclear.positions.dim() != geometry || nuclear.velocities.dim() != geometry {
            return Err(corrupt(
                "nuclear",
                format!(
                    "positions of shape {:?} and velocities of shape {:?}",
                    nuclear.positions.dim(),
                    nuclear.velocities.dim()
                ),
            ));
        }

        self.electronic.load(&electronic);
        self.coordinates = nuclear.positions;
        self.velocities = nuclear.velocities;
        Ok(())
    }

    /// The potential energy is the energy of the running state. The velocities are
    /// not rescaled after a hop.
    pub fn update_energy(&mut self) {
        self.kinetic_energy = self.get_kinetic_energy();
        self.potential_energy = self.electronic.energies[self.hopping.active_state];
        self.total_energy = self.kinetic_energy + self.potential_energy;
    }

    /// Temperature of the nuclei in Kelvin
    pub fn get_temperature(&self) -> f64 {
        self.kinetic_energy * 2.0 / self.ndof as f64 * constants::AU_TO_K
    }

    pub fn step_record(&self, step: isize) -> StepRecord {
        StepRecord {
            step,
            active_state: self.hopping.active_state,
            probabilities: self.hopping.probabilities.clone(),
            cumulative: self.hopping.cumulative.clone(),
            random_number: self.hopping.random_number,
            populations: self.electronic.populations(),
            coherences: self.electronic.coherences(),
            coefficients: self.electronic.coefficients.clone(),
            energies: self.electronic.energies.clone(),
            nacme: self.electronic.nacme.clone(),
            dotpopnac: self.electronic.dotpopnac.clone(),
            kinetic_energy: self.kinetic_energy,
            potential_energy: self.potential_energy,
            total_energy: self.total_energy,
            temperature: self.get_temperature(),
            norm: self.electronic.norm(),
            positions: self.coordinates.clone(),
            velocities: self.velocities.clone(),
            events: self.hopping.events.clone(),
        }
    }

    /// Write the step if requested, log it if it was written or a hop occurred,
    /// and store the restart parameters.
    fn report(
        &mut self,
        step: isize,
        sink: &mut dyn StepSink,
        written: bool,
    ) -> Result<(), DynamicsError> {
        let mut record: StepRecord = self.step_record(step);
        record.events = self.hopping.take_events();
        if written {
            sink.write_step(&record)?;
        }
        if written || !record.events.is_empty() {
            print_step(&record);
        }
        sink.write_restart(&self.restart_output(step))?;
        Ok(())
    }

    fn halt(
        &mut self,
        step: isize,
        reason: DataError,
        sink: &mut dyn StepSink,
    ) -> Result<TrajectoryStatus, DynamicsError> {
        warn!("Trajectory halted at step {}: {}", step + 1, reason);
        if step > -1 {
            sink.finalize(&self.step_record(step - 1))?;
        }
        info!("The last completed step was {}", step);
        Ok(TrajectoryStatus::Halted { step, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c64;
    use crate::dynamics::random::FixedSequence;
    use crate::dynamics::{ElectronicPropagator, ElectronicState};
    use crate::initialization::{DynamicConfiguration, ElectronicObject, SystemData};
    use crate::interface::PreloadedPath;
    use crate::output::RestartOutput;
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    fn diatomic() -> SystemData {
        let symbols: Vec<String> = vec!["H".into(), "H".into()];
        let coordinates: Array2<f64> = array![[0.0, 0.0, 0.0], [0.0, 0.0, 1.4]];
        SystemData::try_from((symbols, coordinates)).unwrap()
    }

    fn frozen_path(nsteps: usize) -> PreloadedPath {
        scaled_path(nsteps, 1.0)
    }

    /// Two states with a growing coupling and slowly moving nuclei,
    /// records for the steps -1..nsteps
    fn scaled_path(nsteps: usize, scale: f64) -> PreloadedPath {
        let mut electronic: Vec<ElectronicRecord> = Vec::new();
        let mut nuclear: Vec<NuclearRecord> = Vec::new();
        for k in 0..=nsteps {
            let coupling: f64 = scale * (0.02 + 0.005 * k as f64);
            electronic.push(ElectronicRecord {
                energies: array![-1.0, -0.96 + 0.001 * k as f64],
                forces: Array2::zeros((2, 3)),
                nacme: array![[0.0, coupling], [-coupling, 0.0]],
            });
            nuclear.push(NuclearRecord {
                positions: array![[0.0, 0.0, 0.0], [0.0, 0.0, 1.4 + 0.01 * k as f64]],
                velocities: array![[0.0, 0.0, -1.0e-3], [0.0, 0.0, 1.0e-3]],
            });
        }
        PreloadedPath::new(-1, electronic, nuclear)
    }

    fn simulation(input: &str, numbers: Vec<f64>) -> Simulation {
        let config: DynamicConfiguration = toml::from_str(input).unwrap();
        Simulation::new(&diatomic(), config.validate().unwrap())
            .with_random_source(Box::new(FixedSequence::new(numbers)))
    }

    /// Sink that keeps the records and the restart parameters
    #[derive(Default)]
    struct Recorder {
        records: Vec<StepRecord>,
        restarts: Vec<RestartOutput>,
        last: Option<StepRecord>,
    }

    impl StepSink for Recorder {
        fn write_step(&mut self, record: &StepRecord) -> io::Result<()> {
            self.records.push(record.clone());
            Ok(())
        }

        fn write_restart(&mut self, restart: &RestartOutput) -> io::Result<()> {
            self.restarts.push(restart.clone());
            Ok(())
        }

        fn finalize(&mut self, record: &StepRecord) -> io::Result<()> {
            self.last = Some(record.clone());
            Ok(())
        }
    }

    #[test]
    fn trajectory_writes_all_steps() {
        let mut simulation = simulation(
            "nstep = 10\nstepsize = 10.0\ntime_unit = \"au\"\ninitial_coefficients = [[0.8, 0.0], [0.6, 0.0]]",
            vec![0.0],
        );
        let mut path = frozen_path(10);
        let mut sink = Recorder::default();
        let status = simulation
            .surface_hopping_dynamics(&mut path, &mut sink)
            .unwrap();

        assert!(matches!(status, TrajectoryStatus::Completed));
        assert_eq!(sink.records.len(), 11);
        assert_eq!(sink.records[0].step, -1);
        assert_eq!(sink.records[10].step, 9);
        assert_eq!(sink.restarts.len(), 11);
        assert_eq!(sink.last.as_ref().map(|record| record.step), Some(9));
        for record in sink.records.iter() {
            assert_eq!(record.active_state, 0);
            assert_abs_diff_eq!(record.norm, 1.0, epsilon = 1e-6);
            assert_eq!(record.potential_energy, record.energies[0]);
            assert_abs_diff_eq!(
                record.total_energy,
                record.kinetic_energy + record.potential_energy,
                epsilon = 1e-14
            );
        }
        // the frozen positions of step t are used in step t
        assert_abs_diff_eq!(sink.records[5].positions[[1, 2]], 1.45, epsilon = 1e-12);
        // the initial step is not propagated
        assert_abs_diff_eq!(sink.records[0].populations[0], 0.64, epsilon = 1e-12);
    }

    #[test]
    fn output_frequency_thins_the_records() {
        let mut simulation = simulation("nstep = 10\noutput_frequency = 5", vec![0.0]);
        let mut path = frozen_path(10);
        let mut records: Vec<StepRecord> = Vec::new();
        simulation
            .surface_hopping_dynamics(&mut path, &mut records)
            .unwrap();

        let steps: Vec<isize> = records.iter().map(|record| record.step).collect();
        assert_eq!(steps, vec![-1, 4, 9]);
    }

    #[test]
    fn missing_record_halts_the_trajectory() {
        let mut simulation = simulation("nstep = 10", vec![0.0]);
        let mut path = frozen_path(4);
        let mut sink = Recorder::default();
        let status = simulation
            .surface_hopping_dynamics(&mut path, &mut sink)
            .unwrap();

        assert!(matches!(
            status,
            TrajectoryStatus::Halted {
                step: 4,
                reason: DataError::Missing { .. }
            }
        ));
        assert_eq!(sink.records.len(), 5);
        assert_eq!(sink.last.map(|record| record.step), Some(3));
    }

    #[test]
    fn wrong_number_of_states_is_corrupt() {
        let mut simulation = simulation("nstep = 2\nnstates = 3", vec![0.0]);
        let mut path = frozen_path(2);
        let mut records: Vec<StepRecord> = Vec::new();
        let status = simulation
            .surface_hopping_dynamics(&mut path, &mut records)
            .unwrap();

        assert!(matches!(
            status,
            TrajectoryStatus::Halted {
                step: -1,
                reason: DataError::Corrupt { .. }
            }
        ));
        assert!(records.is_empty());
    }

    #[test]
    fn fixed_random_numbers_give_identical_trajectories() {
        let input: &str = "nstep = 8\nstepsize = 40.0\ntime_unit = \"au\"\ninitial_coefficients = [[0.7071067811865476, 0.0], [0.7071067811865476, 0.0]]";
        let numbers: Vec<f64> = vec![0.9, 0.01, 0.5, 0.02, 0.3, 0.001, 0.7, 0.05, 0.2];
        let mut first: Vec<StepRecord> = Vec::new();
        let mut second: Vec<StepRecord> = Vec::new();
        simulation(input, numbers.clone())
            .surface_hopping_dynamics(&mut frozen_path(8), &mut first)
            .unwrap();
        simulation(input, numbers)
            .surface_hopping_dynamics(&mut frozen_path(8), &mut second)
            .unwrap();

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.active_state, b.active_state);
            assert_eq!(a.populations, b.populations);
            assert_eq!(a.random_number, b.random_number);
        }
        assert_eq!(first[1].random_number, 0.01);
    }

    #[test]
    fn hop_is_reported_and_collapses_with_idc() {
        // a zero draw never hops, the second draw hops as soon as any
        // probability flows out of the running state
        let mut simulation = simulation(
            "nstep = 3\nstepsize = 5.0\ntime_unit = \"au\"\ndecoherence_correction = \"idc\"\ninitial_coefficients = [[0.7071067811865476, 0.0], [0.7071067811865476, 0.0]]",
            vec![0.0, 1.0e-12, 0.0],
        );
        let mut path = frozen_path(3);
        let mut records: Vec<StepRecord> = Vec::new();
        simulation
            .surface_hopping_dynamics(&mut path, &mut records)
            .unwrap();

        let hops: Vec<&StepRecord> = records
            .iter()
            .filter(|record| !record.events.is_empty())
            .collect();
        assert_eq!(hops.len(), 1);
        assert_eq!(hops[0].events, vec![String::from("Accept hopping: hop 0 -> 1")]);
        assert_eq!(hops[0].active_state, 1);
        assert_eq!(hops[0].populations, array![0.0, 1.0]);
        assert_eq!(hops[0].potential_energy, hops[0].energies[1]);
    }

    #[test]
    fn energy_based_decoherence_damps_the_coherence() {
        // without coupling only the decoherence correction changes the populations
        let input: &str = "nstep = 5\nstepsize = 40.0\ntime_unit = \"au\"\ninitial_coefficients = [[0.8, 0.0], [0.6, 0.0]]";
        let mut plain: Vec<StepRecord> = Vec::new();
        simulation(input, vec![0.0])
            .surface_hopping_dynamics(&mut scaled_path(5, 0.0), &mut plain)
            .unwrap();
        let mut damped: Vec<StepRecord> = Vec::new();
        let input: String = format!("{}\ndecoherence_correction = \"edc\"", input);
        simulation(&input, vec![0.0])
            .surface_hopping_dynamics(&mut scaled_path(5, 0.0), &mut damped)
            .unwrap();

        let last: usize = plain.len() - 1;
        assert_abs_diff_eq!(plain[last].populations[0], 0.64, epsilon = 1e-12);
        assert!(damped[last].populations[0] > 0.64);
        assert!(damped[last].coherences[0].norm() < plain[last].coherences[0].norm());
        assert_abs_diff_eq!(damped[last].norm, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn write_restart_rewrites_the_initial_step() {
        let mut simulation = simulation("nstep = 3\nrestart = \"write\"", vec![0.0]);
        let restart = RestartOutput::new(
            1,
            1,
            array![c64::new(0.0, 0.0), c64::new(1.0, 0.0)].view(),
            array![
                [c64::new(0.0, 0.0), c64::new(0.0, 0.0)],
                [c64::new(0.0, 0.0), c64::new(1.0, 0.0)]
            ]
            .view(),
            array![-1.0, -0.96].view(),
            array![[0.0, 0.02], [-0.02, 0.0]].view(),
        );
        simulation.restore(&restart).unwrap();
        let mut records: Vec<StepRecord> = Vec::new();
        simulation
            .surface_hopping_dynamics(&mut frozen_path(3), &mut records)
            .unwrap();

        let steps: Vec<isize> = records.iter().map(|record| record.step).collect();
        assert_eq!(steps, vec![-1, 0, 1, 2]);
        assert_eq!(records[0].active_state, 1);
        assert_eq!(records[0].random_number, 0.0);
        assert_eq!(records[0].populations, array![0.0, 1.0]);
    }

    #[test]
    fn append_restart_continues_after_the_last_step() {
        let mut simulation = simulation("nstep = 6\nrestart = \"append\"", vec![0.0]);
        let restart = RestartOutput::new(
            2,
            0,
            array![c64::new(1.0, 0.0), c64::new(0.0, 0.0)].view(),
            array![
                [c64::new(1.0, 0.0), c64::new(0.0, 0.0)],
                [c64::new(0.0, 0.0), c64::new(0.0, 0.0)]
            ]
            .view(),
            array![-1.0, -0.957].view(),
            array![[0.0, 0.035], [-0.035, 0.0]].view(),
        );
        simulation.restore(&restart).unwrap();
        let mut records: Vec<StepRecord> = Vec::new();
        simulation
            .surface_hopping_dynamics(&mut frozen_path(6), &mut records)
            .unwrap();

        let steps: Vec<isize> = records.iter().map(|record| record.step).collect();
        assert_eq!(steps, vec![3, 4, 5]);

        let mut unrestored = self::simulation("nstep = 6\nrestart = \"append\"", vec![0.0]);
        assert!(unrestored
            .surface_hopping_dynamics(&mut frozen_path(6), &mut Vec::<StepRecord>::new())
            .is_err());
    }

    /// Leaves the electronic state untouched and counts the calls
    struct Frozen {
        calls: Rc<Cell<usize>>,
    }

    impl ElectronicPropagator for Frozen {
        fn propagate(&mut self, _state: &mut ElectronicState, _object: ElectronicObject, _dt: f64) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn hopping_follows_the_replaced_propagator() {
        let calls: Rc<Cell<usize>> = Rc::new(Cell::new(0));
        let mut simulation = simulation(
            "nstep = 4\nstepsize = 10.0\ntime_unit = \"au\"\ninitial_coefficients = [[0.8, 0.0], [0.6, 0.0]]",
            vec![0.0],
        )
        .with_propagator(Box::new(Frozen {
            calls: Rc::clone(&calls),
        }));
        let mut records: Vec<StepRecord> = Vec::new();
        simulation
            .surface_hopping_dynamics(&mut frozen_path(4), &mut records)
            .unwrap();

        // the initial step is not propagated
        assert_eq!(calls.get(), 4);
        assert_eq!(records.len(), 5);
        for record in records.iter() {
            assert_abs_diff_eq!(record.populations[0], 0.64, epsilon = 1e-12);
            // p_1 = 2 * 0.48 * D_01 * dt / 0.64 with the couplings of the loaded step
            assert!(record.probabilities[1] > 0.0);
            assert_eq!(record.active_state, 0);
        }
        assert_abs_diff_eq!(
            records[1].probabilities[1],
            2.0 * 0.48 * 0.025 * 10.0 / 0.64,
            epsilon = 1e-12
        );
    }

    #[test]
    fn wrong_force_shape_is_corrupt() {
        let mut electronic: Vec<ElectronicRecord> = Vec::new();
        let mut nuclear: Vec<NuclearRecord> = Vec::new();
        electronic.push(ElectronicRecord {
            energies: array![-1.0, -0.96],
            forces: Array2::zeros((3, 3)),
            nacme: array![[0.0, 0.02], [-0.02, 0.0]],
        });
        nuclear.push(NuclearRecord {
            positions: Array2::zeros((2, 3)),
            velocities: Array2::zeros((2, 3)),
        });
        let mut path = PreloadedPath::new(-1, electronic, nuclear);
        let mut simulation = simulation("nstep = 1", vec![0.0]);
        let status = simulation
            .surface_hopping_dynamics(&mut path, &mut Vec::<StepRecord>::new())
            .unwrap();

        match status {
            TrajectoryStatus::Halted {
                step: -1,
                reason: DataError::Corrupt { kind, reason, .. },
            } => {
                assert_eq!(kind, "electronic");
                assert!(reason.contains("forces"));
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }
}
