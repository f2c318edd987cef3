use crate::dynamics::{
    ElectronicPropagator, ElectronicState, HoppingState, RungeKutta4, SeededUniform,
    UniformSource,
};
use crate::errors::DynamicsError;
use crate::initialization::system::SystemData;
use crate::initialization::{DynamicSettings, PropagatorKind};
use crate::output::RestartOutput;
use ndarray::prelude::*;

/// Struct that holds the [DynamicSettings] and the state of the trajectory:
/// the nuclei of the frozen path, the electronic state and the hopping state.
pub struct Simulation {
    pub settings: DynamicSettings,
    pub n_atoms: usize,
    pub symbols: Vec<String>,
    pub masses: Array1<f64>,
    pub ndof: usize,
    pub coordinates: Array2<f64>,
    pub velocities: Array2<f64>,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
    pub electronic: ElectronicState,
    pub hopping: HoppingState,
    /// last completed step of a restored trajectory
    pub restart_step: Option<isize>,
    pub propagator: Box<dyn ElectronicPropagator>,
    pub rng: Box<dyn UniformSource>,
}

impl Simulation {
    /// Initialize the struct [Simulation] from the [SystemData] and the settings.
    /// The electronic state starts in the initial state or from the initial coefficients.
    pub fn new(system: &SystemData, settings: DynamicSettings) -> Simulation {
        let electronic = ElectronicState::new(
            settings.nstates,
            settings.initial_state,
            settings.initial_coefficients.as_ref().map(|c| c.view()),
        );
        let hopping = HoppingState::new(settings.nstates, settings.initial_state);
        let propagator: Box<dyn ElectronicPropagator> = match settings.propagator {
            PropagatorKind::RungeKutta4 => Box::new(RungeKutta4::new(settings.nestep)),
        };
        let rng: Box<dyn UniformSource> = Box::new(SeededUniform::new(settings.random_seed));

        Simulation {
            n_atoms: system.n_atoms,
            symbols: system.symbols.clone(),
            masses: system.masses.clone(),
            ndof: system.degrees_of_freedom(),
            coordinates: system.coordinates.clone(),
            velocities: Array2::zeros(system.coordinates.raw_dim()),
            kinetic_energy: 0.0,
            potential_energy: 0.0,
            total_energy: 0.0,
            electronic,
            hopping,
            restart_step: None,
            propagator,
            rng,
            settings,
        }
    }

    /// Replace the source of the random numbers used for the hopping decision
    pub fn with_random_source(mut self, rng: Box<dyn UniformSource>) -> Self {
        self.rng = rng;
        self
    }

    /// Replace the integrator of the electronic Schroedinger equation
    pub fn with_propagator(mut self, propagator: Box<dyn ElectronicPropagator>) -> Self {
        self.propagator = propagator;
        self
    }

    /// Take over the electronic state, the running state and the last completed
    /// step from a previous run.
    pub fn restore(&mut self, restart: &RestartOutput) -> Result<(), DynamicsError> {
        let nstates: usize = self.settings.nstates;
        if restart.coefficients.len() != nstates
            || restart.rho.dim() != (nstates, nstates)
            || restart.energies.len() != nstates
            || restart.nacme.dim() != (nstates, nstates)
        {
            return Err(DynamicsError::Restart(format!(
                "restart file does not contain {} electronic states",
                nstates
            )));
        }
        if restart.active_state >= nstates {
            return Err(DynamicsError::Restart(format!(
                "running state {} is not one of the {} states",
                restart.active_state, nstates
            )));
        }
        self.electronic.coefficients.assign(&restart.coefficients);
        self.electronic.rho.assign(&restart.rho);
        self.electronic.energies.assign(&restart.energies);
        self.electronic.nacme.assign(&restart.nacme);
        self.hopping = HoppingState::new(nstates, restart.active_state);
        self.restart_step = Some(restart.step);
        Ok(())
    }

    /// Kinetic energy of the nuclei, E_kin = 1/2 sum_i m_i v_i^2
    pub fn get_kinetic_energy(&self) -> f64 {
        let mut kinetic_energy: f64 = 0.0;
        for (velocity, mass) in self.velocities.outer_iter().zip(self.masses.iter()) {
            kinetic_energy += 0.5 * mass * velocity.dot(&velocity);
        }
        kinetic_energy
    }

    /// Current restart parameters of the trajectory
    pub fn restart_output(&self, step: isize) -> RestartOutput {
        RestartOutput::new(
            step,
            self.hopping.active_state,
            self.electronic.coefficients.view(),
            self.electronic.rho.view(),
            self.electronic.energies.view(),
            self.electronic.nacme.view(),
        )
    }
}
