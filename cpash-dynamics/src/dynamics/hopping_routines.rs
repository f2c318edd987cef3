use crate::constants::EPS;
use crate::dynamics::electronic_state::ElectronicState;
use crate::dynamics::random::UniformSource;
use log::warn;
use ndarray::prelude::*;

/// State of the fewest switches hopping procedure. The probabilities are
/// recomputed in every step, only the running state persists.
#[derive(Clone, Debug)]
pub struct HoppingState {
    pub active_state: usize,
    pub previous_active_state: usize,
    pub probabilities: Array1<f64>,
    /// cumulative[k] = sum of the probabilities of the states 0..k
    pub cumulative: Array1<f64>,
    /// last drawn random number
    pub random_number: f64,
    pub hop_occurred: bool,
    /// reserved for frustrated hops; never set by the hopping itself, cleared every step
    pub hop_rejected: bool,
    pub events: Vec<String>,
}

impl HoppingState {
    pub fn new(nstates: usize, active_state: usize) -> Self {
        HoppingState {
            active_state,
            previous_active_state: active_state,
            probabilities: Array1::zeros(nstates),
            cumulative: Array1::zeros(nstates + 1),
            random_number: 0.0,
            hop_occurred: false,
            hop_rejected: false,
            events: Vec::new(),
        }
    }

    /// Fewest switches probabilities out of the running state a:
    /// p_i = max(0, -2 Re(rho_ia) D_ia dt / rho_aa).
    /// The sum of the probabilities is limited to one.
    pub fn compute_hop_probabilities(&mut self, state: &ElectronicState, dt: f64) {
        let active: usize = self.active_state;
        self.previous_active_state = active;
        self.hop_occurred = false;
        self.hop_rejected = false;
        self.probabilities.fill(0.0);

        let active_population: f64 = state.rho[[active, active]].re;
        if active_population <= EPS {
            warn!(
                "Population of the running state {} vanished, no hopping possible",
                active
            );
        } else {
            for i in (0..state.nstates).filter(|&i| i != active) {
                let probability: f64 = -2.0 * state.rho[[i, active]].re * state.nacme[[i, active]]
                    * dt
                    / active_population;
                self.probabilities[i] = probability.max(0.0);
            }
        }

        self.cumulative[0] = 0.0;
        for i in 0..state.nstates {
            self.cumulative[i + 1] = self.cumulative[i] + self.probabilities[i];
        }
        let total: f64 = self.cumulative[state.nstates];
        if total > 1.0 {
            self.probabilities /= total;
            self.cumulative /= total;
        }
    }

    /// Draw a random number and switch the running state if it falls into the
    /// probability interval of another state.
    pub fn decide_hop(&mut self, rng: &mut dyn UniformSource) {
        self.random_number = rng.next_uniform();
        if let Some(target) =
            select_hop_target(self.cumulative.view(), self.active_state, self.random_number)
        {
            self.active_state = target;
            self.hop_occurred = true;
            self.events.push(format!(
                "Accept hopping: hop {} -> {}",
                self.previous_active_state, target
            ));
        }
    }

    /// Hop events recorded since the last call
    pub fn take_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }
}

/// State i is selected if cumulative[i] < r <= cumulative[i + 1]. The intervals do not
/// overlap, so at most one state qualifies. The running state itself is never selected.
pub fn select_hop_target(cumulative: ArrayView1<f64>, active_state: usize, r: f64) -> Option<usize> {
    let nstates: usize = cumulative.len().saturating_sub(1);
    (0..nstates)
        .filter(|&i| i != active_state)
        .find(|&i| cumulative[i] < r && r <= cumulative[i + 1])
}
