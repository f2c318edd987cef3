use crate::c64;
use crate::interface::ElectronicRecord;
use itertools::Itertools;
use ndarray::prelude::*;

/// Electronic degrees of freedom of the trajectory. The density matrix follows the
/// convention `rho[i, j] = conj(c_i) * c_j`.
#[derive(Clone, Debug)]
pub struct ElectronicState {
    pub nstates: usize,
    pub coefficients: Array1<c64>,
    pub rho: Array2<c64>,
    pub energies: Array1<f64>,
    pub nacme: Array2<f64>,
    /// energies of the previous step, used to interpolate during the propagation
    pub old_energies: Array1<f64>,
    pub old_nacme: Array2<f64>,
    /// time derivative of the populations due to the nonadiabatic couplings
    pub dotpopnac: Array1<f64>,
}

impl ElectronicState {
    /// Start in a pure state or, if given, from the initial coefficients
    pub fn new(
        nstates: usize,
        initial_state: usize,
        initial_coefficients: Option<ArrayView1<c64>>,
    ) -> Self {
        let coefficients: Array1<c64> = match initial_coefficients {
            Some(coefficients) => coefficients.to_owned(),
            None => {
                let mut coefficients: Array1<c64> = Array1::zeros(nstates);
                coefficients[initial_state] = c64::new(1.0, 0.0);
                coefficients
            }
        };
        let mut state = Self {
            nstates,
            coefficients,
            rho: Array2::zeros((nstates, nstates)),
            energies: Array1::zeros(nstates),
            nacme: Array2::zeros((nstates, nstates)),
            old_energies: Array1::zeros(nstates),
            old_nacme: Array2::zeros((nstates, nstates)),
            dotpopnac: Array1::zeros(nstates),
        };
        state.density_from_coefficients();
        state
    }

    /// Save the electronic structure data of the current step
    pub fn backup(&mut self) {
        self.old_energies.assign(&self.energies);
        self.old_nacme.assign(&self.nacme);
    }

    pub fn load(&mut self, record: &ElectronicRecord) {
        self.energies.assign(&record.energies);
        self.nacme.assign(&record.nacme);
    }

    /// Rebuild the density matrix from the coefficients
    pub fn density_from_coefficients(&mut self) {
        for i in 0..self.nstates {
            for j in i..self.nstates {
                self.rho[[i, j]] = self.coefficients[i].conj() * self.coefficients[j];
                self.rho[[j, i]] = self.rho[[i, j]].conj();
            }
        }
    }

    pub fn populations(&self) -> Array1<f64> {
        self.rho.diag().mapv(|val| val.re)
    }

    /// Upper triangle of the density matrix, row by row
    pub fn coherences(&self) -> Vec<c64> {
        (0..self.nstates)
            .tuple_combinations()
            .map(|(i, j)| self.rho[[i, j]])
            .collect()
    }

    /// Trace of the density matrix
    pub fn norm(&self) -> f64 {
        self.populations().sum()
    }

    pub fn update_dotpopnac(&mut self) {
        for i in 0..self.nstates {
            self.dotpopnac[i] = (0..self.nstates)
                .filter(|&k| k != i)
                .map(|k| -2.0 * self.rho[[i, k]].re * self.nacme[[i, k]])
                .sum();
        }
    }
}
