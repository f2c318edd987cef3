use crate::c64;
use crate::dynamics::electronic_state::ElectronicState;
use crate::initialization::ElectronicObject;
use ndarray::prelude::*;
use ndarray::Dimension;

/// Trait for the integrator of the electronic equation of motion. It advances the
/// coefficients or the density matrix by one nuclear time step and does not make
/// any hopping decision.
pub trait ElectronicPropagator {
    fn propagate(&mut self, state: &mut ElectronicState, object: ElectronicObject, dt: f64);
}

/// 4th order Runge-Kutta integration with `nesteps` electronic steps per nuclear step.
/// Energies and couplings are interpolated linearly between the previous and the
/// current nuclear step.
pub struct RungeKutta4 {
    pub nesteps: usize,
}

impl RungeKutta4 {
    pub fn new(nesteps: usize) -> Self {
        RungeKutta4 {
            nesteps: nesteps.max(1),
        }
    }
}

impl ElectronicPropagator for RungeKutta4 {
    fn propagate(&mut self, state: &mut ElectronicState, object: ElectronicObject, dt: f64) {
        let edt: f64 = dt / self.nesteps as f64;
        let interpolation = Interpolation::new(state, dt);

        match object {
            ElectronicObject::Coefficient => {
                let mut coefficients: Array1<c64> = state.coefficients.clone();
                for step in 0..self.nesteps {
                    coefficients =
                        runge_kutta_step(&coefficients, step as f64 * edt, edt, |time, c| {
                            let (energies, nacme) = interpolation.at(time);
                            coefficient_derivative(c.view(), energies.view(), nacme.view())
                        });
                }
                state.coefficients = coefficients;
                state.density_from_coefficients();
            }
            ElectronicObject::Density => {
                let mut rho: Array2<c64> = state.rho.clone();
                for step in 0..self.nesteps {
                    rho = runge_kutta_step(&rho, step as f64 * edt, edt, |time, rho| {
                        let (energies, nacme) = interpolation.at(time);
                        density_derivative(rho.view(), energies.view(), nacme.view())
                    });
                }
                state.rho = rho;
            }
        }
        state.update_dotpopnac();
    }
}

/// Linear interpolation of the energies and the couplings within one nuclear step
struct Interpolation {
    old_energies: Array1<f64>,
    delta_energies: Array1<f64>,
    old_nacme: Array2<f64>,
    delta_nacme: Array2<f64>,
    dt: f64,
}

impl Interpolation {
    fn new(state: &ElectronicState, dt: f64) -> Self {
        Interpolation {
            old_energies: state.old_energies.clone(),
            delta_energies: &state.energies - &state.old_energies,
            old_nacme: state.old_nacme.clone(),
            delta_nacme: &state.nacme - &state.old_nacme,
            dt,
        }
    }

    fn at(&self, time: f64) -> (Array1<f64>, Array2<f64>) {
        let frac: f64 = time / self.dt;
        (
            &self.old_energies + &(&self.delta_energies * frac),
            &self.old_nacme + &(&self.delta_nacme * frac),
        )
    }
}

/// Calculate one step of the 4th order Runge-Kutta method
fn runge_kutta_step<D, F>(y: &Array<c64, D>, time: f64, h: f64, derivative: F) -> Array<c64, D>
where
    D: Dimension,
    F: Fn(f64, &Array<c64, D>) -> Array<c64, D>,
{
    let k_1: Array<c64, D> = derivative(time, y) * h;
    let k_2: Array<c64, D> = derivative(time + 0.5 * h, &(y + &(&k_1 * 0.5))) * h;
    let k_3: Array<c64, D> = derivative(time + 0.5 * h, &(y + &(&k_2 * 0.5))) * h;
    let k_4: Array<c64, D> = derivative(time + h, &(y + &k_3)) * h;

    y + &((k_1 + &k_2 * 2.0 + &k_3 * 2.0 + k_4) / 6.0)
}

/// dc_i/dt = -i E_i c_i - sum_j D_ij c_j
/// The energies are taken relative to the first state, which only changes the global phase.
fn coefficient_derivative(
    coefficients: ArrayView1<c64>,
    energies: ArrayView1<f64>,
    nacme: ArrayView2<f64>,
) -> Array1<c64> {
    let nstates: usize = coefficients.len();
    let reference: f64 = energies[0];
    Array1::from_shape_fn(nstates, |i| {
        let coupling: c64 = (0..nstates)
            .map(|j| coefficients[j] * nacme[[i, j]])
            .sum();
        c64::new(0.0, reference - energies[i]) * coefficients[i] - coupling
    })
}

/// Equation of motion of rho[i, j] = conj(c_i) c_j:
/// drho_ij/dt = i (E_i - E_j) rho_ij - sum_k (D_ik rho_kj + D_jk rho_ik)
fn density_derivative(
    rho: ArrayView2<c64>,
    energies: ArrayView1<f64>,
    nacme: ArrayView2<f64>,
) -> Array2<c64> {
    let nstates: usize = energies.len();
    Array2::from_shape_fn((nstates, nstates), |(i, j)| {
        let coupling: c64 = (0..nstates)
            .map(|k| rho[[k, j]] * nacme[[i, k]] + rho[[i, k]] * nacme[[j, k]])
            .sum();
        c64::new(0.0, energies[i] - energies[j]) * rho[[i, j]] - coupling
    })
}
