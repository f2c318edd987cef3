use crate::c64;
use crate::constants::EPS;
use crate::dynamics::electronic_state::ElectronicState;
use crate::dynamics::hopping_routines::HoppingState;
use crate::errors::ConfigError;
use crate::initialization::ElectronicObject;
use ndarray::prelude::*;

/// Decoherence correction of the electronic state, fixed for the whole trajectory.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DecoherenceScheme {
    None,
    /// Collapse onto the running state after every hop attempt
    Instantaneous,
    /// Energy based decoherence with the parameter C in hartree
    EnergyBased { parameter: f64 },
}

impl DecoherenceScheme {
    /// Resolve the name of the correction ("idc" or "edc", case insensitive).
    pub fn from_input(name: Option<&str>, edc_parameter: f64) -> Result<Self, ConfigError> {
        match name.map(|name| name.to_lowercase()).as_deref() {
            None => Ok(DecoherenceScheme::None),
            Some("idc") => Ok(DecoherenceScheme::Instantaneous),
            Some("edc") => Ok(DecoherenceScheme::EnergyBased {
                parameter: edc_parameter,
            }),
            Some(_) => Err(ConfigError::InvalidDecoherence(
                name.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DecoherenceScheme::None => "none",
            DecoherenceScheme::Instantaneous => "idc",
            DecoherenceScheme::EnergyBased { .. } => "edc",
        }
    }

    /// Apply the correction after the hopping decision of the current step.
    pub fn correct(
        &self,
        state: &mut ElectronicState,
        hopping: &HoppingState,
        object: ElectronicObject,
        kinetic_energy: f64,
        dt: f64,
    ) {
        match *self {
            DecoherenceScheme::None => {}
            DecoherenceScheme::Instantaneous => {
                if hopping.hop_occurred || hopping.hop_rejected {
                    instantaneous_decoherence(state, hopping.active_state, object);
                }
            }
            DecoherenceScheme::EnergyBased { parameter } => {
                if kinetic_energy > EPS {
                    energy_based_decoherence(
                        state,
                        hopping.active_state,
                        object,
                        parameter,
                        kinetic_energy,
                        dt,
                    );
                }
            }
        }
    }
}

/// Project the electronic state onto the running state.
pub fn instantaneous_decoherence(
    state: &mut ElectronicState,
    active_state: usize,
    object: ElectronicObject,
) {
    if object == ElectronicObject::Coefficient {
        state.coefficients.fill(c64::new(0.0, 0.0));
        state.coefficients[active_state] = c64::new(1.0, 0.0);
    }
    state.rho.fill(c64::new(0.0, 0.0));
    state.rho[[active_state, active_state]] = c64::new(1.0, 0.0);
}

/// Energy based decoherence correction, see
/// G. Granucci, M. Persico, J. Chem. Phys. 126, 134114 (2007).
/// The coherences between the running state a and the other states i decay with
/// tau_ia = (1 + C / E_kin) / |E_i - E_a|. The population removed from the
/// inactive states is given to the running state.
pub fn energy_based_decoherence(
    state: &mut ElectronicState,
    active_state: usize,
    object: ElectronicObject,
    parameter: f64,
    kinetic_energy: f64,
    dt: f64,
) {
    let energies: ArrayView1<f64> = state.energies.view();
    let factor: f64 = 1.0 + parameter / kinetic_energy;
    let decay: Array1<f64> = Array1::from_shape_fn(state.nstates, |i| {
        if i == active_state {
            1.0
        } else {
            (-dt * (energies[i] - energies[active_state]).abs() / factor).exp()
        }
    });
    let old_population: f64 = state.rho[[active_state, active_state]].re;

    match object {
        ElectronicObject::Coefficient => {
            let mut inactive_population: f64 = 0.0;
            for i in (0..state.nstates).filter(|&i| i != active_state) {
                state.coefficients[i] *= decay[i];
                inactive_population += state.coefficients[i].norm_sqr();
            }
            let remaining: f64 = (1.0 - inactive_population).max(0.0);
            if old_population > EPS {
                state.coefficients[active_state] *= (remaining / old_population).sqrt();
            } else {
                state.coefficients[active_state] = c64::new(remaining.sqrt(), 0.0);
            }
            state.density_from_coefficients();
        }
        ElectronicObject::Density => {
            for i in 0..state.nstates {
                for j in i..state.nstates {
                    state.rho[[i, j]] *= decay[i] * decay[j];
                    state.rho[[j, i]] = state.rho[[i, j]].conj();
                }
            }
            let inactive_population: f64 = (0..state.nstates)
                .filter(|&i| i != active_state)
                .map(|i| state.rho[[i, i]].re)
                .sum();
            let remaining: f64 = (1.0 - inactive_population).max(0.0);
            if old_population > EPS {
                let scale: f64 = (remaining / old_population).sqrt();
                state.rho.row_mut(active_state).mapv_inplace(|val| val * scale);
                state.rho.column_mut(active_state).mapv_inplace(|val| val * scale);
            } else {
                state.rho[[active_state, active_state]] = c64::new(remaining, 0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn superposition() -> ElectronicState {
        let coefficients: Array1<c64> = array![
            c64::new(0.5, 0.1),
            c64::new(0.3, -0.6),
            c64::new(-0.2, 0.4),
        ];
        let norm: f64 = coefficients.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        let coefficients: Array1<c64> = coefficients.mapv(|c| c / norm);
        let mut state = ElectronicState::new(3, 0, Some(coefficients.view()));
        state.energies = array![-1.0, -0.9, -0.7];
        state
    }

    fn hopped_to(active_state: usize) -> HoppingState {
        let mut hopping = HoppingState::new(3, 0);
        hopping.active_state = active_state;
        hopping.hop_occurred = active_state != 0;
        hopping
    }

    fn assert_hermitian_and_normalized(state: &ElectronicState) {
        assert_abs_diff_eq!(state.norm(), 1.0, epsilon = 1e-12);
        for i in 0..state.nstates {
            assert_abs_diff_eq!(state.rho[[i, i]].im, 0.0, epsilon = 1e-14);
            for j in 0..state.nstates {
                assert_abs_diff_eq!(state.rho[[i, j]].re, state.rho[[j, i]].re, epsilon = 1e-14);
                assert_abs_diff_eq!(state.rho[[i, j]].im, -state.rho[[j, i]].im, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn scheme_names_are_resolved() {
        assert_eq!(
            DecoherenceScheme::from_input(None, 0.1).unwrap(),
            DecoherenceScheme::None
        );
        assert_eq!(
            DecoherenceScheme::from_input(Some("IDC"), 0.1).unwrap(),
            DecoherenceScheme::Instantaneous
        );
        assert_eq!(
            DecoherenceScheme::from_input(Some("edc"), 0.3).unwrap(),
            DecoherenceScheme::EnergyBased { parameter: 0.3 }
        );
        assert!(matches!(
            DecoherenceScheme::from_input(Some("afssh"), 0.1),
            Err(ConfigError::InvalidDecoherence(name)) if name == "afssh"
        ));
    }

    #[test]
    fn instantaneous_collapse_gives_indicator_matrix() {
        let mut state = superposition();
        let hopping = hopped_to(2);
        DecoherenceScheme::Instantaneous.correct(
            &mut state,
            &hopping,
            ElectronicObject::Density,
            0.01,
            20.0,
        );

        let mut expected: Array2<c64> = Array2::zeros((3, 3));
        expected[[2, 2]] = c64::new(1.0, 0.0);
        assert_eq!(state.rho, expected);
    }

    #[test]
    fn instantaneous_collapse_is_idempotent() {
        for object in [ElectronicObject::Coefficient, ElectronicObject::Density] {
            let mut state = superposition();
            let hopping = hopped_to(1);
            DecoherenceScheme::Instantaneous.correct(&mut state, &hopping, object, 0.01, 20.0);
            let once: ElectronicState = state.clone();
            DecoherenceScheme::Instantaneous.correct(&mut state, &hopping, object, 0.01, 20.0);

            assert_eq!(state.rho, once.rho);
            assert_eq!(state.coefficients, once.coefficients);
        }
        let mut state = superposition();
        instantaneous_decoherence(&mut state, 1, ElectronicObject::Coefficient);
        assert_eq!(state.coefficients[1], c64::new(1.0, 0.0));
        assert_eq!(state.coefficients[0], c64::new(0.0, 0.0));
    }

    #[test]
    fn instantaneous_collapse_needs_a_hop_attempt() {
        let mut state = superposition();
        let before: Array2<c64> = state.rho.clone();
        let mut hopping = hopped_to(0);
        DecoherenceScheme::Instantaneous.correct(
            &mut state,
            &hopping,
            ElectronicObject::Density,
            0.01,
            20.0,
        );
        assert_eq!(state.rho, before);

        hopping.hop_rejected = true;
        DecoherenceScheme::Instantaneous.correct(
            &mut state,
            &hopping,
            ElectronicObject::Density,
            0.01,
            20.0,
        );
        assert_eq!(state.populations(), array![1.0, 0.0, 0.0]);
    }

    #[test]
    fn energy_based_correction_conserves_trace_and_hermiticity() {
        for object in [ElectronicObject::Coefficient, ElectronicObject::Density] {
            for active_state in 0..3 {
                let mut state = superposition();
                let old_populations: Array1<f64> = state.populations();
                energy_based_decoherence(&mut state, active_state, object, 0.1, 0.02, 20.0);

                assert_hermitian_and_normalized(&state);
                for i in (0..3).filter(|&i| i != active_state) {
                    assert!(state.populations()[i] < old_populations[i]);
                }
                assert!(state.populations()[active_state] > old_populations[active_state]);
            }
        }
    }

    #[test]
    fn representations_give_the_same_populations() {
        let mut coefficient_state = superposition();
        let mut density_state = superposition();
        let hopping = hopped_to(1);
        let scheme = DecoherenceScheme::EnergyBased { parameter: 0.1 };
        scheme.correct(
            &mut coefficient_state,
            &hopping,
            ElectronicObject::Coefficient,
            0.05,
            20.0,
        );
        scheme.correct(
            &mut density_state,
            &hopping,
            ElectronicObject::Density,
            0.05,
            20.0,
        );

        for i in 0..3 {
            assert_abs_diff_eq!(
                coefficient_state.coefficients[i].norm_sqr(),
                density_state.rho[[i, i]].re,
                epsilon = 1e-12
            );
            for j in 0..3 {
                assert_abs_diff_eq!(
                    coefficient_state.rho[[i, j]].re,
                    density_state.rho[[i, j]].re,
                    epsilon = 1e-12
                );
                assert_abs_diff_eq!(
                    coefficient_state.rho[[i, j]].im,
                    density_state.rho[[i, j]].im,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn energy_based_correction_needs_kinetic_energy() {
        let mut state = superposition();
        let before: ElectronicState = state.clone();
        let hopping = hopped_to(1);
        DecoherenceScheme::EnergyBased { parameter: 0.1 }.correct(
            &mut state,
            &hopping,
            ElectronicObject::Density,
            0.0,
            20.0,
        );
        assert_eq!(state.rho, before.rho);
        assert_eq!(state.coefficients, before.coefficients);
    }

    #[test]
    fn empty_running_state_receives_the_remaining_population() {
        let coefficients: Array1<c64> = array![c64::new(0.0, 0.0), c64::new(1.0, 0.0)];
        for object in [ElectronicObject::Coefficient, ElectronicObject::Density] {
            let mut state = ElectronicState::new(2, 0, Some(coefficients.view()));
            state.energies = array![-1.0, -0.9];
            energy_based_decoherence(&mut state, 0, object, 0.1, 0.02, 20.0);

            assert!(state.populations().iter().all(|p| p.is_finite()));
            assert!(state.populations()[0] > 0.0);
            assert_abs_diff_eq!(state.norm(), 1.0, epsilon = 1e-12);
        }
    }
}
