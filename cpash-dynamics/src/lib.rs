//! Fewest-switches surface hopping along a frozen (precomputed) nuclear path.
//!
//! Nuclear positions, velocities, energies, forces and nonadiabatic coupling
//! matrix elements are read for every step from a [FrozenPathSource](interface::FrozenPathSource).
//! The electronic density matrix (or coefficient vector) is propagated along
//! this path, the running state is chosen stochastically after every step and an
//! optional decoherence correction is applied.

pub mod constants;
pub mod defaults;
pub mod dynamics;
pub mod errors;
pub mod initialization;
pub mod interface;
pub mod output;

/// Complex number type used for electronic coefficients and density matrices.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex64;
