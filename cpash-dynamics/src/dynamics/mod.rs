pub use decoherence::*;
pub use electronic_state::*;
pub use hopping_routines::*;
pub use random::*;
pub use schroedinger_integration::*;
pub use simulation::*;

pub mod decoherence;
pub mod electronic_state;
pub mod hopping_routines;
pub mod random;
pub mod schroedinger_integration;
pub mod simulation;
