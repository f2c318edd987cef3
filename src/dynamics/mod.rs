mod interface;

pub use interface::SampledTrajectory;
