use rand::distributions::Standard;
use rand::prelude::*;
use std::collections::VecDeque;

/// Source of uniform random numbers in [0, 1) for the hopping decision
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

/// Pseudo random numbers from a [StdRng]. Seeded from the configuration or from entropy.
pub struct SeededUniform {
    rng: StdRng,
}

impl SeededUniform {
    pub fn new(seed: Option<u64>) -> Self {
        let rng: StdRng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SeededUniform { rng }
    }
}

impl UniformSource for SeededUniform {
    fn next_uniform(&mut self) -> f64 {
        self.rng.sample(Standard)
    }
}

/// Replays a fixed sequence of numbers. Once the sequence is exhausted
/// the last number is repeated, an empty sequence gives 0.0.
pub struct FixedSequence {
    numbers: VecDeque<f64>,
    last: f64,
}

impl FixedSequence {
    pub fn new(numbers: Vec<f64>) -> Self {
        let last: f64 = numbers.last().copied().unwrap_or(0.0);
        FixedSequence {
            numbers: numbers.into(),
            last,
        }
    }
}

impl UniformSource for FixedSequence {
    fn next_uniform(&mut self) -> f64 {
        self.numbers.pop_front().unwrap_or(self.last)
    }
}
