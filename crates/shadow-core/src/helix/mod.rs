pub mod continuous;
pub mod express;
pub mod genome;
pub mod mutate;

pub use continuous::ContinuousGenome;
pub use express::{express, TraitBiases, CURIOSITY_FLOOR};
pub use genome::{Genome, GENOME_BYTES, SEGMENTS};
pub use mutate::{mutate, mutate_with_rng, mutation_weight};
