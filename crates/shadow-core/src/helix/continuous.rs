//! Legacy continuous genome: 512 floats with evolvable segment weights.
//!
//! Kept as a standalone format. Identity records always carry the
//! bit-encoded [`Genome`](super::Genome); there is no conversion between the two.

use std::path::Path;

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{TagTension, TraitDomain};

pub const CONTINUOUS_VALUES: usize = 512;
pub const VALUES_PER_SEGMENT: usize = 64;
pub const DEFAULT_MUTATION_RATE: f64 = 0.008;
pub const CONTINUOUS_CURIOSITY_FLOOR: f64 = 0.4;
pub const MIN_SEGMENT_WEIGHT: f64 = 0.01;
pub const MAX_SEGMENT_WEIGHT: f64 = 2.0;

/// Segment order. The identity domain feeds the last, `core_stability`, segment.
pub const CONTINUOUS_SEGMENTS: [TraitDomain; 8] = [
    TraitDomain::Curiosity,
    TraitDomain::Caution,
    TraitDomain::Humor,
    TraitDomain::Verbosity,
    TraitDomain::Depth,
    TraitDomain::Risk,
    TraitDomain::Empathy,
    TraitDomain::Identity,
];

pub const DEFAULT_SEGMENT_WEIGHTS: [f64; 8] = [1.20, 0.90, 0.80, 0.75, 0.70, 1.10, 0.60, 0.10];

/// Name the legacy format uses for each segment.
pub fn segment_name(domain: TraitDomain) -> &'static str {
    match domain {
        TraitDomain::Identity => "core_stability",
        other => other.as_str(),
    }
}

fn segment_index(domain: TraitDomain) -> usize {
    CONTINUOUS_SEGMENTS
        .iter()
        .position(|d| *d == domain)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContinuousGenome")]
pub struct ContinuousGenome {
    values: Vec<f64>,
    segment_weights: Vec<f64>,
    mutation_rate: f64,
}

#[derive(Deserialize)]
struct RawContinuousGenome {
    values: Vec<f64>,
    segment_weights: Vec<f64>,
    mutation_rate: f64,
}

impl TryFrom<RawContinuousGenome> for ContinuousGenome {
    type Error = CoreError;

    fn try_from(raw: RawContinuousGenome) -> Result<Self, Self::Error> {
        Self::new(raw.values, raw.segment_weights, raw.mutation_rate)
    }
}

impl ContinuousGenome {
    /// Random values in [0.3, 0.7], default weights and rate.
    pub fn fresh() -> Self {
        Self::fresh_with_rng(&mut rand::thread_rng())
    }

    pub fn fresh_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let uniform = Uniform::new_inclusive(0.3, 0.7);
        Self {
            values: (0..CONTINUOUS_VALUES).map(|_| uniform.sample(rng)).collect(),
            segment_weights: DEFAULT_SEGMENT_WEIGHTS.to_vec(),
            mutation_rate: DEFAULT_MUTATION_RATE,
        }
    }

    pub fn new(values: Vec<f64>, segment_weights: Vec<f64>, mutation_rate: f64) -> Result<Self, CoreError> {
        let genome = Self {
            values,
            segment_weights,
            mutation_rate,
        };
        genome.validate()?;
        Ok(genome)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.values.len() != CONTINUOUS_VALUES {
            return Err(CoreError::Validation(format!(
                "continuous genome must have exactly {CONTINUOUS_VALUES} values, got {}",
                self.values.len()
            )));
        }
        if self.segment_weights.len() != CONTINUOUS_SEGMENTS.len() {
            return Err(CoreError::Validation(format!(
                "continuous genome must have exactly 8 segment weights, got {}",
                self.segment_weights.len()
            )));
        }
        if let Some(v) = self.values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(CoreError::Validation(format!(
                "continuous genome values must be within [0, 1], got {v}"
            )));
        }
        if let Some(w) = self
            .segment_weights
            .iter()
            .find(|w| !(MIN_SEGMENT_WEIGHT..=MAX_SEGMENT_WEIGHT).contains(*w))
        {
            return Err(CoreError::Validation(format!(
                "segment weights must be within [{MIN_SEGMENT_WEIGHT}, {MAX_SEGMENT_WEIGHT}], got {w}"
            )));
        }
        if !self.mutation_rate.is_finite() || self.mutation_rate < 0.0 {
            return Err(CoreError::Validation(format!(
                "mutation rate must be finite and non-negative, got {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn segment_weights(&self) -> &[f64] {
        &self.segment_weights
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Mean of a trait's 64 values. Curiosity never reads below 0.4.
    pub fn get_trait(&self, domain: TraitDomain) -> f64 {
        let start = segment_index(domain) * VALUES_PER_SEGMENT;
        let segment = &self.values[start..start + VALUES_PER_SEGMENT];
        let mean = segment.iter().sum::<f64>() / VALUES_PER_SEGMENT as f64;
        if domain == TraitDomain::Curiosity {
            mean.max(CONTINUOUS_CURIOSITY_FLOOR)
        } else {
            mean
        }
    }

    pub fn get_all_traits(&self) -> TagTension {
        CONTINUOUS_SEGMENTS
            .iter()
            .map(|d| (*d, self.get_trait(*d)))
            .collect()
    }

    pub fn mutate(&mut self, tension: &TagTension) {
        self.mutate_with_rng(tension, &mut rand::thread_rng());
    }

    /// Gaussian drift per segment, `σ = tension × weight × rate`; weights
    /// themselves drift twenty times slower whenever any tension is present.
    pub fn mutate_with_rng<R: Rng + ?Sized>(&mut self, tension: &TagTension, rng: &mut R) {
        for (i, domain) in CONTINUOUS_SEGMENTS.iter().enumerate() {
            let t = tension.get(domain).copied().unwrap_or(0.0);
            let sigma = t * self.segment_weights[i] * self.mutation_rate;
            if sigma > 0.0 {
                if let Ok(noise) = Normal::new(0.0, sigma) {
                    let start = i * VALUES_PER_SEGMENT;
                    for value in &mut self.values[start..start + VALUES_PER_SEGMENT] {
                        *value += noise.sample(rng);
                    }
                }
            }
        }
        for value in &mut self.values {
            *value = value.clamp(0.0, 1.0);
        }

        if tension.values().any(|t| *t != 0.0) {
            if let Ok(noise) = Normal::new(0.0, self.mutation_rate / 20.0) {
                for weight in &mut self.segment_weights {
                    *weight = (*weight + noise.sample(rng)).clamp(MIN_SEGMENT_WEIGHT, MAX_SEGMENT_WEIGHT);
                }
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl Default for ContinuousGenome {
    fn default() -> Self {
        Self::fresh()
    }
}
