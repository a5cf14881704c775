use std::collections::BTreeMap;

use super::genome::{Genome, SEGMENTS, SEGMENT_BITS};
use crate::model::TraitDomain;

/// Trait biases in [0, 1], one per domain.
pub type TraitBiases = BTreeMap<TraitDomain, f64>;

/// Curiosity never reads below this.
pub const CURIOSITY_FLOOR: f64 = 0.30;

/// Read the genome as per-trait biases: fraction of set bits per segment.
pub fn express(genome: &Genome) -> TraitBiases {
    SEGMENTS
        .iter()
        .map(|domain| {
            let mut bias = genome.popcount(*domain) as f64 / SEGMENT_BITS as f64;
            if *domain == TraitDomain::Curiosity {
                bias = bias.max(CURIOSITY_FLOOR);
            }
            (*domain, bias)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helix::genome::{segment_range, GENOME_BYTES};
    use proptest::prelude::*;

    #[test]
    fn test_all_zero_genome() {
        let genome = Genome::from_bytes(&[0u8; GENOME_BYTES]).unwrap();
        let biases = express(&genome);
        assert_eq!(biases.len(), 8);
        assert_eq!(biases[&TraitDomain::Curiosity], CURIOSITY_FLOOR);
        assert_eq!(biases[&TraitDomain::Risk], 0.0);
    }

    #[test]
    fn test_half_set_segment() {
        let mut bytes = vec![0u8; GENOME_BYTES];
        bytes[segment_range(TraitDomain::Empathy)].fill(0x0F);
        let biases = express(&Genome::from_bytes(&bytes).unwrap());
        assert_eq!(biases[&TraitDomain::Empathy], 0.5);
    }

    proptest! {
        #[test]
        fn prop_biases_in_range(seed in any::<u64>()) {
            use rand::{rngs::StdRng, SeedableRng};
            let genome = Genome::fresh_with_rng(&mut StdRng::seed_from_u64(seed));
            let biases = express(&genome);
            prop_assert!(biases[&TraitDomain::Curiosity] >= CURIOSITY_FLOOR);
            for bias in biases.values() {
                prop_assert!((0.0..=1.0).contains(bias));
            }
        }
    }
}
