use rand::Rng;

use super::genome::{segment_range, Genome};
use crate::model::{TagTension, TraitDomain};

/// Base per-bit flip probability per unit of tension and weight.
pub const BASE_FLIP_RATE: f64 = 0.0005;

/// Locked per-trait mutation weights. Identity sits far below the rest so
/// the core self drifts slowest.
pub fn mutation_weight(domain: TraitDomain) -> f64 {
    match domain {
        TraitDomain::Curiosity => 1.00,
        TraitDomain::Caution => 0.80,
        TraitDomain::Humor => 0.70,
        TraitDomain::Verbosity => 0.70,
        TraitDomain::Depth => 0.60,
        TraitDomain::Risk => 1.00,
        TraitDomain::Empathy => 0.50,
        TraitDomain::Identity => 0.05,
    }
}

/// Flip bits in each tensioned segment with probability
/// `tension × weight × BASE_FLIP_RATE` per bit.
pub fn mutate(genome: &Genome, tension: &TagTension, step: u64) -> Genome {
    mutate_with_rng(genome, tension, step, &mut rand::thread_rng())
}

pub fn mutate_with_rng<R: Rng + ?Sized>(
    genome: &Genome,
    tension: &TagTension,
    step: u64,
    rng: &mut R,
) -> Genome {
    let mut bytes: Option<Vec<u8>> = None;
    let mut flipped = 0usize;

    for (domain, t) in tension {
        if *t <= 0.0 {
            continue;
        }
        let p = (t * mutation_weight(*domain) * BASE_FLIP_RATE).min(1.0);
        for byte_index in segment_range(*domain) {
            for bit in 0..8 {
                if rng.gen::<f64>() < p {
                    let buf = bytes.get_or_insert_with(|| genome.to_bytes());
                    buf[byte_index] ^= 1 << bit;
                    flipped += 1;
                }
            }
        }
    }

    match bytes {
        Some(buf) => {
            tracing::debug!(step, flipped, "genome mutated");
            Genome::from_vec_unchecked(buf)
        }
        None => genome.clone(),
    }
}
