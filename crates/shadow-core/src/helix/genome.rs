use std::sync::Arc;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::TraitDomain;

/// Total genome size in bytes (8192 bits).
pub const GENOME_BYTES: usize = 1024;
/// Bytes per trait segment.
pub const SEGMENT_BYTES: usize = 128;
/// Bits per trait segment.
pub const SEGMENT_BITS: usize = SEGMENT_BYTES * 8;

/// Locked segment layout. Position in this table is the segment index.
pub const SEGMENTS: [TraitDomain; 8] = [
    TraitDomain::Curiosity,
    TraitDomain::Caution,
    TraitDomain::Humor,
    TraitDomain::Verbosity,
    TraitDomain::Depth,
    TraitDomain::Risk,
    TraitDomain::Empathy,
    TraitDomain::Identity,
];

/// Byte range of a trait's segment within the genome.
pub fn segment_range(domain: TraitDomain) -> std::ops::Range<usize> {
    let index = SEGMENTS
        .iter()
        .position(|d| *d == domain)
        .unwrap_or_default();
    let start = index * SEGMENT_BYTES;
    start..start + SEGMENT_BYTES
}

/// Immutable 1024-byte trait genome.
///
/// Clones share the underlying buffer. Mutation produces a new value, or
/// hands back the same buffer when no bit changed; see [`Genome::same_as`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Genome {
    bytes: Arc<[u8]>,
}

impl Genome {
    /// A uniformly random genome.
    pub fn fresh() -> Self {
        Self::fresh_with_rng(&mut rand::thread_rng())
    }

    pub fn fresh_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = vec![0u8; GENOME_BYTES];
        rng.fill_bytes(&mut bytes);
        Self { bytes: bytes.into() }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() != GENOME_BYTES {
            return Err(CoreError::Validation(format!(
                "genome must be {GENOME_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: bytes.into(),
        })
    }

    pub fn raw(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    pub fn segment(&self, domain: TraitDomain) -> &[u8] {
        &self.bytes[segment_range(domain)]
    }

    /// Number of set bits in a trait's segment.
    pub fn popcount(&self, domain: TraitDomain) -> u32 {
        self.segment(domain).iter().map(|b| b.count_ones()).sum()
    }

    /// True when both values share the same buffer.
    pub fn same_as(&self, other: &Genome) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    pub(crate) fn from_vec_unchecked(bytes: Vec<u8>) -> Self {
        Self { bytes: bytes.into() }
    }
}

impl Default for Genome {
    fn default() -> Self {
        Self::fresh()
    }
}

impl TryFrom<Vec<u8>> for Genome {
    type Error = CoreError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_bytes(&bytes)
    }
}

impl From<Genome> for Vec<u8> {
    fn from(genome: Genome) -> Self {
        genome.to_bytes()
    }
}
