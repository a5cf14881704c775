use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::helix::Genome;
use crate::model::Lattice;

/// The only schema version this build reads or writes.
pub const SCHEMA_VERSION: u32 = 1;

/// Identity used in demo mode. Never persisted.
pub const DEMO_IDENTITY_ID: &str = "demo_ephemeral";

/// Default identity for persistent modes.
pub const DEFAULT_IDENTITY_ID: &str = "shadow_main";

/// Identity ids become file names, so they are limited to ASCII
/// alphanumerics, `-` and `_`.
pub fn validate_identity_id(id: &str) -> Result<(), CoreError> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidId(id.to_string()))
    }
}

/// Immutable snapshot of a whole personality: genome, belief lattice and the
/// step counter. The unit of persistence.
///
/// Every "mutator" returns a new record; the step only advances through
/// [`IdentityRecord::increment_step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    schema_version: u32,
    identity_id: String,
    created_at: DateTime<Utc>,
    step: u64,
    genome: Genome,
    lattice: Lattice,
}

impl IdentityRecord {
    /// Random genome, empty lattice, step 0.
    pub fn fresh(identity_id: &str) -> Result<Self, CoreError> {
        Self::fresh_with_rng(identity_id, &mut rand::thread_rng())
    }

    pub fn fresh_with_rng<R: Rng + ?Sized>(identity_id: &str, rng: &mut R) -> Result<Self, CoreError> {
        validate_identity_id(identity_id)?;
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            identity_id: identity_id.to_string(),
            created_at: Utc::now(),
            step: 0,
            genome: Genome::fresh_with_rng(rng),
            lattice: Lattice::new(),
        })
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn increment_step(&self) -> Self {
        Self {
            step: self.step + 1,
            ..self.clone()
        }
    }

    /// Same identity and step, new genome and lattice.
    pub fn with_state(&self, genome: Genome, lattice: Lattice) -> Self {
        Self {
            schema_version: self.schema_version,
            identity_id: self.identity_id.clone(),
            created_at: self.created_at,
            step: self.step,
            genome,
            lattice,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a record, rejecting any schema version but the current one
    /// before the body is parsed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let found: u32 = bincode::deserialize(bytes)?;
        if found != SCHEMA_VERSION {
            return Err(CoreError::UnsupportedSchema {
                found,
                expected: SCHEMA_VERSION,
            });
        }
        let record: Self = bincode::deserialize(bytes)?;
        validate_identity_id(&record.identity_id)?;
        Ok(record)
    }
}
