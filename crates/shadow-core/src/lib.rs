//! Belief ecology engine for shadowecology.
//!
//! A [`Lattice`](model::Lattice) of beliefs decays, merges and synthesizes
//! conditional beliefs from contradictions; the tension those contradictions
//! carry mutates a bit-encoded [`Genome`](helix::Genome). Both live inside an
//! immutable [`IdentityRecord`](identity::IdentityRecord).
//!
//! # Example
//! ```
//! use shadow_core::helix::{express, mutate};
//! use shadow_core::model::{tension_by_tag, Lattice};
//!
//! let mut lattice = Lattice::new();
//! lattice.insert_belief("I love danger", 0.95, "user", 1);
//! lattice.insert_belief("Danger will kill me", 0.95, "assistant", 1);
//!
//! let tension = tension_by_tag(&lattice, 1);
//! let genome = mutate(&shadow_core::helix::Genome::fresh(), &tension, 1);
//! let biases = express(&genome);
//! assert_eq!(biases.len(), 8);
//! ```

pub mod config;
pub mod error;
pub mod helix;
pub mod identity;
pub mod model;

pub use config::{Mode, ShadowConfig};
pub use error::CoreError;
pub use identity::IdentityRecord;
