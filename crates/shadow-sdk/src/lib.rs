//! Host-facing API for shadowecology.
//!
//! # Example
//! ```no_run
//! use shadow_sdk::{ChatMessage, Lifecycle, Shadow, Thread};
//!
//! let mut shadow = Shadow::new(Lifecycle::demo()).unwrap();
//! let thread = Thread::new(vec![
//!     ChatMessage::user("I love danger"),
//!     ChatMessage::assistant("Danger will kill me"),
//! ]);
//! let (report, trace) = shadow.ingest(&thread).unwrap();
//! println!("{}", report.response);
//! trace.write_jsonl(std::path::Path::new("trace.jsonl")).unwrap();
//! ```

mod collaborators;
mod error;
mod lifecycle;
mod shadow;
mod thread;
mod trace;

pub use collaborators::{
    render_system_prompt, ContradictionDetector, Generator, PromptEcho, DETECTOR_MIN_CONFIDENCE,
};
pub use error::SdkError;
pub use lifecycle::Lifecycle;
pub use shadow::{IngestReport, Shadow};
pub use thread::{ChatMessage, Role, Thread};
pub use trace::{Trace, TraceFrame, TraceSink};

// Re-export core types hosts commonly need
pub use shadow_core::helix::TraitBiases;
pub use shadow_core::model::{TagTension, TraitDomain};
pub use shadow_core::{IdentityRecord, Mode, ShadowConfig};
pub use shadow_vault::{EnvPassphrase, FixedPassphrase, PassphraseSource};
