pub mod belief;
pub mod lattice;
pub mod similarity;
pub mod tags;
pub mod tension;

pub use belief::{BeliefId, BeliefNode};
pub use lattice::{EdgeMap, Lattice, MergeOutcome};
pub use similarity::similarity;
pub use tags::{classify_sentiment, extract_tags, Sentiment, TraitDomain, UNTAGGED};
pub use tension::{node_tension, tension_by_tag, TagTension};
