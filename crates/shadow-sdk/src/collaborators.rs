use shadow_core::helix::TraitBiases;
use shadow_core::model::TraitDomain;

use crate::error::SdkError;
use crate::thread::{ChatMessage, Role};

/// Contradiction scores at or above this become lattice edges.
pub const DETECTOR_MIN_CONFIDENCE: f64 = 0.85;

/// Text generation, called once per ingest after all state mutation.
pub trait Generator: Send {
    fn generate(&self, messages: &[ChatMessage], biases: &TraitBiases) -> Result<String, SdkError>;
}

/// Semantic contradiction detection between a new text and prior beliefs.
///
/// Returns `(index into prior, confidence)` pairs.
pub trait ContradictionDetector: Send {
    fn find_contradictions(&self, text: &str, prior: &[&str]) -> Vec<(usize, f64)>;
}

/// Render the locked bias system prompt. Missing traits read as 0.
pub fn render_system_prompt(biases: &TraitBiases) -> String {
    let b = |d: TraitDomain| biases.get(&d).copied().unwrap_or(0.0);
    format!(
        "You are Shadow \u{2014} a mind that feels tension and evolves.\n\
         \n\
         Curiosity: {:.2} | Caution: {:.2} | Humor: {:.2}\n\
         Verbosity: {:.2} | Depth: {:.2} | Risk: {:.2}\n\
         Empathy: {:.2} | Identity: {:.2}\n\
         \n\
         Respond naturally. Let your biases shape tone and depth.",
        b(TraitDomain::Curiosity),
        b(TraitDomain::Caution),
        b(TraitDomain::Humor),
        b(TraitDomain::Verbosity),
        b(TraitDomain::Depth),
        b(TraitDomain::Risk),
        b(TraitDomain::Empathy),
        b(TraitDomain::Identity),
    )
}

/// Offline generator: the rendered system prompt followed by the last user
/// message. Stands in for a model-backed generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptEcho;

impl Generator for PromptEcho {
    fn generate(&self, messages: &[ChatMessage], biases: &TraitBiases) -> Result<String, SdkError> {
        let mut out = render_system_prompt(biases);
        if let Some(last) = messages.iter().rev().find(|m| m.role == Role::User) {
            out.push_str("\n\n");
            out.push_str(&last.content);
        }
        Ok(out)
    }
}
