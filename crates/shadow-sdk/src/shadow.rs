use std::collections::BTreeSet;

use shadow_core::helix::{express, mutate, TraitBiases};
use shadow_core::model::{tension_by_tag, BeliefId, TagTension};
use shadow_core::{IdentityRecord, Mode, ShadowConfig};
use shadow_vault::PassphraseSource;

use crate::collaborators::{ContradictionDetector, Generator, PromptEcho, DETECTOR_MIN_CONFIDENCE};
use crate::error::SdkError;
use crate::lifecycle::Lifecycle;
use crate::thread::{Role, Thread};
use crate::trace::{Trace, TraceFrame, TraceSink};

/// What one ingest produced.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub response: String,
    /// Step after the last message.
    pub step: u64,
    /// Messages that became beliefs.
    pub ingested: usize,
    pub synthesized: usize,
    pub merged: usize,
    pub tension: TagTension,
}

/// The evolving mind: one identity, driven message by message.
///
/// Each user or assistant message is inserted as a belief and the ecology
/// runs decay, synthesis, merge, tension and genome mutation in that order.
/// Generation happens once at the end against the expressed biases, after
/// which the new record is committed (except in demo mode).
pub struct Shadow {
    lifecycle: Lifecycle,
    identity: IdentityRecord,
    generator: Box<dyn Generator>,
    detector: Option<Box<dyn ContradictionDetector>>,
    user_confidence: f64,
    assistant_confidence: f64,
}

impl Shadow {
    pub fn new(mut lifecycle: Lifecycle) -> Result<Self, SdkError> {
        let identity = lifecycle.get_identity()?;
        let defaults = ShadowConfig::default();
        Ok(Self {
            lifecycle,
            identity,
            generator: Box::new(PromptEcho),
            detector: None,
            user_confidence: defaults.user_confidence,
            assistant_confidence: defaults.assistant_confidence,
        })
    }

    pub fn from_config(config: &ShadowConfig, passphrase: Box<dyn PassphraseSource>) -> Result<Self, SdkError> {
        let lifecycle = Lifecycle::from_config(config, passphrase)?;
        Ok(Self::new(lifecycle)?.with_confidences(config.user_confidence, config.assistant_confidence))
    }

    pub fn with_generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn ContradictionDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_confidences(mut self, user: f64, assistant: f64) -> Self {
        self.user_confidence = user;
        self.assistant_confidence = assistant;
        self
    }

    pub fn mode(&self) -> Mode {
        self.lifecycle.mode()
    }

    pub fn step(&self) -> u64 {
        self.identity.step()
    }

    pub fn identity(&self) -> &IdentityRecord {
        &self.identity
    }

    pub fn biases(&self) -> TraitBiases {
        express(self.identity.genome())
    }

    pub fn tension(&self) -> TagTension {
        tension_by_tag(self.identity.lattice(), self.identity.step())
    }

    /// Process a thread, returning the generated response and a trace with
    /// one frame per ingested message.
    pub fn ingest(&mut self, thread: &Thread) -> Result<(IngestReport, Trace), SdkError> {
        let mut trace = Trace::new();
        let report = self.ingest_with_sink(thread, &mut trace)?;
        Ok((report, trace))
    }

    pub fn ingest_with_sink(
        &mut self,
        thread: &Thread,
        sink: &mut dyn TraceSink,
    ) -> Result<IngestReport, SdkError> {
        let mut record = self.identity.clone();
        let mut lattice = record.lattice().clone();
        let mut genome = record.genome().clone();
        let mut tension = tension_by_tag(&lattice, record.step());
        let mut ingested = 0;
        let mut synthesized = 0;
        let mut merged = 0;

        for message in &thread.messages {
            let Some(confidence) = self.confidence_for(message.role) else {
                continue;
            };
            record = record.increment_step();
            let step = record.step();

            let prior: Vec<(BeliefId, String)> = lattice
                .nodes()
                .map(|n| (n.id.clone(), n.content.clone()))
                .collect();
            let id = lattice.insert_belief(&message.content, confidence, message.role.as_str(), step);
            if let Some(detector) = &self.detector {
                let texts: Vec<&str> = prior.iter().map(|(_, c)| c.as_str()).collect();
                for (index, score) in detector.find_contradictions(&message.content, &texts) {
                    if score < DETECTOR_MIN_CONFIDENCE {
                        continue;
                    }
                    if let Some((other, _)) = prior.get(index) {
                        lattice.relate(&id, other, -score)?;
                    }
                }
            }

            let active: BTreeSet<BeliefId> = [id].into_iter().collect();
            lattice.decay(step, &active);
            let ids = lattice.node_ids();
            synthesized += lattice.synthesize(step, &ids).len();
            let ids = lattice.node_ids();
            merged += lattice.merge(step, &ids).len();

            tension = tension_by_tag(&lattice, step);
            genome = mutate(&genome, &tension, step);
            sink.record(TraceFrame::capture(step, &lattice, &tension));
            ingested += 1;
        }

        let record = record.with_state(genome, lattice);
        let biases = express(record.genome());
        let response = self.generator.generate(&thread.messages, &biases)?;

        self.lifecycle.persist_identity(record.clone())?;
        tracing::debug!(
            step = record.step(),
            ingested,
            synthesized,
            merged,
            "ingest complete"
        );
        self.identity = record;

        Ok(IngestReport {
            response,
            step: self.identity.step(),
            ingested,
            synthesized,
            merged,
            tension,
        })
    }

    fn confidence_for(&self, role: Role) -> Option<f64> {
        match role {
            Role::User => Some(self.user_confidence),
            Role::Assistant => Some(self.assistant_confidence),
            Role::System | Role::Tool => None,
        }
    }
}

impl std::fmt::Debug for Shadow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shadow")
            .field("mode", &self.mode())
            .field("step", &self.step())
            .field("id", &self.identity.identity_id())
            .finish()
    }
}
