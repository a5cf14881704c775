use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::belief::{clamp_confidence, BeliefId, BeliefNode};
use super::similarity::similarity;
use super::tags::{classify_sentiment, extract_tags, UNTAGGED};
use super::tension::node_tension;
use crate::error::CoreError;

/// Outgoing edges per source node: source -> (target -> signed strength).
pub type EdgeMap = BTreeMap<BeliefId, BTreeMap<BeliefId, f64>>;

/// Multiplier applied to inactive beliefs on every decay pass.
pub const DECAY_FACTOR: f64 = 0.99;
/// Edge weight seeded between beliefs of opposite sentiment.
pub const CONTRADICTION_WEIGHT: f64 = -1.0;
/// Edge weight seeded between beliefs of matching sentiment.
pub const SUPPORT_WEIGHT: f64 = 0.5;
/// Edge weight for synthesis parents and merge provenance.
pub const PROVENANCE_WEIGHT: f64 = 1.0;
/// Minimum similarity for two beliefs to be fused.
pub const MERGE_SIMILARITY: f64 = 0.95;
/// Exclusive lower similarity bound for conditional synthesis.
pub const SYNTHESIS_SIMILARITY_FLOOR: f64 = 0.85;
/// Both parents must hold at least this confidence to be synthesized.
pub const SYNTHESIS_MIN_CONFIDENCE: f64 = 0.6;
/// At least one parent must carry this much tension to be synthesized.
pub const TENSION_THRESHOLD: f64 = 1.5;

/// Result of fusing two near-identical beliefs.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub winner: BeliefId,
    pub loser: BeliefId,
    pub confidence: f64,
}

/// The belief graph: nodes plus directed, signed relation edges.
///
/// Invariants held at this API boundary:
/// - every node has an entry in the edge map (possibly empty);
/// - no edge targets a node that is not present;
/// - confidence stays in [0, 1] and tags are never empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LatticeParts")]
pub struct Lattice {
    nodes: BTreeMap<BeliefId, BeliefNode>,
    edges: EdgeMap,
}

#[derive(Deserialize)]
struct LatticeParts {
    nodes: BTreeMap<BeliefId, BeliefNode>,
    edges: EdgeMap,
}

impl From<LatticeParts> for Lattice {
    fn from(parts: LatticeParts) -> Self {
        let mut lattice = Lattice {
            nodes: parts.nodes,
            edges: parts.edges,
        };
        let repaired = lattice.repair();
        if repaired > 0 {
            tracing::warn!("Repaired {repaired} lattice invariant violations on load");
        }
        lattice
    }
}

impl Lattice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &BeliefId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &BeliefId) -> Option<&BeliefNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &BeliefNode> {
        self.nodes.values()
    }

    pub fn node_map(&self) -> &BTreeMap<BeliefId, BeliefNode> {
        &self.nodes
    }

    pub fn node_ids(&self) -> BTreeSet<BeliefId> {
        self.nodes.keys().cloned().collect()
    }

    pub fn edges(&self) -> &EdgeMap {
        &self.edges
    }

    pub fn edges_from(&self, id: &BeliefId) -> Option<&BTreeMap<BeliefId, f64>> {
        self.edges.get(id)
    }

    pub fn edge(&self, from: &BeliefId, to: &BeliefId) -> Option<f64> {
        self.edges.get(from).and_then(|targets| targets.get(to)).copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// Count of outgoing edges with negative weight.
    pub fn contradiction_count(&self, id: &BeliefId) -> usize {
        self.edges
            .get(id)
            .map(|targets| targets.values().filter(|w| **w < 0.0).count())
            .unwrap_or(0)
    }

    /// Insert a new belief and seed sentiment edges against existing nodes.
    ///
    /// Every existing node sharing a trait-domain tag with the new one is
    /// compared by sentiment: opposite polarity adds a symmetric
    /// contradiction edge, matching polarity a symmetric support edge.
    pub fn insert_belief(
        &mut self,
        content: &str,
        confidence: f64,
        source: &str,
        current_step: u64,
    ) -> BeliefId {
        let id = BeliefId::new();
        let node = BeliefNode {
            id: id.clone(),
            content: content.to_string(),
            confidence: clamp_confidence(confidence),
            source: source.to_string(),
            tags: extract_tags(content),
            created_step: current_step,
            last_active_step: current_step,
        };

        let sentiment = classify_sentiment(content);
        let mut seeded = Vec::new();
        for existing in self.nodes.values() {
            if !node.shares_domain_with(existing) {
                continue;
            }
            let other = classify_sentiment(&existing.content);
            if sentiment.opposes(other) {
                seeded.push((existing.id.clone(), CONTRADICTION_WEIGHT));
            } else if sentiment.agrees(other) {
                seeded.push((existing.id.clone(), SUPPORT_WEIGHT));
            }
        }

        self.nodes.insert(id.clone(), node);
        self.edges.insert(id.clone(), BTreeMap::new());
        for (other, weight) in seeded {
            self.set_edge(&id, &other, weight);
            self.set_edge(&other, &id, weight);
        }

        id
    }

    /// Add (or overwrite) a directed edge between two existing nodes.
    pub fn add_edge(&mut self, from: &BeliefId, to: &BeliefId, weight: f64) -> Result<(), CoreError> {
        for id in [from, to] {
            if !self.nodes.contains_key(id) {
                return Err(CoreError::UnknownNode { id: id.to_string() });
            }
        }
        self.set_edge(from, to, weight);
        Ok(())
    }

    /// Add the same edge in both directions.
    pub fn relate(&mut self, a: &BeliefId, b: &BeliefId, weight: f64) -> Result<(), CoreError> {
        self.add_edge(a, b, weight)?;
        self.add_edge(b, a, weight)
    }

    fn set_edge(&mut self, from: &BeliefId, to: &BeliefId, weight: f64) {
        self.edges
            .entry(from.clone())
            .or_default()
            .insert(to.clone(), weight);
    }

    /// Erode every belief not in `active` by 1%; refresh the activity stamp
    /// of those that are.
    pub fn decay(&mut self, current_step: u64, active: &BTreeSet<BeliefId>) {
        let mut decayed = 0usize;
        for (id, node) in self.nodes.iter_mut() {
            if active.contains(id) {
                node.last_active_step = current_step;
            } else {
                node.confidence = (node.confidence * DECAY_FACTOR).max(0.0);
                decayed += 1;
            }
        }
        tracing::debug!(step = current_step, decayed, "decay pass");
    }

    /// Active nodes in deterministic pair-iteration order: oldest first,
    /// ties broken by id.
    fn ordered_active(&self, active: &BTreeSet<BeliefId>) -> Vec<BeliefId> {
        let mut ids: Vec<&BeliefNode> = active.iter().filter_map(|id| self.nodes.get(id)).collect();
        ids.sort_by(|a, b| {
            a.created_step
                .cmp(&b.created_step)
                .then_with(|| a.id.cmp(&b.id))
        });
        ids.into_iter().map(|n| n.id.clone()).collect()
    }

    /// Dialectical resolution of high-tension near-duplicates.
    ///
    /// For each unordered pair of active beliefs that are close but not
    /// duplicates, both confidently held, and at least one under tension
    /// above [`TENSION_THRESHOLD`], a conditional belief
    /// `"I believe {belief} when {condition}"` is born. Parents survive.
    /// Returns the ids of the new beliefs.
    pub fn synthesize(&mut self, current_step: u64, active: &BTreeSet<BeliefId>) -> Vec<BeliefId> {
        let ordered = self.ordered_active(active);
        let mut created = Vec::new();

        for (i, a_id) in ordered.iter().enumerate() {
            for b_id in &ordered[i + 1..] {
                let (Some(a), Some(b)) = (self.nodes.get(a_id), self.nodes.get(b_id)) else {
                    continue;
                };
                if a.tags.is_empty() || b.tags.is_empty() {
                    continue;
                }

                let sim = similarity(&a.content, &b.content);
                if sim <= SYNTHESIS_SIMILARITY_FLOOR || sim >= MERGE_SIMILARITY {
                    continue;
                }
                if a.confidence < SYNTHESIS_MIN_CONFIDENCE || b.confidence < SYNTHESIS_MIN_CONFIDENCE {
                    continue;
                }

                let tension_a = node_tension(a, self, current_step);
                let tension_b = node_tension(b, self, current_step);
                if tension_a < TENSION_THRESHOLD && tension_b < TENSION_THRESHOLD {
                    continue;
                }

                // Equal tension makes the later operand the belief.
                let (belief, condition) = if tension_a > tension_b { (a, b) } else { (b, a) };
                let content = format!("I believe {} when {}", belief.content, condition.content);
                let source = format!("synthesis:{}:{}", belief.id, condition.id);
                let confidence = (a.confidence + b.confidence) / 2.0;

                let child = self.insert_belief(&content, confidence, &source, current_step);
                self.set_edge(a_id, &child, PROVENANCE_WEIGHT);
                self.set_edge(b_id, &child, PROVENANCE_WEIGHT);
                for parent in [a_id, b_id] {
                    if let Some(node) = self.nodes.get_mut(parent) {
                        node.last_active_step = current_step;
                    }
                }
                created.push(child);
            }
        }

        tracing::debug!(step = current_step, created = created.len(), "synthesis pass");
        created
    }

    /// Fuse near-identical active beliefs that share a primary tag.
    ///
    /// The older belief absorbs the younger: confidences are summed (capped
    /// at 1.0) and every edge that pointed at the loser is redirected to the
    /// winner. A belief consumed in one pairing takes no further part in
    /// this pass.
    pub fn merge(&mut self, current_step: u64, active: &BTreeSet<BeliefId>) -> Vec<MergeOutcome> {
        let ordered = self.ordered_active(active);
        let mut consumed: HashSet<BeliefId> = HashSet::new();
        let mut outcomes = Vec::new();

        for (i, a_id) in ordered.iter().enumerate() {
            if consumed.contains(a_id) {
                continue;
            }
            for b_id in &ordered[i + 1..] {
                if consumed.contains(b_id) || consumed.contains(a_id) {
                    continue;
                }
                let (Some(a), Some(b)) = (self.nodes.get(a_id), self.nodes.get(b_id)) else {
                    continue;
                };
                if a.primary_tag() != b.primary_tag() {
                    continue;
                }
                if similarity(&a.content, &b.content) < MERGE_SIMILARITY {
                    continue;
                }

                let a_first = (a.created_step, &a.id) <= (b.created_step, &b.id);
                let (winner, loser) = if a_first {
                    (a_id.clone(), b_id.clone())
                } else {
                    (b_id.clone(), a_id.clone())
                };

                let confidence = self.absorb(&winner, &loser, current_step);
                consumed.insert(loser.clone());
                outcomes.push(MergeOutcome {
                    winner,
                    loser,
                    confidence,
                });
            }
        }

        tracing::debug!(step = current_step, merged = outcomes.len(), "merge pass");
        outcomes
    }

    /// Fold `loser` into `winner` and remove it. Returns the winner's new confidence.
    fn absorb(&mut self, winner: &BeliefId, loser: &BeliefId, current_step: u64) -> f64 {
        let loser_confidence = self.nodes.get(loser).map(|n| n.confidence).unwrap_or(0.0);
        let mut confidence = 0.0;
        if let Some(node) = self.nodes.get_mut(winner) {
            node.confidence = (node.confidence + loser_confidence).min(1.0);
            node.last_active_step = current_step;
            confidence = node.confidence;
        }

        // Provenance edge, recorded before the loser disappears.
        self.set_edge(winner, loser, PROVENANCE_WEIGHT);

        for (source, targets) in self.edges.iter_mut() {
            if source == winner || source == loser {
                continue;
            }
            if let Some(strength) = targets.remove(loser) {
                targets.insert(winner.clone(), strength);
            }
        }

        self.nodes.remove(loser);
        self.edges.remove(loser);
        // Nothing may target a removed node, including the provenance edge.
        if let Some(targets) = self.edges.get_mut(winner) {
            targets.remove(loser);
        }
        confidence
    }

    /// Restore structural invariants on data that did not come through this
    /// API. Returns the number of fixes applied.
    fn repair(&mut self) -> usize {
        let mut fixes = 0;

        for (key, node) in self.nodes.iter_mut() {
            if node.id != *key {
                node.id = key.clone();
                fixes += 1;
            }
            let clamped = clamp_confidence(node.confidence);
            if clamped != node.confidence {
                node.confidence = clamped;
                fixes += 1;
            }
            if node.tags.is_empty() {
                node.tags.push(UNTAGGED.to_string());
                fixes += 1;
            }
        }

        let before = self.edges.len();
        self.edges.retain(|source, _| self.nodes.contains_key(source));
        fixes += before - self.edges.len();

        for targets in self.edges.values_mut() {
            let before = targets.len();
            targets.retain(|target, _| self.nodes.contains_key(target));
            fixes += before - targets.len();
        }

        for id in self.nodes.keys() {
            if !self.edges.contains_key(id) {
                self.edges.insert(id.clone(), BTreeMap::new());
                fixes += 1;
            }
        }

        fixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tension::tension_by_tag;
    use crate::model::tags::TraitDomain;

    fn all_ids(lattice: &Lattice) -> BTreeSet<BeliefId> {
        lattice.node_ids()
    }

    #[test]
    fn test_insert_sets_fields() {
        let mut lattice = Lattice::new();
        let id = lattice.insert_belief("I love danger", 1.4, "user", 7);
        let node = lattice.get(&id).unwrap();
        assert_eq!(node.confidence, 1.0);
        assert_eq!(node.created_step, 7);
        assert_eq!(node.last_active_step, 7);
        assert_eq!(node.tags, vec!["identity", "empathy", "risk", "caution"]);
        assert!(lattice.edges_from(&id).unwrap().is_empty());
    }

    #[test]
    fn test_opposite_sentiment_seeds_contradiction() {
        let mut lattice = Lattice::new();
        let love = lattice.insert_belief("I love danger", 0.95, "user", 0);
        let kill = lattice.insert_belief("Danger will kill me", 0.95, "assistant", 0);
        assert_eq!(lattice.edge(&love, &kill), Some(CONTRADICTION_WEIGHT));
        assert_eq!(lattice.edge(&kill, &love), Some(CONTRADICTION_WEIGHT));
    }

    #[test]
    fn test_matching_sentiment_seeds_support() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("I feel amazing about this", 0.9, "user", 0);
        let b = lattice.insert_belief("I am happy", 0.6, "user", 0);
        assert_eq!(lattice.edge(&a, &b), Some(SUPPORT_WEIGHT));
        assert_eq!(lattice.edge(&b, &a), Some(SUPPORT_WEIGHT));
    }

    #[test]
    fn test_no_edges_without_shared_domain_or_sentiment() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("Quiet nights are good", 0.9, "user", 0);
        let b = lattice.insert_belief("Loud parties are bad", 0.9, "user", 0);
        // Both untagged: no shared trait domain.
        assert_eq!(lattice.edge_count(), 0);

        let c = lattice.insert_belief("Danger exists", 0.9, "user", 0);
        let d = lattice.insert_belief("Danger will kill me", 0.9, "user", 0);
        // Neutral on one side.
        assert_eq!(lattice.edge(&c, &d), None);
        assert_eq!(lattice.edge(&a, &b), None);
    }

    #[test]
    fn test_add_edge_unknown_node() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("x", 0.5, "user", 0);
        let ghost = BeliefId::from("ghost");
        assert!(matches!(
            lattice.add_edge(&a, &ghost, -1.0),
            Err(CoreError::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_decay_inactive_and_active() {
        let mut lattice = Lattice::new();
        let idle = lattice.insert_belief("idle", 0.8, "user", 0);
        let busy = lattice.insert_belief("busy", 0.8, "user", 0);
        let active: BTreeSet<_> = [busy.clone()].into_iter().collect();

        for step in 1..=500 {
            lattice.decay(step, &active);
        }

        let idle = lattice.get(&idle).unwrap();
        assert!(idle.confidence > 0.0);
        assert!(idle.confidence < 0.8 * 0.01);
        assert_eq!(idle.last_active_step, 0);

        let busy = lattice.get(&busy).unwrap();
        assert_eq!(busy.confidence, 0.8);
        assert_eq!(busy.last_active_step, 500);
    }

    #[test]
    fn test_decay_never_negative() {
        let mut lattice = Lattice::new();
        let id = lattice.insert_belief("fading", 0.0, "user", 0);
        lattice.decay(1, &BTreeSet::new());
        assert_eq!(lattice.get(&id).unwrap().confidence, 0.0);
    }

    #[test]
    fn test_merge_near_duplicates() {
        let mut lattice = Lattice::new();
        let first = lattice.insert_belief("I feel amazing about this", 0.9, "user", 0);
        let second = lattice.insert_belief("I feel amazing about this", 0.7, "user", 1);

        let outcomes = lattice.merge(2, &all_ids(&lattice));

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].winner, first);
        assert_eq!(outcomes[0].loser, second);
        assert_eq!(lattice.len(), 1);
        let survivor = lattice.get(&first).unwrap();
        assert_eq!(survivor.confidence, 1.0);
        assert_eq!(survivor.last_active_step, 2);
        assert!(!lattice.edges().contains_key(&second));
        assert!(lattice.edges().values().all(|t| !t.contains_key(&second)));
    }

    #[test]
    fn test_merge_redirects_incoming_edges() {
        let mut lattice = Lattice::new();
        let keep = lattice.insert_belief("Danger is everywhere", 0.5, "user", 0);
        let dup = lattice.insert_belief("Danger is everywhere!", 0.3, "user", 1);
        let other = lattice.insert_belief("Quiet nights", 0.5, "user", 1);
        lattice.add_edge(&other, &dup, -0.7).unwrap();

        lattice.merge(2, &all_ids(&lattice));

        assert_eq!(lattice.edge(&other, &keep), Some(-0.7));
        assert_eq!(lattice.edge(&other, &dup), None);
        assert!((lattice.get(&keep).unwrap().confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_merge_tie_break_by_id() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("Risk is fine", 0.4, "user", 3);
        let b = lattice.insert_belief("Risk is fine", 0.4, "user", 3);
        let expected_winner = std::cmp::min(a.clone(), b.clone());

        let outcomes = lattice.merge(4, &all_ids(&lattice));
        assert_eq!(outcomes[0].winner, expected_winner);
        assert!(lattice.contains(&expected_winner));
    }

    #[test]
    fn test_merge_requires_same_primary_tag() {
        let mut lattice = Lattice::new();
        // Same character set, but "risks" matches no trait pattern.
        lattice.insert_belief("Risks", 0.4, "user", 0);
        lattice.insert_belief("risk", 0.4, "user", 0);
        let outcomes = lattice.merge(1, &all_ids(&lattice));
        assert!(outcomes.is_empty());
        assert_eq!(lattice.len(), 2);
    }

    #[test]
    fn test_merge_idempotent_without_duplicates() {
        let mut lattice = Lattice::new();
        lattice.insert_belief("I love danger", 0.95, "user", 0);
        lattice.insert_belief("Danger will kill me", 0.95, "assistant", 0);
        lattice.insert_belief("Jokes are funny", 0.5, "user", 0);

        lattice.merge(1, &all_ids(&lattice));
        let once = lattice.clone();
        lattice.merge(1, &all_ids(&lattice));
        assert_eq!(lattice, once);
    }

    #[test]
    fn test_merge_consumes_each_loser_once() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("Risk is fine", 0.3, "user", 0);
        lattice.insert_belief("Risk is fine", 0.3, "user", 1);
        lattice.insert_belief("Risk is fine", 0.3, "user", 2);

        let outcomes = lattice.merge(3, &all_ids(&lattice));
        assert_eq!(outcomes.len(), 2);
        assert_eq!(lattice.len(), 1);
        assert!((lattice.get(&a).unwrap().confidence - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_synthesis_creates_conditional() {
        let mut lattice = Lattice::new();
        let excited = lattice.insert_belief("Exploring feels exciting", 0.9, "user", 0);
        let scared = lattice.insert_belief("Exploring feels terrifying", 0.85, "assistant", 0);
        let quiet = lattice.insert_belief("Quiet nights at home", 0.5, "user", 0);
        // Seeded contradiction plus one more pushes `excited` over the threshold.
        assert_eq!(lattice.edge(&excited, &scared), Some(CONTRADICTION_WEIGHT));
        lattice.add_edge(&excited, &quiet, -1.0).unwrap();

        let before = lattice.len();
        let created = lattice.synthesize(0, &all_ids(&lattice));

        assert_eq!(created.len(), 1);
        assert_eq!(lattice.len(), before + 1);
        let child = lattice.get(&created[0]).unwrap();
        assert_eq!(
            child.content,
            "I believe Exploring feels exciting when Exploring feels terrifying"
        );
        assert!((child.confidence - 0.875).abs() < 1e-12);
        assert_eq!(child.source, format!("synthesis:{excited}:{scared}"));
        assert!(child.is_synthesized());
        assert!(lattice.contains(&excited));
        assert!(lattice.contains(&scared));
        assert_eq!(lattice.edge(&excited, &child.id), Some(PROVENANCE_WEIGHT));
        assert_eq!(lattice.edge(&scared, &child.id), Some(PROVENANCE_WEIGHT));
    }

    #[test]
    fn test_synthesis_tie_makes_later_node_the_belief() {
        let mut lattice = Lattice::new();
        let excited = lattice.insert_belief("Exploring feels exciting", 0.9, "user", 0);
        let scared = lattice.insert_belief("Exploring feels terrifying", 0.9, "assistant", 1);
        let quiet = lattice.insert_belief("Quiet nights at home", 0.5, "user", 1);
        lattice.add_edge(&excited, &quiet, -1.0).unwrap();
        lattice.add_edge(&scared, &quiet, -1.0).unwrap();
        let pair: BTreeSet<_> = [excited.clone(), scared.clone()].into_iter().collect();
        lattice.decay(1, &pair);

        let created = lattice.synthesize(1, &all_ids(&lattice));

        assert_eq!(created.len(), 1);
        let child = lattice.get(&created[0]).unwrap();
        assert_eq!(
            child.content,
            "I believe Exploring feels terrifying when Exploring feels exciting"
        );
        assert_eq!(child.source, format!("synthesis:{scared}:{excited}"));
    }

    #[test]
    fn test_synthesis_requires_tension() {
        let mut lattice = Lattice::new();
        lattice.insert_belief("Exploring feels exciting", 0.9, "user", 0);
        lattice.insert_belief("Exploring feels terrifying", 0.85, "assistant", 0);
        // Only the seeded edge: tension 0.9 < 1.5.
        assert!(lattice.synthesize(0, &all_ids(&lattice)).is_empty());
    }

    #[test]
    fn test_synthesis_skips_inactive() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("Exploring feels exciting", 0.9, "user", 0);
        let b = lattice.insert_belief("Exploring feels terrifying", 0.85, "assistant", 0);
        let c = lattice.insert_belief("Quiet nights at home", 0.5, "user", 0);
        lattice.add_edge(&a, &c, -1.0).unwrap();
        let active: BTreeSet<_> = [a, c].into_iter().collect();
        assert!(lattice.synthesize(0, &active).is_empty());
        assert!(lattice.contains(&b));
    }

    #[test]
    fn test_scenario_love_danger_tension() {
        let mut lattice = Lattice::new();
        let step = 100;
        let a = lattice.insert_belief("I love danger", 0.95, "user", step);
        let b = lattice.insert_belief("Danger will kill me", 0.95, "assistant", step);
        lattice.add_edge(&a, &b, -1.0).unwrap();

        let tension = tension_by_tag(&lattice, step);
        let close = |d: TraitDomain, v: f64| (tension[&d] - v).abs() < 1e-9;
        assert!(close(TraitDomain::Risk, 1.9));
        assert!(close(TraitDomain::Caution, 1.9));
        assert!(close(TraitDomain::Identity, 1.9));
        assert!(close(TraitDomain::Empathy, 0.95));
        assert!(close(TraitDomain::Curiosity, 0.0));
    }

    #[test]
    fn test_deserialize_repairs_invariants() {
        let json = r#"{
            "nodes": {
                "aa": {"id": "aa", "content": "x", "confidence": 1.5, "source": "user",
                       "tags": [], "created_step": 0, "last_active_step": 0}
            },
            "edges": {
                "aa": {"ghost": -1.0},
                "ghost": {"aa": 1.0}
            }
        }"#;
        let lattice: Lattice = serde_json::from_str(json).unwrap();
        let id = BeliefId::from("aa");
        let node = lattice.get(&id).unwrap();
        assert_eq!(node.confidence, 1.0);
        assert_eq!(node.tags, vec![UNTAGGED]);
        assert_eq!(lattice.edge_count(), 0);
        assert!(lattice.edges_from(&id).is_some());
        assert_eq!(lattice.edges().len(), 1);
    }

    #[test]
    fn test_bincode_roundtrip() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("I love danger", 0.95, "user", 1);
        let b = lattice.insert_belief("Danger will kill me", 0.95, "assistant", 2);
        lattice.add_edge(&a, &b, -0.4).unwrap();

        let bytes = bincode::serialize(&lattice).unwrap();
        let back: Lattice = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, lattice);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_confidence_stays_in_range(
                confidences in proptest::collection::vec(-1.0f64..2.0, 1..8),
                passes in 0u64..300
            ) {
                let mut lattice = Lattice::new();
                for (i, c) in confidences.iter().enumerate() {
                    lattice.insert_belief(&format!("belief {i}"), *c, "user", 0);
                }
                for step in 1..=passes {
                    lattice.decay(step, &BTreeSet::new());
                }
                for node in lattice.nodes() {
                    prop_assert!((0.0..=1.0).contains(&node.confidence));
                }
            }

            #[test]
            fn prop_merge_is_idempotent(
                texts in proptest::collection::vec("[a-z ]{1,12}", 1..6)
            ) {
                let mut lattice = Lattice::new();
                for (i, text) in texts.iter().enumerate() {
                    lattice.insert_belief(text, 0.5, "user", i as u64);
                }
                let ids = lattice.node_ids();
                lattice.merge(10, &ids);
                let once = lattice.clone();
                let ids = lattice.node_ids();
                let again = lattice.merge(10, &ids);
                prop_assert!(again.is_empty());
                prop_assert_eq!(lattice, once);
            }
        }
    }
}
