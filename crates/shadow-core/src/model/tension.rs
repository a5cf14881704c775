use std::collections::BTreeMap;

use super::belief::BeliefNode;
use super::lattice::Lattice;
use super::tags::TraitDomain;

/// Aggregated tension per trait domain. Always carries all eight keys.
pub type TagTension = BTreeMap<TraitDomain, f64>;

/// Extra weight per step a belief has gone without activity.
const STALENESS_PER_STEP: f64 = 0.02;

/// Tension a single belief carries: its confidence, times how many beliefs it
/// contradicts, amplified the longer it has sat idle.
pub fn node_tension(node: &BeliefNode, lattice: &Lattice, current_step: u64) -> f64 {
    let contradictions = lattice.contradiction_count(&node.id);
    if contradictions == 0 {
        return 0.0;
    }
    let idle = current_step.saturating_sub(node.last_active_step) as f64;
    node.confidence * contradictions as f64 * (1.0 + STALENESS_PER_STEP * idle)
}

/// A zeroed tension vector.
pub fn zero_tension() -> TagTension {
    TraitDomain::ALL.into_iter().map(|d| (d, 0.0)).collect()
}

/// Sum node tension into every trait domain a node is tagged with.
pub fn tension_by_tag(lattice: &Lattice, current_step: u64) -> TagTension {
    let mut tension = zero_tension();
    for node in lattice.nodes() {
        let t = node_tension(node, lattice, current_step);
        if t == 0.0 {
            continue;
        }
        for domain in node.domains() {
            *tension.entry(domain).or_insert(0.0) += t;
        }
    }
    tension
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_contradictions_zero_tension() {
        let mut lattice = Lattice::new();
        lattice.insert_belief("I feel amazing about this", 0.9, "user", 0);
        lattice.insert_belief("I am happy", 0.9, "user", 0);
        let tension = tension_by_tag(&lattice, 50);
        assert_eq!(tension.len(), 8);
        assert!(tension.values().all(|t| *t == 0.0));
    }

    #[test]
    fn test_empty_lattice_has_all_keys() {
        let tension = tension_by_tag(&Lattice::new(), 0);
        for domain in TraitDomain::ALL {
            assert_eq!(tension[&domain], 0.0);
        }
    }

    #[test]
    fn test_staleness_amplifies() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("I love danger", 0.5, "user", 10);
        lattice.insert_belief("Danger will kill me", 0.5, "user", 10);
        let node = lattice.get(&a).unwrap().clone();

        assert!((node_tension(&node, &lattice, 10) - 0.5).abs() < 1e-12);
        assert!((node_tension(&node, &lattice, 60) - 1.0).abs() < 1e-12);
        // Steps before last activity never reduce tension.
        assert!((node_tension(&node, &lattice, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_untagged_contributes_nothing() {
        let mut lattice = Lattice::new();
        let a = lattice.insert_belief("Quiet nights", 0.9, "user", 0);
        let b = lattice.insert_belief("Loud parties", 0.9, "user", 0);
        lattice.add_edge(&a, &b, -1.0).unwrap();
        let tension = tension_by_tag(&lattice, 0);
        assert!(tension.values().all(|t| *t == 0.0));
    }
}
