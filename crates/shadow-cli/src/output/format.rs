use shadow_core::model::BeliefNode;
use shadow_sdk::{IdentityRecord, IngestReport, TagTension, TraitBiases, TraitDomain};

use super::OutputFormat;

fn json_pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn trait_map(values: &std::collections::BTreeMap<TraitDomain, f64>) -> serde_json::Value {
    values
        .iter()
        .map(|(d, v)| (d.as_str().to_string(), serde_json::json!(v)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

pub fn format_identity(record: &IdentityRecord, mode: &str, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json_pretty(&serde_json::json!({
            "identity_id": record.identity_id(),
            "mode": mode,
            "schema_version": record.schema_version(),
            "step": record.step(),
            "created_at": record.created_at(),
        })),
        OutputFormat::Text | OutputFormat::Markdown => format!(
            "Identity: {}\nMode:     {mode}\nStep:     {}\nCreated:  {}",
            record.identity_id(),
            record.step(),
            record.created_at().format("%Y-%m-%d %H:%M:%S UTC"),
        ),
    }
}

pub fn format_inspect(
    record: &IdentityRecord,
    biases: &TraitBiases,
    tension: &TagTension,
    fmt: OutputFormat,
) -> String {
    let lattice = record.lattice();
    match fmt {
        OutputFormat::Json => json_pretty(&serde_json::json!({
            "identity_id": record.identity_id(),
            "step": record.step(),
            "nodes": lattice.len(),
            "edges": lattice.edge_count(),
            "biases": trait_map(biases),
            "tension": trait_map(tension),
        })),
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("Identity: {}\n", record.identity_id()));
            out.push_str(&format!("Step:     {}\n", record.step()));
            out.push_str(&format!(
                "Beliefs:  {} ({} edges)\n\n",
                lattice.len(),
                lattice.edge_count()
            ));
            out.push_str(&format!("{:<10} {:>6} {:>8}\n", "trait", "bias", "tension"));
            for domain in TraitDomain::ALL {
                out.push_str(&format!(
                    "{:<10} {:>6.3} {:>8.3}\n",
                    domain.as_str(),
                    biases.get(&domain).copied().unwrap_or(0.0),
                    tension.get(&domain).copied().unwrap_or(0.0),
                ));
            }
            out
        }
        OutputFormat::Markdown => {
            let mut out = format!(
                "## {}\n\n**Step:** {} | **Beliefs:** {} | **Edges:** {}\n\n",
                record.identity_id(),
                record.step(),
                lattice.len(),
                lattice.edge_count()
            );
            out.push_str("| Trait | Bias | Tension |\n|-------|------|---------|\n");
            for domain in TraitDomain::ALL {
                out.push_str(&format!(
                    "| {} | {:.3} | {:.3} |\n",
                    domain.as_str(),
                    biases.get(&domain).copied().unwrap_or(0.0),
                    tension.get(&domain).copied().unwrap_or(0.0),
                ));
            }
            out
        }
    }
}

pub fn format_beliefs(nodes: &[&BeliefNode], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => serde_json::to_string_pretty(nodes).unwrap_or_default(),
        OutputFormat::Text | OutputFormat::Markdown => {
            if nodes.is_empty() {
                return "No beliefs yet.".to_string();
            }
            let mut out = String::new();
            for node in nodes {
                let short_id = &node.id.as_str()[..8.min(node.id.as_str().len())];
                out.push_str(&format!(
                    "\u{25c6} {short_id} {:.3} [{}] {}\n",
                    node.confidence,
                    node.tags.join(","),
                    node.content
                ));
            }
            out
        }
    }
}

pub fn format_ingest(report: &IngestReport, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json_pretty(&serde_json::json!({
            "response": report.response,
            "step": report.step,
            "ingested": report.ingested,
            "synthesized": report.synthesized,
            "merged": report.merged,
            "tension": trait_map(&report.tension),
        })),
        OutputFormat::Text | OutputFormat::Markdown => report.response.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadow_core::model::tension::zero_tension;

    #[test]
    fn test_inspect_text_lists_all_traits() {
        let record = IdentityRecord::fresh("shadow_main").unwrap();
        let biases = shadow_core::helix::express(record.genome());
        let out = format_inspect(&record, &biases, &zero_tension(), OutputFormat::Text);
        assert!(out.contains("Step:     0"));
        for domain in TraitDomain::ALL {
            assert!(out.contains(domain.as_str()));
        }
    }

    #[test]
    fn test_inspect_json_shape() {
        let record = IdentityRecord::fresh("shadow_main").unwrap();
        let biases = shadow_core::helix::express(record.genome());
        let out = format_inspect(&record, &biases, &zero_tension(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["step"], 0);
        assert_eq!(value["biases"].as_object().unwrap().len(), 8);
        assert_eq!(value["tension"]["risk"], 0.0);
    }

    #[test]
    fn test_beliefs_empty() {
        assert_eq!(format_beliefs(&[], OutputFormat::Text), "No beliefs yet.");
        assert_eq!(format_beliefs(&[], OutputFormat::Json), "[]");
    }
}
