use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shadow_core::model::{BeliefId, BeliefNode, EdgeMap, Lattice, TagTension};

use crate::error::SdkError;

/// Snapshot of the lattice and tension after one message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceFrame {
    pub step: u64,
    pub nodes: BTreeMap<BeliefId, BeliefNode>,
    pub edges: EdgeMap,
    pub tension: TagTension,
}

impl TraceFrame {
    pub fn capture(step: u64, lattice: &Lattice, tension: &TagTension) -> Self {
        Self {
            step,
            nodes: lattice.node_map().clone(),
            edges: lattice.edges().clone(),
            tension: tension.clone(),
        }
    }
}

/// Append-only receiver of per-message frames.
pub trait TraceSink {
    fn record(&mut self, frame: TraceFrame);
}

/// In-memory trace with JSON Lines export, one frame per line.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    frames: Vec<TraceFrame>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn to_jsonl(&self) -> Result<String, SdkError> {
        let mut out = String::new();
        for frame in &self.frames {
            out.push_str(&serde_json::to_string(frame)?);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn write_jsonl(&self, path: &Path) -> Result<(), SdkError> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.to_jsonl()?.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl TraceSink for Trace {
    fn record(&mut self, frame: TraceFrame) {
        self.frames.push(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadow_core::model::tension_by_tag;
    use tempfile::TempDir;

    #[test]
    fn test_jsonl_one_line_per_frame() {
        let mut lattice = Lattice::new();
        let mut trace = Trace::new();
        lattice.insert_belief("I love danger", 0.95, "user", 1);
        trace.record(TraceFrame::capture(1, &lattice, &tension_by_tag(&lattice, 1)));
        lattice.insert_belief("Danger will kill me", 0.95, "assistant", 2);
        trace.record(TraceFrame::capture(2, &lattice, &tension_by_tag(&lattice, 2)));

        let jsonl = trace.to_jsonl().unwrap();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: TraceFrame = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.step, 2);
        assert_eq!(second.nodes.len(), 2);
        assert!(second.tension[&shadow_core::model::TraitDomain::Risk] > 0.0);
        assert!(lines[0].contains("\"risk\":0.0"));
    }

    #[test]
    fn test_write_jsonl() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("trace.jsonl");
        let mut trace = Trace::new();
        let lattice = Lattice::new();
        trace.record(TraceFrame::capture(0, &lattice, &tension_by_tag(&lattice, 0)));
        trace.write_jsonl(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }
}
