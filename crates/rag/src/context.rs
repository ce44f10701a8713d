//! Context assembly — maps raw search hits into the grounding block.
//!
//! The index schema is external configuration: which fields hold the title,
//! the passage text, and the compound chunk identifier comes from
//! [`FieldMap`], never hard-coded. Assembly fails entry-by-entry, not
//! block-wide: a bad result becomes an inline error line and the remaining
//! entries still render, in the exact order the provider returned them.

use grounded_config::FieldsConfig;
use grounded_core::search::SearchHit;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::warn;

/// Placeholder used when a hit has no usable title field.
const UNTITLED: &str = "(untitled)";

/// Where to find each piece of a passage inside a hit's field map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMap {
    pub title: String,
    pub content: String,
    pub id: String,
    pub id_marker: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            title: "title".into(),
            content: "chunk".into(),
            id: "chunk_id".into(),
            id_marker: "pages_".into(),
        }
    }
}

impl From<&FieldsConfig> for FieldMap {
    fn from(fields: &FieldsConfig) -> Self {
        Self {
            title: fields.title.clone(),
            content: fields.content.clone(),
            id: fields.id.clone(),
            id_marker: fields.id_marker.clone(),
        }
    }
}

/// One formatted entry of the grounding context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContextEntry {
    /// A successfully mapped passage.
    Passage {
        title: String,
        chunk_id: Option<String>,
        score: f64,
        content: String,
    },
    /// A result that could not be mapped; rendered inline so the rest of
    /// the block still stands.
    Failed { reason: String },
}

/// The assembled grounding material, in provider order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextBlock {
    entries: Vec<ContextEntry>,
}

impl ContextBlock {
    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the block as the free-text grounding material for the prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                ContextEntry::Passage {
                    title,
                    chunk_id,
                    score,
                    content,
                } => {
                    let _ = writeln!(out, "#source: {title}\n");
                    if let Some(id) = chunk_id {
                        let _ = writeln!(out, "#chunk_id: {id}\n");
                    }
                    let _ = writeln!(out, "#score: {score}\n");
                    let _ = writeln!(out, "#content: {content}\n");
                }
                ContextEntry::Failed { reason } => {
                    let _ = writeln!(out, "#error: could not render result: {reason}\n");
                }
            }
        }
        out
    }
}

/// Maps search hits onto context entries against a configured field map.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    fields: FieldMap,
}

impl ContextAssembler {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    /// Assemble hits into a context block. Never fails as a whole;
    /// per-entry problems are logged and surfaced inline.
    pub fn assemble(&self, hits: &[SearchHit]) -> ContextBlock {
        let entries = hits
            .iter()
            .map(|hit| match self.map_hit(hit) {
                Ok(entry) => entry,
                Err(reason) => {
                    warn!(%reason, "Skipping malformed search result");
                    ContextEntry::Failed { reason }
                }
            })
            .collect();

        ContextBlock { entries }
    }

    fn map_hit(&self, hit: &SearchHit) -> Result<ContextEntry, String> {
        // Content is the one field a passage cannot do without.
        let content = hit
            .fields
            .get(&self.fields.content)
            .and_then(|v| v.as_str())
            .ok_or_else(|| format!("missing content field '{}'", self.fields.content))?
            .to_string();

        let title = hit
            .fields
            .get(&self.fields.title)
            .and_then(|v| v.as_str())
            .unwrap_or(UNTITLED)
            .to_string();

        let chunk_id = hit
            .fields
            .get(&self.fields.id)
            .and_then(|v| v.as_str())
            .and_then(|id| extract_chunk_suffix(id, &self.fields.id_marker));

        Ok(ContextEntry::Passage {
            title,
            chunk_id,
            score: hit.score,
            content,
        })
    }
}

/// The chunk sequence id is everything after the first occurrence of the
/// marker in a compound identifier. No marker means no id — not an error.
fn extract_chunk_suffix(id: &str, marker: &str) -> Option<String> {
    if marker.is_empty() {
        return None;
    }
    id.find(marker)
        .map(|pos| id[pos + marker.len()..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(fields: serde_json::Value) -> SearchHit {
        match fields {
            serde_json::Value::Object(map) => SearchHit {
                score: 1.5,
                fields: map,
            },
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn maps_complete_hit() {
        let assembler = ContextAssembler::default();
        let block = assembler.assemble(&[hit(serde_json::json!({
            "title": "manual.pdf",
            "chunk": "Ownership moves values.",
            "chunk_id": "manual_pdf_pages_42",
        }))]);

        assert_eq!(block.len(), 1);
        match &block.entries()[0] {
            ContextEntry::Passage {
                title,
                chunk_id,
                score,
                content,
            } => {
                assert_eq!(title, "manual.pdf");
                assert_eq!(chunk_id.as_deref(), Some("42"));
                assert!((score - 1.5).abs() < f64::EPSILON);
                assert_eq!(content, "Ownership moves values.");
            }
            other => panic!("expected passage, got {other:?}"),
        }
    }

    #[test]
    fn missing_title_uses_placeholder() {
        let assembler = ContextAssembler::default();
        let block = assembler.assemble(&[hit(serde_json::json!({
            "chunk": "Some text.",
        }))]);

        match &block.entries()[0] {
            ContextEntry::Passage { title, .. } => assert_eq!(title, UNTITLED),
            other => panic!("expected passage, got {other:?}"),
        }
    }

    #[test]
    fn missing_marker_omits_chunk_id() {
        let assembler = ContextAssembler::default();
        let block = assembler.assemble(&[hit(serde_json::json!({
            "title": "doc.pdf",
            "chunk": "Text.",
            "chunk_id": "no-marker-here",
        }))]);

        match &block.entries()[0] {
            ContextEntry::Passage { chunk_id, .. } => assert!(chunk_id.is_none()),
            other => panic!("expected passage, got {other:?}"),
        }
    }

    #[test]
    fn malformed_entry_does_not_abort_block() {
        let assembler = ContextAssembler::default();
        let block = assembler.assemble(&[
            hit(serde_json::json!({"title": "a.pdf", "chunk": "A"})),
            hit(serde_json::json!({"title": "broken.pdf"})), // no content
            hit(serde_json::json!({"title": "c.pdf", "chunk": "C"})),
        ]);

        assert_eq!(block.len(), 3);
        assert!(matches!(block.entries()[0], ContextEntry::Passage { .. }));
        assert!(matches!(block.entries()[1], ContextEntry::Failed { .. }));
        assert!(matches!(block.entries()[2], ContextEntry::Passage { .. }));
    }

    #[test]
    fn ordering_mirrors_input() {
        let assembler = ContextAssembler::default();
        let block = assembler.assemble(&[
            hit(serde_json::json!({"title": "first", "chunk": "1"})),
            hit(serde_json::json!({"title": "second", "chunk": "2"})),
            hit(serde_json::json!({"title": "third", "chunk": "3"})),
        ]);

        let titles: Vec<_> = block
            .entries()
            .iter()
            .map(|e| match e {
                ContextEntry::Passage { title, .. } => title.as_str(),
                ContextEntry::Failed { .. } => "(failed)",
            })
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn custom_field_map() {
        let assembler = ContextAssembler::new(FieldMap {
            title: "path".into(),
            content: "body".into(),
            id: "doc_id".into(),
            id_marker: "part_".into(),
        });
        let block = assembler.assemble(&[hit(serde_json::json!({
            "path": "notes.md",
            "body": "Content here.",
            "doc_id": "notes_part_7",
        }))]);

        match &block.entries()[0] {
            ContextEntry::Passage {
                title, chunk_id, ..
            } => {
                assert_eq!(title, "notes.md");
                assert_eq!(chunk_id.as_deref(), Some("7"));
            }
            other => panic!("expected passage, got {other:?}"),
        }
    }

    #[test]
    fn chunk_suffix_starts_at_first_marker() {
        // A marker appearing again later in the id stays in the suffix.
        assert_eq!(
            extract_chunk_suffix("pages_intro_pages_12", "pages_").as_deref(),
            Some("intro_pages_12")
        );
        assert_eq!(
            extract_chunk_suffix("manual_pdf_pages_42", "pages_").as_deref(),
            Some("42")
        );
        assert_eq!(extract_chunk_suffix("pages_", "pages_").as_deref(), Some(""));
        assert!(extract_chunk_suffix("chapter_3", "pages_").is_none());
    }

    #[test]
    fn render_contains_labels() {
        let assembler = ContextAssembler::default();
        let block = assembler.assemble(&[hit(serde_json::json!({
            "title": "doc.pdf",
            "chunk": "Passage text.",
            "chunk_id": "doc_pages_3",
        }))]);

        let rendered = block.render();
        assert!(rendered.contains("#source: doc.pdf"));
        assert!(rendered.contains("#chunk_id: 3"));
        assert!(rendered.contains("#score: 1.5"));
        assert!(rendered.contains("#content: Passage text."));
    }

    #[test]
    fn empty_block_renders_empty() {
        let block = ContextAssembler::default().assemble(&[]);
        assert!(block.is_empty());
        assert!(block.render().is_empty());
    }
}
