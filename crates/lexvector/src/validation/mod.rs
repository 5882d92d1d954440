//! Post-hoc store validation
//!
//! Upstream extraction has historically leaked HTML markup and inline CSS
//! into chunk text, silently corrupting the embeddings computed over it.
//! The validator loads a persisted store and scans every chunk against a
//! fixed set of contamination detectors. Detection only; it never mutates or
//! repairs the store.

pub mod sniff;

pub use sniff::{sniff, sniff_file, ArtifactFormat};

use regex::RegexBuilder;
use std::path::Path;

use crate::error::{Error, Result};

/// Maximum illustrative matches kept per chunk per pattern
const EXAMPLES_PER_CHUNK: usize = 3;
/// Maximum illustrative matches kept per pattern in the report
const EXAMPLES_PER_PATTERN: usize = 6;

/// HTML markup detectors
const HTML_PATTERNS: &[&str] = &[
    r"<[^>]+>",
    r"&[a-zA-Z]+;",
    r"<!DOCTYPE",
    r"<html",
    r"</html>",
    r"<body",
    r"</body>",
    r"<div",
    r"<p\s",
    r"<span",
    r"style=",
    r"class=",
];

/// Inline CSS declaration detectors
const CSS_PATTERNS: &[&str] = &[
    r"font-family:",
    r"margin:",
    r"padding:",
    r"color:#",
    r"background-color:",
    r"text-align:",
    r"font-size:",
    r"line-height:",
    r"font-weight:",
];

/// Findings for one detector pattern
#[derive(Debug, Clone)]
pub struct PatternFindings {
    /// Pattern source, as written in the detector table
    pub pattern: String,
    /// Number of chunks with at least one match
    pub chunks_matched: usize,
    /// Total matches across all chunks
    pub total_matches: usize,
    /// Illustrative matched substrings, capped
    pub examples: Vec<String>,
}

impl PatternFindings {
    fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            chunks_matched: 0,
            total_matches: 0,
            examples: Vec::new(),
        }
    }
}

/// Structured contamination summary for one store
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Number of chunks examined
    pub total_chunks: usize,
    /// Chunks with at least one HTML detector match
    pub html_contaminated_chunks: usize,
    /// Chunks with at least one CSS detector match
    pub css_contaminated_chunks: usize,
    /// Per-pattern HTML findings
    pub html: Vec<PatternFindings>,
    /// Per-pattern CSS findings
    pub css: Vec<PatternFindings>,
}

impl ValidationReport {
    /// Whether no detector matched anywhere
    pub fn is_clean(&self) -> bool {
        self.html_contaminated_chunks == 0 && self.css_contaminated_chunks == 0
    }

    /// Findings for a specific pattern, if it matched
    pub fn findings_for(&self, pattern: &str) -> Option<&PatternFindings> {
        self.html
            .iter()
            .chain(self.css.iter())
            .find(|f| f.pattern == pattern)
    }
}

struct Detector {
    pattern: &'static str,
    regex: regex::Regex,
}

/// Scans persisted stores for markup contamination
pub struct StoreValidator {
    html: Vec<Detector>,
    css: Vec<Detector>,
}

impl StoreValidator {
    /// Create a validator with the fixed detector sets
    pub fn new() -> Self {
        Self {
            html: compile_detectors(HTML_PATTERNS),
            css: compile_detectors(CSS_PATTERNS),
        }
    }

    /// Load the artifact at `path` and scan its chunk texts
    ///
    /// Fails with a load error when the bytes are not a deserializable store
    /// or the top-level structure lacks a `chunks` array; the error reports
    /// the keys that were actually present.
    pub fn validate<P: AsRef<Path>>(&self, path: P) -> Result<ValidationReport> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::load(format!("could not read '{}': {}", path.display(), e)))?;

        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            Error::load(format!(
                "'{}' could not be decoded as a vector store: {}",
                path.display(),
                e
            ))
        })?;

        let object = value.as_object().ok_or_else(|| {
            Error::load(format!(
                "'{}' is not a structured store (top level is not an object)",
                path.display()
            ))
        })?;

        let chunks = object
            .get("chunks")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                Error::load_with_keys(
                    format!("'{}' has no 'chunks' array", path.display()),
                    object.keys().cloned().collect(),
                )
            })?;

        let texts: Vec<&str> = chunks
            .iter()
            .filter_map(|chunk| chunk.get("text").and_then(|t| t.as_str()))
            .collect();

        Ok(self.scan(&texts))
    }

    /// Scan chunk texts against every detector
    pub fn scan(&self, texts: &[&str]) -> ValidationReport {
        let mut html_findings: Vec<PatternFindings> = self
            .html
            .iter()
            .map(|d| PatternFindings::new(d.pattern))
            .collect();
        let mut css_findings: Vec<PatternFindings> = self
            .css
            .iter()
            .map(|d| PatternFindings::new(d.pattern))
            .collect();

        let mut html_chunks = 0usize;
        let mut css_chunks = 0usize;

        for text in texts {
            if scan_chunk(&self.html, text, &mut html_findings) {
                html_chunks += 1;
            }
            if scan_chunk(&self.css, text, &mut css_findings) {
                css_chunks += 1;
            }
        }

        ValidationReport {
            total_chunks: texts.len(),
            html_contaminated_chunks: html_chunks,
            css_contaminated_chunks: css_chunks,
            html: html_findings.into_iter().filter(|f| f.total_matches > 0).collect(),
            css: css_findings.into_iter().filter(|f| f.total_matches > 0).collect(),
        }
    }
}

impl Default for StoreValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_detectors(patterns: &[&'static str]) -> Vec<Detector> {
    patterns
        .iter()
        .map(|pattern| Detector {
            pattern,
            regex: RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("detector patterns are fixed and known valid"),
        })
        .collect()
}

/// Run one detector set over a chunk; returns whether anything matched
fn scan_chunk(detectors: &[Detector], text: &str, findings: &mut [PatternFindings]) -> bool {
    let mut matched = false;
    for (detector, finding) in detectors.iter().zip(findings.iter_mut()) {
        let mut in_chunk = 0usize;
        for hit in detector.regex.find_iter(text) {
            in_chunk += 1;
            if in_chunk <= EXAMPLES_PER_CHUNK && finding.examples.len() < EXAMPLES_PER_PATTERN {
                finding.examples.push(hit.as_str().to_string());
            }
        }
        if in_chunk > 0 {
            matched = true;
            finding.chunks_matched += 1;
            finding.total_matches += in_chunk;
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;
    use crate::types::{Chunk, StoreMetadata, VectorStore};

    fn store_with_texts(texts: &[&str]) -> VectorStore {
        VectorStore {
            chunks: texts
                .iter()
                .enumerate()
                .map(|(i, text)| Chunk {
                    id: i as u32,
                    text: text.to_string(),
                    start: i * 100,
                    end: i * 100 + text.len(),
                    source_label: "prueba".to_string(),
                })
                .collect(),
            embeddings: texts.iter().map(|_| vec![0.0, 1.0]).collect(),
            metadata: StoreMetadata {
                source_name: "prueba".to_string(),
                total_chunks: texts.len(),
                dropped_chunks: 0,
                model: "text-embedding-004".to_string(),
                content_hash: String::new(),
                generated_at: chrono::Utc::now(),
            },
        }
    }

    #[test]
    fn markup_chunk_triggers_tag_and_class_detectors() {
        let report = StoreValidator::new().scan(&["<p class='x'>hola</p>"]);
        assert!(!report.is_clean());
        assert_eq!(report.html_contaminated_chunks, 1);

        let tags = report.findings_for(r"<[^>]+>").unwrap();
        assert!(tags.chunks_matched >= 1);
        assert!(tags.examples.iter().any(|e| e.contains("<p class")));

        let class_attr = report.findings_for("class=").unwrap();
        assert!(class_attr.chunks_matched >= 1);
    }

    #[test]
    fn clean_store_reports_zero_everywhere() {
        let report = StoreValidator::new().scan(&[
            "La presente Ley es de orden publico e interes social.",
            "Las autoridades garantizaran la atencion a victimas.",
        ]);
        assert!(report.is_clean());
        assert!(report.html.is_empty());
        assert!(report.css.is_empty());
        assert_eq!(report.total_chunks, 2);
    }

    #[test]
    fn css_declarations_are_counted_separately() {
        let report = StoreValidator::new().scan(&[
            "texto con font-family: Arial; margin: 0; color:#fff al final",
            "texto limpio sin estilos de ninguna clase",
        ]);
        assert_eq!(report.css_contaminated_chunks, 1);
        assert!(report.findings_for("font-family:").is_some());
        assert!(report.findings_for("margin:").is_some());
        assert!(report.findings_for("color:#").is_some());
    }

    #[test]
    fn detection_is_case_insensitive() {
        let report = StoreValidator::new().scan(&["<!doctype HTML><BODY>texto</BODY>"]);
        assert!(report.findings_for(r"<!DOCTYPE").is_some());
        assert!(report.findings_for(r"<body").is_some());
    }

    #[test]
    fn entity_references_are_detected() {
        let report = StoreValidator::new().scan(&["atenci&oacute;n a v&iacute;ctimas"]);
        let entities = report.findings_for(r"&[a-zA-Z]+;").unwrap();
        assert_eq!(entities.total_matches, 2);
    }

    #[test]
    fn examples_are_capped_per_chunk() {
        let text = "<a><b><c><d><e>".to_string();
        let report = StoreValidator::new().scan(&[&text]);
        let tags = report.findings_for(r"<[^>]+>").unwrap();
        assert_eq!(tags.total_matches, 5);
        assert!(tags.examples.len() <= EXAMPLES_PER_CHUNK);
    }

    #[test]
    fn validates_a_persisted_store_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contaminado.json");
        storage::save(
            &store_with_texts(&[
                "<div style=\"margin: 0\">ARTICULO 1</div>",
                "Texto limpio de la ley.",
            ]),
            &path,
        )
        .unwrap();

        let report = StoreValidator::new().validate(&path).unwrap();
        assert_eq!(report.total_chunks, 2);
        assert_eq!(report.html_contaminated_chunks, 1);
        assert_eq!(report.css_contaminated_chunks, 1);
    }

    #[test]
    fn missing_chunks_field_reports_found_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raro.json");
        std::fs::write(&path, r#"{"vectors": [], "meta": {}}"#).unwrap();

        let err = StoreValidator::new().validate(&path).unwrap_err();
        match err {
            Error::Load { keys, .. } => {
                assert!(keys.contains(&"vectors".to_string()));
                assert!(keys.contains(&"meta".to_string()));
            }
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[test]
    fn undecodable_bytes_are_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pickle.bin");
        std::fs::write(&path, b"\x80\x04\x95legacy pickle payload").unwrap();

        let err = StoreValidator::new().validate(&path).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
