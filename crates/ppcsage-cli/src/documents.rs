//! Loading phase documents from disk.

use std::path::Path;

use anyhow::Context;

use ppcsage_core::{DocumentSet, PageType};
use ppcsage_runtime::ContextTable;

/// Read a `{ "<phase>": { "text": "..." } }` JSON file.
pub fn load_documents(path: &Path) -> anyhow::Result<DocumentSet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading documents from {}", path.display()))?;
    let documents: DocumentSet = serde_json::from_str(&raw)
        .with_context(|| format!("parsing documents in {}", path.display()))?;
    Ok(documents)
}

/// Page slug or alias to page type.
pub fn parse_page(slug: &str) -> anyhow::Result<PageType> {
    ContextTable::resolve(slug).ok_or_else(|| {
        let known: Vec<&str> = PageType::ALL.iter().map(|p| p.as_str()).collect();
        anyhow::anyhow!("Unknown page '{}'. Known pages: {}", slug, known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(
            &path,
            r#"{"phase1": {"text": "Budget is $500."}, "phase2": {"text": "Rivals abound."}}"#,
        )
        .unwrap();

        let docs = load_documents(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs["phase1"].text, "Budget is $500.");
    }

    #[test]
    fn test_load_documents_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_documents(&dir.path().join("missing.json")).is_err());

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(load_documents(&path).is_err());
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("strategy").unwrap(), PageType::StrategicPositioning);
        assert_eq!(parse_page("executive-summary").unwrap(), PageType::ExecutiveSummary);
        let err = parse_page("homepage").unwrap_err().to_string();
        assert!(err.contains("homepage"));
    }
}
