//! Source-map decomposer: treats a JSON source map as a container of one
//! virtual file per embedded source.

use std::{fs, path::Path};

use serde_json::Value;

use crate::error::Error;
use crate::path_utils::safe_path;

/// Extract each source in `sourcesContent` of the map file at `source` into
/// `target_dir`, mimicking the directory structure `sources` implies.
pub fn extract(source: &Path, target_dir: &Path) -> Result<Vec<String>, Error> {
    for (path, content) in extract_source_content_from_map(source)? {
        let relative = safe_path(&path, true);
        let parent = relative.parent().unwrap_or_else(|| Path::new(""));
        fs::create_dir_all(target_dir.join(parent))?;
        fs::write(target_dir.join(&relative), content)?;
    }
    Ok(Vec::new())
}

/// Return `(source_name, content)` pairs for each entry in `sourcesContent`
/// of the map file at `location`.
///
/// Absence of `sourcesContent` yields no outputs and no error. If `sources`
/// and `sourcesContent` differ in length, placeholder names
/// `source_content{i+1}.txt` (1-indexed) are fabricated.
fn extract_source_content_from_map(location: &Path) -> Result<Vec<(String, String)>, Error> {
    let raw = fs::read_to_string(location)?;
    let map_data: Value = serde_json::from_str(&raw)
        .map_err(|source| Error::SourceMapParse { path: location.to_path_buf(), source })?;

    let Some(sources_content) = map_data.get("sourcesContent").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let sources: Vec<String> = map_data
        .get("sources")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(value_as_string).collect())
        .unwrap_or_default();

    let sources = if sources.len() != sources_content.len() {
        (1..=sources_content.len())
            .map(|i| format!("source_content{i}.txt"))
            .collect()
    } else {
        sources
    };

    Ok(sources
        .into_iter()
        .zip(sources_content.iter().map(value_as_string))
        .collect())
}

fn value_as_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extracts_matching_sources_and_content() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("app.js.map");
        fs::write(
            &source,
            r#"{"sources": ["src/a.js", "src/b.js"], "sourcesContent": ["var a = 1;", "var b = 2;"]}"#,
        )
        .unwrap();
        let target_dir = dir.path().join("app.js.map-extract");
        fs::create_dir(&target_dir).unwrap();

        extract(&source, &target_dir).unwrap();

        assert_eq!(fs::read_to_string(target_dir.join("src/a.js")).unwrap(), "var a = 1;");
        assert_eq!(fs::read_to_string(target_dir.join("src/b.js")).unwrap(), "var b = 2;");
    }

    #[test]
    fn mismatched_lengths_use_placeholder_names() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("app.js.map");
        fs::write(
            &source,
            r#"{"sources": ["src/a.js"], "sourcesContent": ["one", "two"]}"#,
        )
        .unwrap();
        let target_dir = dir.path().join("app.js.map-extract");
        fs::create_dir(&target_dir).unwrap();

        extract(&source, &target_dir).unwrap();

        assert_eq!(fs::read_to_string(target_dir.join("source_content1.txt")).unwrap(), "one");
        assert_eq!(fs::read_to_string(target_dir.join("source_content2.txt")).unwrap(), "two");
    }

    #[test]
    fn absence_of_sources_content_yields_no_outputs() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("app.js.map");
        fs::write(&source, r#"{"sources": ["src/a.js"]}"#).unwrap();
        let target_dir = dir.path().join("app.js.map-extract");
        fs::create_dir(&target_dir).unwrap();

        let warnings = extract(&source, &target_dir).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(fs::read_dir(&target_dir).unwrap().count(), 0);
    }

    #[test]
    fn invalid_json_is_a_fatal_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.js.map");
        fs::write(&source, "{not json").unwrap();
        let target_dir = dir.path().join("broken.js.map-extract");
        fs::create_dir(&target_dir).unwrap();

        let result = extract(&source, &target_dir);
        assert!(matches!(result, Err(Error::SourceMapParse { .. })));
    }
}
