//! Key corpus loading.

use std::path::Path;

use tracing::debug;

use crate::error::AnalyzerError;

/// Read a corpus file holding one key per line.
///
/// Invalid UTF-8 does not reject the corpus: offending bytes become U+FFFD in
/// the affected key. See [`parse_keys`] for how lines are interpreted.
pub fn load_keys(path: impl AsRef<Path>) -> Result<Vec<String>, AnalyzerError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AnalyzerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let keys = parse_keys(&String::from_utf8_lossy(&bytes))?;
    debug!(path = %path.display(), count = keys.len(), "loaded keys");
    Ok(keys)
}

/// Split `contents` into keys: one per line, surrounding whitespace trimmed,
/// blank lines skipped.
pub fn parse_keys(contents: &str) -> Result<Vec<String>, AnalyzerError> {
    let keys: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if keys.is_empty() {
        return Err(AnalyzerError::NoKeys);
    }
    Ok(keys)
}
