use crate::error::BruteError;
use std::path::Path;

/// Reads a newline separated word-list. Lines are trimmed, blank lines are
/// dropped, duplicates and order are preserved. Bytes that are not valid
/// UTF-8 (latin-1 dumps and the like) become U+FFFD instead of failing the
/// whole file.
pub fn read_lines(path: &Path) -> Result<Vec<String>, BruteError> {
    let bytes = std::fs::read(path).map_err(|source| BruteError::WordlistRead {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_lines(&String::from_utf8_lossy(&bytes)))
}

pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
