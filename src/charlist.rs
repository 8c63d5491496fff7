//! Character Lists - Line-Oriented Source Files
//!
//! Two line forms are accepted:
//! - plain: `亜` (the whole trimmed line, next sequential index)
//! - indexed: `5→亜` (explicit index, content after the arrow kept verbatim)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Separator between an explicit index and its character.
pub const INDEX_DELIMITER: char = '→';

#[derive(Debug, Error)]
pub enum CharListError {
    #[error("Failed to read character list {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Invalid index {value:?} on line {line}: {reason}")]
    Parse { line: usize, value: String, reason: String },
}

/// One character of a list, with the index used for its image file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub index: u32,
    pub character: String,
}

impl CharacterEntry {
    pub fn new(index: u32, character: impl Into<String>) -> Self {
        Self {
            index,
            character: character.into(),
        }
    }
}

/// Read and parse a character list file.
pub fn parse_char_file(path: &Path) -> Result<Vec<CharacterEntry>, CharListError> {
    let content = fs::read_to_string(path)
        .map_err(|e| CharListError::Io(path.to_path_buf(), e))?;
    parse_char_list(&content)
}

/// Parse character list text.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. Blank lines are skipped. Only
/// plain lines advance the sequential counter, and an index may appear once
/// per list, so `1→亜` followed by `唖` is rejected.
pub fn parse_char_list(content: &str) -> Result<Vec<CharacterEntry>, CharListError> {
    let mut entries = vec![];
    let mut seen = HashSet::new();
    let mut next_index = 1u32;

    let normalized = content.replace("\r\n", "\n");
    for (line_no, raw) in normalized.split(['\n', '\r']).enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let (index, character) = if line.contains(INDEX_DELIMITER) {
            let parts: Vec<&str> = line.split(INDEX_DELIMITER).collect();
            if parts.len() != 2 {
                warn!(line = line_no + 1, "dropping line with repeated index delimiter");
                continue;
            }
            (parse_index(parts[0], line_no + 1)?, parts[1])
        } else {
            next_index += 1;
            (next_index - 1, line)
        };

        if !seen.insert(index) {
            return Err(CharListError::Parse {
                line: line_no + 1,
                value: index.to_string(),
                reason: "duplicate index".into(),
            });
        }
        entries.push(CharacterEntry::new(index, character));
    }

    Ok(entries)
}

fn parse_index(value: &str, line: usize) -> Result<u32, CharListError> {
    let parse_error = || CharListError::Parse {
        line,
        value: value.to_string(),
        reason: "not a positive integer".into(),
    };
    match value.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(parse_error()),
        Ok(index) => Ok(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_indexed_sequentially() {
        let entries = parse_char_list("亜\n唖\n娃").unwrap();
        assert_eq!(
            entries,
            vec![
                CharacterEntry::new(1, "亜"),
                CharacterEntry::new(2, "唖"),
                CharacterEntry::new(3, "娃"),
            ]
        );
    }

    #[test]
    fn test_blank_lines_do_not_consume_indices() {
        let entries = parse_char_list("\n亜\n\n   \n唖\r\n").unwrap();
        let indices: Vec<u32> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(entries[1].character, "唖");
    }

    #[test]
    fn test_plain_line_keeps_multiple_code_points() {
        let entries = parse_char_list("  ab  ").unwrap();
        assert_eq!(entries, vec![CharacterEntry::new(1, "ab")]);
    }

    #[test]
    fn test_indexed_line() {
        let entries = parse_char_list("5→亜").unwrap();
        assert_eq!(entries, vec![CharacterEntry::new(5, "亜")]);
    }

    #[test]
    fn test_indexed_index_is_trimmed_character_is_not() {
        let entries = parse_char_list(" 12 → 亜").unwrap();
        assert_eq!(entries, vec![CharacterEntry::new(12, " 亜")]);
    }

    #[test]
    fn test_repeated_delimiter_dropped() {
        let entries = parse_char_list("1→亜→唖\n2→娃").unwrap();
        assert_eq!(entries, vec![CharacterEntry::new(2, "娃")]);
    }

    #[test]
    fn test_indexed_lines_do_not_advance_counter() {
        let entries = parse_char_list("7→亜\n唖").unwrap();
        assert_eq!(
            entries,
            vec![CharacterEntry::new(7, "亜"), CharacterEntry::new(1, "唖")]
        );
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let err = parse_char_list("1→亜\n唖").unwrap_err();
        match err {
            CharListError::Parse { line, ref value, ref reason } => {
                assert_eq!(line, 2);
                assert_eq!(value, "1");
                assert_eq!(reason, "duplicate index");
            }
            ref other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("duplicate index"));

        assert!(parse_char_list("3→亜\n3→唖").is_err());
    }

    #[test]
    fn test_lone_carriage_returns_split_lines() {
        let entries = parse_char_list("亜\r唖\r\n娃\r").unwrap();
        assert_eq!(
            entries,
            vec![
                CharacterEntry::new(1, "亜"),
                CharacterEntry::new(2, "唖"),
                CharacterEntry::new(3, "娃"),
            ]
        );
    }

    #[test]
    fn test_crlf_keeps_line_numbers() {
        let err = parse_char_list("亜\r\n唖\r\nx→娃").unwrap_err();
        assert!(matches!(err, CharListError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_bad_index_is_parse_error() {
        let err = parse_char_list("亜\nx→唖").unwrap_err();
        match err {
            CharListError::Parse { line, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_index_rejected() {
        assert!(matches!(
            parse_char_list("0→亜"),
            Err(CharListError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_char_file(Path::new("/nonexistent/list.txt")).unwrap_err();
        assert!(matches!(err, CharListError::Io(..)));
        assert!(err.to_string().contains("/nonexistent/list.txt"));
    }
}
