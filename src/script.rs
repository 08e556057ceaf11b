//! The import mini-script.
//!
//! A script is a list of entries separated by commas or newlines:
//!
//! ```text
//! I 8, I 3, I 10
//! S 3
//! D 8
//! T IN
//! ```
//!
//! `I`, `D`, and `S` take a number; `T` takes one of `IN`, `PRE`, `POST`,
//! `LEVEL`. Everything is case-insensitive and blank entries are skipped. A
//! script starting with `[` is instead a JSON array of numbers to insert.

use std::error::Error;
use std::fmt;

use crate::engine::TraverseKind;
use crate::key::Key;
use crate::step::OpKind;

/// One operation requested by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<K> {
    /// Insert the key.
    Insert(K),
    /// Delete one occurrence of the key.
    Delete(K),
    /// Look the key up.
    Search(K),
    /// Walk the tree.
    Traverse(TraverseKind),
}

impl<K> Command<K> {
    /// The kind of operation this command runs.
    pub fn op(&self) -> OpKind {
        match self {
            Self::Insert(_) => OpKind::Insert,
            Self::Delete(_) => OpKind::Delete,
            Self::Search(_) => OpKind::Search,
            Self::Traverse(_) => OpKind::Traverse,
        }
    }
}

/// Why a script was rejected. `entry` is the 1-based position among the
/// script's non-blank entries.
#[derive(Debug)]
pub enum ScriptError {
    /// The entry doesn't start with a known command letter.
    UnknownCommand {
        /// Position of the entry.
        entry: usize,
        /// The entry as written.
        text: String,
    },
    /// The argument isn't a finite number.
    InvalidKey {
        /// Position of the entry.
        entry: usize,
        /// The offending argument.
        text: String,
    },
    /// The `T` argument isn't a traversal kind.
    UnknownTraversal {
        /// Position of the entry.
        entry: usize,
        /// The offending argument.
        text: String,
    },
    /// A `[`-prefixed script isn't a JSON array of keys.
    Json(serde_json::Error),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand { entry, text } => {
                write!(f, "entry {}: unknown command {:?}", entry, text)
            }
            Self::InvalidKey { entry, text } => {
                write!(f, "entry {}: {:?} is not a number", entry, text)
            }
            Self::UnknownTraversal { entry, text } => write!(
                f,
                "entry {}: unknown traversal {:?} (expected IN, PRE, POST or LEVEL)",
                entry, text
            ),
            Self::Json(err) => write!(f, "invalid key list: {}", err),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ScriptError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Parses a whole script. Nothing is returned unless every entry parses.
///
/// # Examples
///
/// ```
/// use bst_trace::{parse_script, Command, Key, TraverseKind};
///
/// let commands = parse_script("I 8, i 3\nT level").unwrap();
/// assert_eq!(
///     commands,
///     vec![
///         Command::Insert(Key::from(8)),
///         Command::Insert(Key::from(3)),
///         Command::Traverse(TraverseKind::Level),
///     ]
/// );
///
/// assert!(parse_script("I eight").is_err());
/// ```
pub fn parse_script(script: &str) -> Result<Vec<Command<Key>>, ScriptError> {
    let script = script.trim();
    if script.starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(script)?;
        return values
            .iter()
            .enumerate()
            .map(|(index, value)| json_key(index + 1, value).map(Command::Insert))
            .collect();
    }

    script
        .split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| parse_entry(index + 1, entry))
        .collect()
}

fn parse_entry(entry: usize, text: &str) -> Result<Command<Key>, ScriptError> {
    let unknown = || ScriptError::UnknownCommand {
        entry,
        text: text.to_owned(),
    };
    let (verb, arg) = text.split_once(char::is_whitespace).ok_or_else(unknown)?;
    let arg = arg.trim();

    match verb.to_ascii_uppercase().as_str() {
        "I" => parse_key(entry, arg).map(Command::Insert),
        "D" => parse_key(entry, arg).map(Command::Delete),
        "S" => parse_key(entry, arg).map(Command::Search),
        "T" => parse_traversal(entry, arg).map(Command::Traverse),
        _ => Err(unknown()),
    }
}

fn parse_key(entry: usize, text: &str) -> Result<Key, ScriptError> {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Key::Number(n)),
        _ => Err(ScriptError::InvalidKey {
            entry,
            text: text.to_owned(),
        }),
    }
}

/// A JSON number, or a string holding one. Anything else is refused the same
/// way a bad line entry is.
fn json_key(entry: usize, value: &serde_json::Value) -> Result<Key, ScriptError> {
    match value {
        serde_json::Value::Number(n) => parse_key(entry, &n.to_string()),
        serde_json::Value::String(s) => parse_key(entry, s.trim()),
        other => Err(ScriptError::InvalidKey {
            entry,
            text: other.to_string(),
        }),
    }
}

fn parse_traversal(entry: usize, text: &str) -> Result<TraverseKind, ScriptError> {
    match text.to_ascii_uppercase().as_str() {
        "PRE" => Ok(TraverseKind::Pre),
        "IN" => Ok(TraverseKind::In),
        "POST" => Ok(TraverseKind::Post),
        "LEVEL" => Ok(TraverseKind::Level),
        _ => Err(ScriptError::UnknownTraversal {
            entry,
            text: text.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_and_case() {
        let commands = parse_script("i 1,  D 2\n\ns -3.5 ,\nt Post").unwrap();

        assert_eq!(
            commands,
            vec![
                Command::Insert(Key::from(1)),
                Command::Delete(Key::from(2)),
                Command::Search(Key::from(-3.5)),
                Command::Traverse(TraverseKind::Post),
            ]
        );
        assert_eq!(commands[2].op(), OpKind::Search);
    }

    #[test]
    fn test_json_array_inserts() {
        let commands = parse_script(" [8, 3, 10] ").unwrap();

        assert_eq!(commands.len(), 3);
        assert!(commands.iter().all(|c| c.op() == OpKind::Insert));
    }

    #[test]
    fn test_json_keys_must_be_numbers() {
        let err = parse_script(r#"["x", 1]"#).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidKey { entry: 1, .. }));
        assert_eq!(err.to_string(), "entry 1: \"x\" is not a number");

        let err = parse_script("[1, null]").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidKey { entry: 2, .. }));

        assert_eq!(
            parse_script(r#"[" 2.5", -0]"#).unwrap(),
            vec![Command::Insert(Key::from(2.5)), Command::Insert(Key::from(0))]
        );
    }

    #[test]
    fn test_bad_json() {
        let err = parse_script("[8, ").unwrap_err();

        assert!(matches!(err, ScriptError::Json(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_errors_name_the_entry() {
        let err = parse_script("I 1, X 2").unwrap_err();
        assert_eq!(err.to_string(), "entry 2: unknown command \"X 2\"");

        let err = parse_script("I 1\nI two").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidKey { entry: 2, .. }));

        let err = parse_script("T sideways").unwrap_err();
        assert!(matches!(err, ScriptError::UnknownTraversal { entry: 1, .. }));

        let err = parse_script("I").unwrap_err();
        assert!(matches!(err, ScriptError::UnknownCommand { entry: 1, .. }));
    }

    #[test]
    fn test_non_finite_keys_are_rejected() {
        assert!(parse_script("I NaN").is_err());
        assert!(parse_script("I inf").is_err());
    }

    #[test]
    fn test_empty_script() {
        assert!(parse_script("  \n , ").unwrap().is_empty());
    }
}
