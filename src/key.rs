//! The key type used by scripts and exported sessions.
//!
//! The engine itself is generic over any key type with a comparator, but the
//! text formats need something concrete: a key is either a number or a
//! string. Numbers sort before strings.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A numeric or lexicographic key.
///
/// # Examples
///
/// ```
/// use bst_trace::Key;
///
/// assert!(Key::from(2) < Key::from(10));
/// assert!(Key::from("apple") < Key::from("banana"));
/// assert!(Key::from(1_000) < Key::from("0"));
/// assert_eq!(Key::from(3).to_string(), "3");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// A number. `-0` and `0` are the same key; otherwise numbers follow
    /// IEEE 754 total order.
    Number(f64),
    /// A string, ordered lexicographically.
    Text(String),
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) if a == b => Ordering::Equal,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Key {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_sort_before_text() {
        let mut keys = vec![Key::from("b"), Key::from(7), Key::from("a"), Key::from(-1.5)];
        keys.sort();

        assert_eq!(
            keys,
            vec![Key::from(-1.5), Key::from(7), Key::from("a"), Key::from("b")]
        );
    }

    #[test]
    fn test_signed_zeros_are_one_key() {
        assert_eq!(Key::from(-0.0), Key::from(0));
        assert_eq!(Key::from(-0.0).cmp(&Key::from(0.0)), Ordering::Equal);
        assert!(Key::from(-0.5) < Key::from(-0.0));
        assert!(Key::from(0.0) < Key::from(f64::MIN_POSITIVE));
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::from(8).to_string(), "8");
        assert_eq!(Key::from(2.25).to_string(), "2.25");
        assert_eq!(Key::from("pear").to_string(), "pear");
    }

    #[test]
    fn test_untagged_json() {
        let keys: Vec<Key> = serde_json::from_str(r#"[3, 4.5, "x"]"#).unwrap();
        assert_eq!(keys, vec![Key::from(3), Key::from(4.5), Key::from("x")]);
    }
}
