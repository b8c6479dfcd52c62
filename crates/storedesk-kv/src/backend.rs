//! Cache backend trait and key pattern matching

use std::time::Duration;

use async_trait::async_trait;

use crate::error::KvError;

/// Upper bound on matcher steps for a single key
const MAX_MATCH_ITERATIONS: usize = 10000;

/// Key-value transport used by the cache client.
///
/// Values are opaque strings; expiry is handled by the backend.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &'static str;

    /// Establish (or re-establish) the underlying connection
    async fn connect(&self) -> Result<(), KvError>;

    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Store a value; `None` means no expiry
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError>;

    /// Remove exact keys, returning how many existed
    async fn delete(&self, keys: &[String]) -> Result<u64, KvError>;

    /// List keys matching a glob pattern
    async fn scan(&self, pattern: &str) -> Result<Vec<String>, KvError>;
}

/// Whether a key contains glob wildcards
pub fn is_pattern(key: &str) -> bool {
    key.contains(['*', '?'])
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternPart {
    /// Literal text that must match exactly
    Literal(String),
    /// Exactly one character (?)
    AnyChar,
    /// Zero or more characters (*)
    AnySequence,
}

/// Compiled glob over cache keys. `*` matches any run of characters
/// (separators included) and `?` matches one character.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    parts: Vec<PatternPart>,
}

impl KeyPattern {
    pub fn compile(pattern: &str) -> Self {
        let mut parts = Vec::new();
        let mut current = String::new();

        for ch in pattern.chars() {
            match ch {
                '*' | '?' => {
                    if !current.is_empty() {
                        parts.push(PatternPart::Literal(std::mem::take(&mut current)));
                    }
                    if ch == '?' {
                        parts.push(PatternPart::AnyChar);
                    } else if parts.last() != Some(&PatternPart::AnySequence) {
                        parts.push(PatternPart::AnySequence);
                    }
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            parts.push(PatternPart::Literal(current));
        }

        Self { parts }
    }

    pub fn matches(&self, key: &str) -> bool {
        let mut iterations = 0;
        Self::match_from(&self.parts, key, &mut iterations)
    }

    fn match_from(parts: &[PatternPart], key: &str, iterations: &mut usize) -> bool {
        *iterations += 1;
        if *iterations > MAX_MATCH_ITERATIONS {
            tracing::warn!(
                "Key pattern matching exceeded {} iterations, aborting",
                MAX_MATCH_ITERATIONS
            );
            return false;
        }

        let Some((part, rest)) = parts.split_first() else {
            return key.is_empty();
        };

        match part {
            PatternPart::Literal(lit) => key
                .strip_prefix(lit.as_str())
                .is_some_and(|remaining| Self::match_from(rest, remaining, iterations)),
            PatternPart::AnyChar => {
                let mut chars = key.chars();
                chars.next().is_some() && Self::match_from(rest, chars.as_str(), iterations)
            }
            PatternPart::AnySequence => {
                if rest.is_empty() {
                    return true;
                }
                key.char_indices()
                    .map(|(i, _)| i)
                    .chain(std::iter::once(key.len()))
                    .any(|i| Self::match_from(rest, &key[i..], iterations))
            }
        }
    }
}
