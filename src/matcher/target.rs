//! Search target and substring matching.

use memchr::memmem::Finder;

use crate::crypto::{BASE64_ALPHABET, FIXED_PREFIX, LEADING_RANDOM_ALPHABET, RANDOM_CHARS};

/// Decides whether an encoded public key is a hit.
///
/// Shared by every worker, so implementations must be callable concurrently.
pub trait Matcher: Send + Sync {
    fn matches(&self, encoded: &[u8]) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("target sequence cannot be empty")]
    Empty,
}

/// A compiled search target.
///
/// When case insensitive, the pattern is folded to ASCII lowercase once here
/// and the haystack is folded byte by byte during the scan.
#[derive(Debug, Clone)]
pub struct SearchTarget {
    /// The pattern (folded if case insensitive)
    pattern: String,
    /// Whether ASCII case is ignored
    case_insensitive: bool,
    /// Precompiled substring searcher for the case-sensitive path
    finder: Finder<'static>,
}

impl SearchTarget {
    /// Creates a new target. Rejects an empty pattern.
    pub fn new(pattern: impl Into<String>, case_insensitive: bool) -> Result<Self, TargetError> {
        let mut pattern = pattern.into();
        if pattern.is_empty() {
            return Err(TargetError::Empty);
        }
        if case_insensitive {
            pattern.make_ascii_lowercase();
        }
        let finder = Finder::new(pattern.as_bytes()).into_owned();

        Ok(Self {
            pattern,
            case_insensitive,
            finder,
        })
    }

    /// Returns the pattern as matched (lowercase if case insensitive).
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Returns "case-insensitive" or "case-sensitive".
    pub fn case_mode(&self) -> &'static str {
        if self.case_insensitive {
            "case-insensitive"
        } else {
            "case-sensitive"
        }
    }

    /// Tests `encoded` for an occurrence of the pattern.
    #[inline]
    pub fn is_match(&self, encoded: &[u8]) -> bool {
        if self.case_insensitive {
            contains_ignore_ascii_case(encoded, self.pattern.as_bytes())
        } else {
            self.finder.find(encoded).is_some()
        }
    }

    /// Returns true if every key matches, because the pattern lies inside
    /// the fixed part of the encoding.
    pub fn is_trivial(&self) -> bool {
        self.is_match(FIXED_PREFIX.as_bytes())
    }

    /// Returns false if no Ed25519 key can ever contain the pattern.
    ///
    /// The pattern may start inside the fixed prefix and continue into the
    /// random base64 tail, but every byte past the prefix must be one the
    /// key can hold at that position.
    pub fn is_reachable(&self) -> bool {
        self.is_trivial() || self.hit_probability() > 0.0
    }

    /// Returns the expected number of attempts to find a match, or `None` if
    /// the pattern is unreachable.
    ///
    /// Random base64 positions match a character with probability 1/64, or
    /// 2/64 for a letter when case is ignored. The first random position only
    /// takes `A`..=`P`, so it matches with probability 1/16 or 0.
    pub fn estimated_difficulty(&self) -> Option<u64> {
        if self.is_trivial() {
            return Some(1);
        }
        let probability = self.hit_probability();
        if probability <= 0.0 {
            return None;
        }
        Some((1.0 / probability).clamp(1.0, u64::MAX as f64) as u64)
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        match self.estimated_difficulty() {
            None => "Impossible (pattern cannot occur in an ssh-ed25519 key)".into(),
            Some(0..=1_000) => "Very Easy (< 1 second)".into(),
            Some(1_001..=10_000_000) => "Easy (seconds)".into(),
            Some(10_000_001..=1_000_000_000) => "Medium (minutes)".into(),
            Some(1_000_000_001..=100_000_000_000) => "Hard (hours)".into(),
            Some(_) => "Very Hard (days or more)".into(),
        }
    }

    /// Sums the chance of a hit over every placement: straddling the end of
    /// the fixed prefix, or wholly inside the random tail.
    fn hit_probability(&self) -> f64 {
        let pattern = self.pattern.as_bytes();
        let prefix = FIXED_PREFIX.as_bytes();

        let straddling: f64 = (1..pattern.len().min(prefix.len() + 1))
            .filter(|&split| self.bytes_equal(&prefix[prefix.len() - split..], &pattern[..split]))
            .map(|split| self.tail_probability(&pattern[split..], 0))
            .sum();
        let inside: f64 = (0..=RANDOM_CHARS.saturating_sub(pattern.len()))
            .map(|offset| self.tail_probability(pattern, offset))
            .sum();

        straddling + inside
    }

    /// Chance that the random tail holds `bytes` starting at `offset`.
    fn tail_probability(&self, bytes: &[u8], offset: usize) -> f64 {
        if offset + bytes.len() > RANDOM_CHARS {
            return 0.0;
        }
        bytes
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                let alphabet = if offset + i == 0 {
                    LEADING_RANDOM_ALPHABET
                } else {
                    BASE64_ALPHABET
                };
                let hits = alphabet.bytes().filter(|&c| self.byte_eq(c, b)).count();
                hits as f64 / alphabet.len() as f64
            })
            .product()
    }

    fn byte_eq(&self, key: u8, pattern: u8) -> bool {
        // A folded pattern only holds lowercase letters.
        if self.case_insensitive {
            key.to_ascii_lowercase() == pattern
        } else {
            key == pattern
        }
    }

    fn bytes_equal(&self, haystack: &[u8], pattern: &[u8]) -> bool {
        haystack.len() == pattern.len()
            && haystack.iter().zip(pattern).all(|(&h, &p)| self.byte_eq(h, p))
    }
}

impl Matcher for SearchTarget {
    #[inline]
    fn matches(&self, encoded: &[u8]) -> bool {
        self.is_match(encoded)
    }
}

/// Substring search folding the haystack to ASCII lowercase on the fly.
///
/// `needle` must already be lowercase.
fn contains_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }

    let first = needle[0];
    let first_upper = first.to_ascii_uppercase();
    let last_start = haystack.len() - needle.len();

    let mut start = 0;
    while start <= last_start {
        let offset = if first != first_upper {
            memchr::memchr2(first, first_upper, &haystack[start..=last_start])
        } else {
            memchr::memchr(first, &haystack[start..=last_start])
        };
        let Some(offset) = offset else {
            return false;
        };

        let pos = start + offset;
        let window = &haystack[pos + 1..pos + needle.len()];
        if window
            .iter()
            .zip(&needle[1..])
            .all(|(&h, &n)| h.to_ascii_lowercase() == n)
        {
            return true;
        }
        start = pos + 1;
    }

    false
}
