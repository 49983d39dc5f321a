//! Loose version ordering.
//!
//! Release ledgers and `nextver` compare versions the permissive way: a
//! version is split into numeric runs, lowercase alphabetic runs and any
//! other non-separator runs, then compared component by component.
//!
//! - numeric runs compare as integers (`0.10.0 > 0.9.0`)
//! - alphabetic runs compare lexicographically
//! - a numeric component orders before a textual one
//! - a version that is a strict prefix of another is the smaller one
//!   (`1.0.0 < 1.0.0.1`, and also `1.0.0 < 1.0.0-rc1`)
//!
//! # Examples
//!
//! ```
//! use wfpm_package::LooseVersion;
//!
//! assert!(LooseVersion::new("1.10.0") > LooseVersion::new("1.9.3"));
//! assert!(LooseVersion::new("0.2.0") == LooseVersion::new("0.2.0"));
//! ```

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Component {
    Num(u64),
    Text(String),
}

/// A version string with loose, segment-wise ordering.
#[derive(Debug, Clone)]
pub struct LooseVersion {
    raw: String,
    components: Vec<Component>,
}

impl LooseVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let components = split_components(&raw);
        Self { raw, components }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn split_components(raw: &str) -> Vec<Component> {
    #[derive(PartialEq, Clone, Copy)]
    enum Class {
        Digit,
        Lower,
        Dot,
        Other,
    }

    fn classify(c: char) -> Class {
        if c.is_ascii_digit() {
            Class::Digit
        } else if c.is_ascii_lowercase() {
            Class::Lower
        } else if c == '.' {
            Class::Dot
        } else {
            Class::Other
        }
    }

    let mut components = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        let class = classify(c);
        if class == Class::Dot {
            continue;
        }

        let mut run = String::from(c);
        while let Some(&next) = chars.peek() {
            if classify(next) != class {
                break;
            }
            run.push(next);
            chars.next();
        }

        let component = match class {
            Class::Digit => run
                .parse::<u64>()
                .map(Component::Num)
                .unwrap_or(Component::Text(run)),
            _ => Component::Text(run),
        };
        components.push(component);
    }

    components
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for LooseVersion {}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for LooseVersion {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Sort version strings newest first.
pub fn sort_descending<I, S>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parsed: Vec<LooseVersion> = versions.into_iter().map(LooseVersion::new).collect();
    parsed.sort_by(|a, b| b.cmp(a));
    parsed.into_iter().map(|v| v.raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.1.0", "1.0.0")]
    #[case("0.10.0", "0.9.0")]
    #[case("1.0.0.1", "1.0.0")]
    #[case("2.0.0", "1.99.99")]
    #[case("1.0.0-rc2", "1.0.0-rc1")]
    #[case("1.0.0-rc1", "1.0.0")]
    fn test_greater(#[case] newer: &str, #[case] older: &str) {
        assert!(LooseVersion::new(newer) > LooseVersion::new(older));
        assert!(LooseVersion::new(older) < LooseVersion::new(newer));
    }

    #[test]
    fn test_equal_versions() {
        assert_eq!(LooseVersion::new("0.2.0"), LooseVersion::new("0.2.0"));
        assert_eq!(
            LooseVersion::new("0.2.0").cmp(&LooseVersion::new("0.2.0")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_sort_descending() {
        let sorted = sort_descending(["1.0.0", "1.10.0", "1.2.0", "0.9.9"]);
        assert_eq!(sorted, vec!["1.10.0", "1.2.0", "1.0.0", "0.9.9"]);
    }

    #[test]
    fn test_display_keeps_raw_text() {
        assert_eq!(LooseVersion::new("1.0.0-rc.1").to_string(), "1.0.0-rc.1");
    }
}
