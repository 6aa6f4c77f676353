//! Rule primitives for the per-station classification tables.
//!
//! A [`Rule`] is a conjunction of [`Matcher`]s over the lower-cased fuel name.
//! Tables are ordered slices of rules; the first rule whose matchers all hold
//! decides the result.

/// A single test against a lower-cased, trimmed fuel name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Name contains the needle.
    Contains(&'static str),
    /// Name does not contain the needle.
    Lacks(&'static str),
    StartsWith(&'static str),
    EndsWith(&'static str),
    /// Name ends with a `plus` or `+` marker, as premium variants do.
    PremiumMarker,
    /// Negation of [`Matcher::PremiumMarker`].
    NoPremiumMarker,
}

impl Matcher {
    /// `name` must already be lower-cased.
    #[must_use]
    pub fn matches(self, name: &str) -> bool {
        match self {
            Matcher::Contains(needle) => name.contains(needle),
            Matcher::Lacks(needle) => !name.contains(needle),
            Matcher::StartsWith(prefix) => name.starts_with(prefix),
            Matcher::EndsWith(suffix) => name.ends_with(suffix),
            Matcher::PremiumMarker => has_premium_marker(name),
            Matcher::NoPremiumMarker => !has_premium_marker(name),
        }
    }
}

fn has_premium_marker(name: &str) -> bool {
    name.ends_with("plus") || name.ends_with('+')
}

/// One row of a classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule<T: 'static> {
    pub all: &'static [Matcher],
    pub result: T,
}

impl<T: Copy> Rule<T> {
    /// Returns `true` when every matcher holds. A rule with no matchers
    /// never fires.
    #[must_use]
    pub fn fires(&self, name: &str) -> bool {
        !self.all.is_empty() && self.all.iter().all(|m| m.matches(name))
    }
}

/// Result of the first rule in `table` that fires for `name`.
#[must_use]
pub fn first_match<T: Copy>(table: &[Rule<T>], name: &str) -> Option<T> {
    table.iter().find(|rule| rule.fires(name)).map(|rule| rule.result)
}

/// Lower-cases and trims a raw fuel name for matching.
///
/// Diacritics are left in place, so rules must spell them the way the source
/// site renders them.
#[must_use]
pub fn matching_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_marker_accepts_word_and_symbol() {
        assert!(Matcher::PremiumMarker.matches("diesel plus"));
        assert!(Matcher::PremiumMarker.matches("natural 95+"));
        assert!(!Matcher::PremiumMarker.matches("plus diesel"));
        assert!(Matcher::NoPremiumMarker.matches("diesel"));
    }

    #[test]
    fn lacks_is_negated_contains() {
        assert!(Matcher::Lacks("diesel").matches("natural 95"));
        assert!(!Matcher::Lacks("diesel").matches("verva diesel"));
    }

    #[test]
    fn first_match_respects_table_order() {
        const TABLE: &[Rule<u8>] = &[
            Rule {
                all: &[Matcher::Contains("diesel")],
                result: 1,
            },
            Rule {
                all: &[Matcher::Contains("verva")],
                result: 2,
            },
        ];
        assert_eq!(first_match(TABLE, "verva diesel"), Some(1));
        assert_eq!(first_match(TABLE, "verva 98"), Some(2));
        assert_eq!(first_match(TABLE, "lpg"), None);
    }

    #[test]
    fn empty_rule_never_fires() {
        let rule = Rule {
            all: &[],
            result: 0_u8,
        };
        assert!(!rule.fires("anything"));
    }

    #[test]
    fn matching_text_keeps_diacritics() {
        assert_eq!(
            matching_text("  Kapalina do OSTŘIKOVAČŮ "),
            "kapalina do ostřikovačů"
        );
    }
}
