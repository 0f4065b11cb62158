//! Combines a base label with a sequence token.

use crate::sequence::{generate_with, Alphabet, SequenceKind};
use serde::{Deserialize, Serialize};

/// Where the sequence token goes relative to the base text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPosition {
    None,
    Prefix,
    Suffix,
    Both,
}

impl TokenPosition {
    pub fn from_flags(prefix: bool, suffix: bool) -> Self {
        match (prefix, suffix) {
            (true, true) => TokenPosition::Both,
            (true, false) => TokenPosition::Prefix,
            (false, true) => TokenPosition::Suffix,
            (false, false) => TokenPosition::None,
        }
    }
}

pub fn compose(base: &str, index: usize, kind: SequenceKind, position: TokenPosition) -> String {
    compose_with(base, index, kind, position, &Alphabet::default())
}

/// Builds the label for the item at `index`.
///
/// `TokenPosition::None` yields an empty label, not the unmodified base text.
///
/// A base that is empty or numeric is replaced by the token outright. A disabled
/// sequence kind leaves the base untouched.
pub fn compose_with(
    base: &str,
    index: usize,
    kind: SequenceKind,
    position: TokenPosition,
    alphabet: &Alphabet,
) -> String {
    if position == TokenPosition::None {
        return String::new();
    }

    let Some(token) = generate_with(kind, index, alphabet) else {
        return base.to_string();
    };

    if is_numeric_or_empty(base) {
        return token;
    }

    match position {
        TokenPosition::Prefix => format!("{} {}", token, base),
        TokenPosition::Suffix => format!("{} {}", base, token),
        TokenPosition::Both => format!("{} {} {}", token, base, token),
        TokenPosition::None => String::new(),
    }
}

fn is_numeric_or_empty(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    trimmed.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_from_flags() {
        assert_eq!(TokenPosition::from_flags(true, true), TokenPosition::Both);
        assert_eq!(TokenPosition::from_flags(true, false), TokenPosition::Prefix);
        assert_eq!(TokenPosition::from_flags(false, true), TokenPosition::Suffix);
        assert_eq!(TokenPosition::from_flags(false, false), TokenPosition::None);
    }

    #[test]
    fn prefix_suffix_and_both() {
        let kind = SequenceKind::Alphabetical;
        assert_eq!(compose("Label", 0, kind, TokenPosition::Prefix), "a Label");
        assert_eq!(compose("Label", 1, kind, TokenPosition::Suffix), "Label b");
        assert_eq!(compose("Label", 26, kind, TokenPosition::Both), "aa Label aa");
        assert_eq!(
            compose("Phone", 2, SequenceKind::Numeric, TokenPosition::Suffix),
            "Phone 3"
        );
    }

    #[test]
    fn none_position_blanks_the_label() {
        assert_eq!(
            compose("Label", 0, SequenceKind::Alphabetical, TokenPosition::None),
            ""
        );
        assert_eq!(
            compose("Label", 0, SequenceKind::Disabled, TokenPosition::None),
            ""
        );
    }

    #[test]
    fn non_finite_words_stay_text() {
        let kind = SequenceKind::Numeric;
        assert_eq!(compose("Infinity", 0, kind, TokenPosition::Suffix), "Infinity 1");
        assert_eq!(compose("inf", 1, kind, TokenPosition::Prefix), "2 inf");
        assert_eq!(compose("NaN", 0, kind, TokenPosition::Suffix), "NaN 1");
    }

    #[test]
    fn empty_or_numeric_base_becomes_the_token() {
        let kind = SequenceKind::Numeric;
        assert_eq!(compose("", 4, kind, TokenPosition::Both), "5");
        assert_eq!(compose("12", 0, kind, TokenPosition::Prefix), "1");
        assert_eq!(
            compose(" 3.5 ", 1, SequenceKind::Alphabetical, TokenPosition::Suffix),
            "b"
        );
    }

    #[test]
    fn nan_is_not_numeric() {
        assert_eq!(
            compose("NaN", 0, SequenceKind::Numeric, TokenPosition::Suffix),
            "NaN 1"
        );
    }

    #[test]
    fn disabled_kind_keeps_base() {
        assert_eq!(
            compose("Label", 3, SequenceKind::Disabled, TokenPosition::Prefix),
            "Label"
        );
    }
}
