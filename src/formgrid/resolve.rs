//! # Duplicate-Key Resolution
//!
//! Host data may declare several fields under the same key. Before items go live, every
//! value that occurs more than once for an attribute gets a disambiguation suffix
//! (`[n]` by default), with `n` counting up from zero across all duplicates of that
//! attribute in scan order. Values that occur once are left alone.
//!
//! ```text
//! name:  a    a    b        name:  a[0]  a[1]  b
//! id:    x    y    x   ->   id:    x[0]  y     x[1]
//! ```
//!
//! Attributes are handled independently and in the order given. Resolution is not
//! idempotent (`a[0]`, `a[0]` would become `a[0][0]`, `a[0][1]`), which is why it takes
//! [`RawDescriptor`]s and hands back [`ResolvedDescriptor`]s.
//!
//! A suffixed value never lands on a value the host already uses: `a`, `a`, `a[0]`
//! resolves to `a[1]`, `a[2]`, `a[0]`. Empty alt keys mean "not set" and are never
//! treated as duplicates of each other; empty keys are, so `""`, `""` becomes `[0]`, `[1]`.

use crate::error::{GridError, Result};
use crate::field::{KeyAttr, Origin, RawDescriptor, ResolvedDescriptor};
use std::collections::{HashMap, HashSet};

const NUMERAL_SLOT: &str = "{n}";

/// The text wrapped around a disambiguation numeral, e.g. `[{n}]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixTemplate {
    open: String,
    close: String,
}

impl SuffixTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let Some((open, close)) = template.split_once(NUMERAL_SLOT) else {
            return Err(GridError::InvalidTemplate(format!(
                "\"{}\" has no {} slot",
                template, NUMERAL_SLOT
            )));
        };
        if close.contains(NUMERAL_SLOT) {
            return Err(GridError::InvalidTemplate(format!(
                "\"{}\" has more than one {} slot",
                template, NUMERAL_SLOT
            )));
        }
        Ok(Self {
            open: open.to_string(),
            close: close.to_string(),
        })
    }

    pub fn apply(&self, base: &str, n: usize) -> String {
        format!("{}{}{}{}", base, self.open, n, self.close)
    }

    /// The numeral of a trailing suffix, if `value` ends with one.
    pub fn extract(&self, value: &str) -> Option<usize> {
        self.split(value).map(|(_, n)| n)
    }

    /// Splits `value` into its base and trailing numeral.
    pub fn split<'a>(&self, value: &'a str) -> Option<(&'a str, usize)> {
        let rest = value.strip_suffix(self.close.as_str())?;
        let digits_start = rest
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)?;
        let n = rest[digits_start..].parse().ok()?;
        let base = rest[..digits_start].strip_suffix(self.open.as_str())?;
        Some((base, n))
    }

    /// True if `value` is `base` followed by a suffix.
    pub fn is_suffixed_form_of(&self, value: &str, base: &str) -> bool {
        matches!(self.split(value), Some((b, _)) if b == base)
    }
}

impl Default for SuffixTemplate {
    fn default() -> Self {
        Self {
            open: "[".to_string(),
            close: "]".to_string(),
        }
    }
}

/// Appends suffixes to every repeated value, in place. Empty values are left alone.
pub fn disambiguate(values: &mut [String], template: &SuffixTemplate) {
    suffix_duplicates(values, template, false);
}

/// Like [`disambiguate`], but repeated empty values are suffixed too.
pub fn disambiguate_all(values: &mut [String], template: &SuffixTemplate) {
    suffix_duplicates(values, template, true);
}

/// A numeral whose suffixed value already occurs among the values is skipped, so the
/// result never repeats a value.
fn suffix_duplicates(values: &mut [String], template: &SuffixTemplate, include_empty: bool) {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for v in values.iter() {
        if include_empty || !v.is_empty() {
            *occurrences.entry(v.clone()).or_default() += 1;
        }
    }
    let duplicated: Vec<bool> = values
        .iter()
        .map(|v| occurrences.get(v).is_some_and(|&count| count > 1))
        .collect();
    let mut taken: HashSet<String> = occurrences
        .into_iter()
        .filter(|(_, count)| *count == 1)
        .map(|(v, _)| v)
        .collect();

    let mut counter = 0;
    for (value, is_dup) in values.iter_mut().zip(duplicated) {
        if !is_dup {
            continue;
        }
        let mut candidate = template.apply(value, counter);
        counter += 1;
        while taken.contains(&candidate) {
            candidate = template.apply(value, counter);
            counter += 1;
        }
        taken.insert(candidate.clone());
        *value = candidate;
    }
}

/// Resolves host descriptors into live items.
pub fn resolve(
    mut items: Vec<RawDescriptor>,
    attrs: &[KeyAttr],
    template: &SuffixTemplate,
) -> Vec<ResolvedDescriptor> {
    for &attr in attrs {
        let mut values: Vec<String> = items.iter().map(|i| i.attr(attr).to_string()).collect();
        match attr {
            KeyAttr::Key => disambiguate_all(&mut values, template),
            KeyAttr::AltKey => disambiguate(&mut values, template),
        }
        for (item, value) in items.iter_mut().zip(values) {
            *item.attr_mut(attr) = value;
        }
    }
    items
        .into_iter()
        .map(|raw| ResolvedDescriptor::from_raw(raw, Origin::FromHost))
        .collect()
}
