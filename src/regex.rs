//! BSON regular expressions: a pattern plus MongoDB-style option letters.

/// A decoded BSON regular expression. `options` is read back exactly as it
/// was written; sorting only happens when the filter DSL builds one (see
/// `query::filter`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    pub pattern: String,
    pub options: String,
}

/// Sorts `options` into the canonical alphabetical order used by both the
/// writer (`§4.4`) and the filter DSL's `$regex` builder (`§4.11`).
pub fn sort_options(options: &str) -> String {
    let mut letters: Vec<char> = options.chars().collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}
