//! GitHub-style heading slugs

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /// Everything except letters, marks, numbers, connector punctuation, hyphen and space
    static ref DISALLOWED: Regex = Regex::new(r"[^\p{L}\p{M}\p{N}\p{Pc}\- ]").unwrap();
}

/// Lower-case, drop punctuation and symbols, turn spaces into hyphens
pub fn slugify(value: &str) -> String {
    DISALLOWED
        .replace_all(&value.to_lowercase(), "")
        .replace(' ', "-")
}

/// Hands out unique anchors for the headings of one document
///
/// The first heading with a given text gets the bare slug; later ones get
/// `-1`, `-2`, ... appended. One slugger must see every heading of a
/// document, in order, for anchors to line up with the rendered ids.
#[derive(Debug, Default)]
pub struct HeadingSlugger {
    occurrences: HashMap<String, usize>,
}

impl HeadingSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slug(&mut self, value: &str) -> String {
        let base = slugify(value);
        let mut result = base.clone();

        while self.occurrences.contains_key(&result) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            result = format!("{}-{}", base, count);
        }

        self.occurrences.insert(result.clone(), 0);
        result
    }

    /// Mark an explicit anchor as taken
    pub fn reserve(&mut self, id: &str) {
        self.occurrences.entry(id.to_string()).or_insert(0);
    }
}
