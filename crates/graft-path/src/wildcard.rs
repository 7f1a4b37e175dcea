//! Glob-style matching of relation names.

use std::fmt;

use dashmap::DashMap;
use regex_automata::meta::Regex;

use crate::error::PatternError;

/// A compiled `*`/`?` glob over relation names.
///
/// `*` matches any run of characters including the empty one, `?` matches
/// exactly one character, everything else is literal. Relation names repeat
/// heavily across the nodes of a traversal, so per-name match decisions are
/// memoized; the memo is concurrency-safe because a compiled pattern may be
/// shared across traversals running on different threads.
pub struct WildcardMatcher {
    glob: String,
    regex: Regex,
    decisions: DashMap<String, bool>,
}

impl WildcardMatcher {
    /// Compiles a glob into a whole-name matcher.
    pub fn new(glob: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(&translate(glob)).map_err(|e| PatternError::Glob {
            glob: glob.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            glob: glob.to_string(),
            regex,
            decisions: DashMap::new(),
        })
    }

    /// The glob source text.
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// Whether `name` matches the glob as a whole.
    pub fn matches(&self, name: &str) -> bool {
        if let Some(decision) = self.decisions.get(name) {
            return *decision;
        }
        let matched = self.regex.is_match(name);
        self.decisions.insert(name.to_string(), matched);
        matched
    }
}

/// Translates a glob into an anchored regex: `*` becomes a reluctant `.*?`,
/// `?` becomes `.`, literal runs are escaped.
fn translate(glob: &str) -> String {
    let mut source = String::from("(?s)^");
    let mut literal = String::new();
    for c in glob.chars() {
        match c {
            '*' | '?' => {
                regex_syntax::escape_into(&literal, &mut source);
                literal.clear();
                source.push_str(if c == '*' { ".*?" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    regex_syntax::escape_into(&literal, &mut source);
    source.push('$');
    source
}

impl fmt::Debug for WildcardMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.glob)
    }
}

impl PartialEq for WildcardMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.glob == other.glob
    }
}

impl Eq for WildcardMatcher {}
