//! Type-name pattern matching for catalogue sets.

/// Marker for legacy substring patterns. Prefix matching is the canonical
/// semantics; substring matching is opt-in per pattern only.
const CONTAINS_MARKER: &str = "contains:";

/// A set of type-name patterns with exact-or-prefix semantics.
///
/// A configured name `X` matches a queried name `Y` iff `Y == X` or `Y`
/// starts with `X` at a name boundary. The boundary rule keeps
/// `com.example.Foo` from matching `com.example.FooBar` while still letting
/// package prefixes like `io.lettuce.core.` or shaded-relocation prefixes
/// match everything beneath them.
#[derive(Debug, Clone, Default)]
pub struct TypePatternSet {
    prefixes: Vec<String>,
    substrings: Vec<String>,
}

impl TypePatternSet {
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for pattern in patterns {
            set.add(pattern.into());
        }
        set
    }

    pub fn add(&mut self, pattern: String) {
        match pattern.strip_prefix(CONTAINS_MARKER) {
            Some(rest) => self.substrings.push(rest.to_string()),
            None => self.prefixes.push(pattern),
        }
    }

    pub fn extend<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            self.add(pattern.into());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.substrings.is_empty()
    }

    pub fn matches(&self, queried: &str) -> bool {
        self.prefixes
            .iter()
            .any(|configured| prefix_matches(configured, queried))
            || self
                .substrings
                .iter()
                .any(|configured| queried.contains(configured.as_str()))
    }
}

fn prefix_matches(configured: &str, queried: &str) -> bool {
    if queried == configured {
        return true;
    }
    let Some(rest) = queried.strip_prefix(configured) else {
        return false;
    };
    // Boundary: the configured name ended a package segment, or the match
    // continues into a nested-class or deeper-package name.
    configured.ends_with('.') || rest.starts_with('.') || rest.starts_with('$')
}
