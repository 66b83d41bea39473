use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Next,
    Previous,
}

/// A match as a byte range into the buffer it was computed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl SearchMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("matches are out of date with the buffer")]
    StaleMatches,
}

/// Regex search over a whole buffer, with a navigable match set.
///
/// The pattern is used as a regular expression as typed; metacharacters are
/// not escaped. Zero-length matches are never reported or replaced.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub pattern: String,
    pub case_sensitive: bool,
    regex: Option<Regex>,
    error: Option<SearchError>,
    matches: Vec<SearchMatch>,
    current_match: Option<usize>,
    // Buffer revision the match set was computed against
    revision: Option<u64>,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            pattern: String::new(),
            case_sensitive: false,
            regex: None,
            error: None,
            matches: Vec::new(),
            current_match: None,
            revision: None,
        }
    }

    /// Compile `pattern`. On error the previous matches are dropped and the
    /// error is kept for [`SearchState::status`].
    pub fn set_pattern(&mut self, pattern: &str) -> Result<(), SearchError> {
        self.pattern = pattern.to_string();
        self.compile()
    }

    pub fn set_case_sensitive(&mut self, case_sensitive: bool) -> Result<(), SearchError> {
        self.case_sensitive = case_sensitive;
        self.compile()
    }

    fn compile(&mut self) -> Result<(), SearchError> {
        self.matches.clear();
        self.current_match = None;
        self.revision = None;
        self.error = None;
        self.regex = None;

        if self.pattern.is_empty() {
            return Ok(());
        }

        match RegexBuilder::new(&self.pattern)
            .case_insensitive(!self.case_sensitive)
            .build()
        {
            Ok(regex) => {
                self.regex = Some(regex);
                Ok(())
            }
            Err(e) => {
                let error = SearchError::InvalidPattern(e.to_string());
                self.error = Some(error.clone());
                Err(error)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    /// Recompute every non-overlapping match in `buffer`, left to right.
    ///
    /// When the pattern is unchanged since the last computation the selected
    /// match index is kept, clamped into the new match set; otherwise the
    /// first match is selected.
    pub fn compute_matches(&mut self, buffer: &str, revision: u64) -> usize {
        let keep_selection = self.revision.is_some();
        let previous = self.current_match;

        self.matches.clear();
        self.current_match = None;
        self.revision = Some(revision);

        let Some(regex) = &self.regex else {
            return 0;
        };

        self.matches.extend(
            regex
                .find_iter(buffer)
                .filter(|m| !m.is_empty())
                .map(|m| SearchMatch {
                    start: m.start(),
                    end: m.end(),
                    text: m.as_str().to_string(),
                }),
        );

        if !self.matches.is_empty() {
            let index = match previous {
                Some(index) if keep_selection => index.min(self.matches.len() - 1),
                _ => 0,
            };
            self.current_match = Some(index);
        }

        self.matches.len()
    }

    pub fn is_current_for(&self, revision: u64) -> bool {
        self.revision == Some(revision)
    }

    /// Move the selection circularly; no-op on an empty match set
    pub fn navigate(&mut self, direction: SearchDirection) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        let current = self.current_match.unwrap_or(0);
        let next = match direction {
            SearchDirection::Next => (current + 1) % len,
            SearchDirection::Previous => (current + len - 1) % len,
        };
        self.current_match = Some(next);
        self.matches.get(next)
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn match_offsets(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.start).collect()
    }

    pub fn current_match(&self) -> Option<&SearchMatch> {
        self.current_match.and_then(|i| self.matches.get(i))
    }

    pub fn current_match_index(&self) -> Option<usize> {
        self.current_match
    }

    pub fn can_replace(&self) -> bool {
        self.current_match().is_some()
    }

    /// Splice `replacement` over the selected match and return the new buffer.
    ///
    /// The spliced range is the match itself, `[start, end)`, not
    /// `start + pattern.len()`; the two only agree for literal patterns.
    /// `$1`/`${name}` in the replacement expand to the match's groups. The
    /// match set is left as-is; the caller recomputes against the new buffer.
    pub fn replace_current(
        &self,
        buffer: &str,
        revision: u64,
        replacement: &str,
    ) -> Result<Option<String>, SearchError> {
        let (Some(regex), Some(selected)) = (&self.regex, self.current_match()) else {
            return Ok(None);
        };
        if !self.is_current_for(revision) {
            return Err(SearchError::StaleMatches);
        }

        let mut expanded = String::new();
        match regex.captures_at(buffer, selected.start) {
            Some(caps) if caps.get(0).map(|m| m.start()) == Some(selected.start) => {
                caps.expand(replacement, &mut expanded);
            }
            _ => expanded.push_str(replacement),
        }

        let mut result = String::with_capacity(buffer.len() + expanded.len());
        result.push_str(&buffer[..selected.start]);
        result.push_str(&expanded);
        result.push_str(&buffer[selected.end..]);
        Ok(Some(result))
    }

    /// Replace every match in one pass, computed against the original buffer.
    /// Returns the new buffer and the number of replacements.
    pub fn replace_all(&self, buffer: &str, replacement: &str) -> (String, usize) {
        let Some(regex) = &self.regex else {
            return (buffer.to_string(), 0);
        };

        let mut result = String::with_capacity(buffer.len());
        let mut last_end = 0;
        let mut count = 0;

        for caps in regex.captures_iter(buffer) {
            let Some(m) = caps.get(0) else { continue };
            if m.is_empty() {
                continue;
            }
            result.push_str(&buffer[last_end..m.start()]);
            caps.expand(replacement, &mut result);
            last_end = m.end();
            count += 1;
        }
        result.push_str(&buffer[last_end..]);

        (result, count)
    }

    pub fn status(&self) -> String {
        if let Some(error) = &self.error {
            return error.to_string();
        }
        match self.current_match {
            Some(index) if !self.matches.is_empty() => {
                format!("{} of {}", index + 1, self.matches.len())
            }
            _ => "No matches".to_string(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self {
            case_sensitive: self.case_sensitive,
            ..Self::new()
        };
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(pattern: &str, case_sensitive: bool, buffer: &str) -> SearchState {
        let mut search = SearchState::new();
        search.set_case_sensitive(case_sensitive).unwrap();
        search.set_pattern(pattern).unwrap();
        search.compute_matches(buffer, 1);
        search
    }

    #[test]
    fn test_case_insensitive_matches() {
        let search = search("ab", false, "AbcAbAB");
        assert_eq!(search.match_offsets(), vec![0, 3, 5]);
        assert_eq!(search.current_match_index(), Some(0));
    }

    #[test]
    fn test_case_sensitive_matches() {
        let search = search("Ab", true, "AbcAbAB");
        assert_eq!(search.match_offsets(), vec![0, 3]);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let search = search("aa", true, "aaaa");
        assert_eq!(search.match_offsets(), vec![0, 2]);
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        let search = search("", false, "anything");
        assert!(search.matches().is_empty());
        assert_eq!(search.status(), "No matches");
        assert!(!search.can_replace());
    }

    #[test]
    fn test_zero_length_matches_skipped() {
        let search = search("x*", true, "axxb");
        assert_eq!(search.match_offsets(), vec![1]);

        let (replaced, count) = search.replace_all("axxb", "-");
        assert_eq!(replaced, "a-b");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_invalid_pattern_reports_error() {
        let mut search = SearchState::new();
        let result = search.set_pattern("(unclosed");
        assert!(matches!(result, Err(SearchError::InvalidPattern(_))));
        assert!(!search.is_active());
        assert_eq!(search.compute_matches("(unclosed", 1), 0);
        assert!(search.status().starts_with("Invalid pattern"));
        assert!(!search.can_replace());

        // A valid pattern clears the error
        search.set_pattern("ok").unwrap();
        search.compute_matches("ok", 2);
        assert_eq!(search.status(), "1 of 1");
    }

    #[test]
    fn test_metacharacters_are_regex() {
        let search = search("a.c", true, "abc a.c");
        assert_eq!(search.match_offsets(), vec![0, 4]);
    }

    #[test]
    fn test_navigate_wraps() {
        let mut search = search("o", true, "foo bob");
        assert_eq!(search.matches().len(), 3);

        assert_eq!(search.navigate(SearchDirection::Next).unwrap().start, 2);
        assert_eq!(search.navigate(SearchDirection::Next).unwrap().start, 5);
        assert_eq!(search.navigate(SearchDirection::Next).unwrap().start, 1);
        assert_eq!(search.navigate(SearchDirection::Previous).unwrap().start, 5);
        assert_eq!(search.status(), "3 of 3");
    }

    #[test]
    fn test_navigate_empty_is_noop() {
        let mut search = search("zzz", true, "abc");
        assert!(search.navigate(SearchDirection::Next).is_none());
        assert_eq!(search.current_match_index(), None);
    }

    #[test]
    fn test_replace_all_banana() {
        let search = search("a", true, "banana");
        let (replaced, count) = search.replace_all("banana", "X");
        assert_eq!(replaced, "bXnXnX");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_replace_all_uses_original_offsets() {
        // Replacement contains the pattern; it must not be rescanned
        let search = search("a", true, "aa");
        let (replaced, _) = search.replace_all("aa", "aa");
        assert_eq!(replaced, "aaaa");
    }

    #[test]
    fn test_replace_current_splices_selected_match() {
        let mut search = search("cat", false, "cat Cat cat");
        search.navigate(SearchDirection::Next);

        let replaced = search.replace_current("cat Cat cat", 1, "dog").unwrap();
        assert_eq!(replaced.as_deref(), Some("cat dog cat"));
        // Match set is not recomputed by the engine
        assert_eq!(search.matches().len(), 3);
    }

    #[test]
    fn test_replace_expands_groups() {
        let search = search(r"(\w+)@(\w+)", true, "me@home you@work");
        let (replaced, count) = search.replace_all("me@home you@work", "$2:$1");
        assert_eq!(replaced, "home:me work:you");
        assert_eq!(count, 2);

        let single = search
            .replace_current("me@home you@work", 1, "<$1>")
            .unwrap();
        assert_eq!(single.as_deref(), Some("<me> you@work"));
    }

    #[test]
    fn test_replace_current_rejects_stale_matches() {
        let search = search("a", true, "banana");
        assert_eq!(
            search.replace_current("banana", 2, "X"),
            Err(SearchError::StaleMatches)
        );
    }

    #[test]
    fn test_recompute_clamps_selection() {
        let mut search = search("a", true, "a a a");
        search.navigate(SearchDirection::Previous);
        assert_eq!(search.current_match_index(), Some(2));

        search.compute_matches("a a", 2);
        assert_eq!(search.current_match_index(), Some(1));

        // A new pattern starts from the first match
        search.set_pattern("a").unwrap();
        search.compute_matches("a a", 3);
        assert_eq!(search.current_match_index(), Some(0));
    }
}
