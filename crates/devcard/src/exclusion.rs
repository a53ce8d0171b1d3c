//! Repository exclusion filter.

use std::collections::HashSet;

/// Repository names to leave out of star and language totals.
///
/// Matching is by exact name. No patterns, no case folding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from a caller-supplied list. Entries are kept as given;
    /// blank ones are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .filter(|n| !n.trim().is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, repository: &str) -> bool {
        self.names.contains(repository)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_name_match_only() {
        let set = ExclusionSet::from_names(["dotfiles", "blog"]);

        assert!(set.contains("dotfiles"));
        assert!(!set.contains("Dotfiles"));
        assert!(!set.contains("dotfiles-old"));
        assert!(!set.contains("dot*"));
    }

    #[test]
    fn test_blank_entries_ignored() {
        let set = ExclusionSet::from_names(vec![String::new(), " ".to_string(), "a".to_string()]);
        assert_eq!(set.len(), 1);
        assert!(!set.contains(""));
    }

    #[test]
    fn test_surrounding_whitespace_is_significant() {
        let set = ExclusionSet::from_names([" alpha "]);
        assert!(set.contains(" alpha "));
        assert!(!set.contains("alpha"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = ExclusionSet::from_names(["a", "a", "b"]);
        assert_eq!(set.len(), 2);
        assert!(ExclusionSet::new().is_empty());
    }
}
