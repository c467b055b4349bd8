//! The operator's keyword selection during keyword review.

use leadgen_core::KeywordCategory;

/// An ordered set of selected keywords.
///
/// Insertion order is kept so the strategy request lists keywords the way the
/// operator picked them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedKeywords {
    items: Vec<String>,
}

impl SelectedKeywords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default selection: the first `count` keywords of the first category.
    #[must_use]
    pub fn preselect(categories: &[KeywordCategory], count: usize) -> Self {
        let mut selected = Self::new();
        if let Some(first) = categories.first() {
            for keyword in first.keywords.iter().take(count) {
                selected.add(keyword);
            }
        }
        selected
    }

    /// Adds a keyword. Returns `false` if it was blank or already selected.
    pub fn add(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.contains(keyword) {
            return false;
        }
        self.items.push(keyword.to_owned());
        true
    }

    /// Removes a keyword. Returns `false` if it was not selected.
    pub fn remove(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        let before = self.items.len();
        self.items.retain(|k| k != keyword);
        self.items.len() != before
    }

    /// Flips membership. Returns `true` if the keyword is now selected.
    pub fn toggle(&mut self, keyword: &str) -> bool {
        if self.remove(keyword) {
            false
        } else {
            self.add(keyword)
        }
    }

    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        self.items.iter().any(|k| k == keyword)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl<S: AsRef<str>> FromIterator<S> for SelectedKeywords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selected = Self::new();
        for keyword in iter {
            selected.add(keyword.as_ref());
        }
        selected
    }
}
