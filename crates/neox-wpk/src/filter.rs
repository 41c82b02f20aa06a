//! Entry selection by name, content class and category.

use neox_codec::Category;

use crate::entry::ResolvedEntry;

/// Criteria for selecting resolved entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    /// Case-insensitive substring of the file name. Empty matches all.
    pub name: String,
    /// Required category, if any.
    pub category: Option<Category>,
    /// Keep entries judged to be text.
    pub include_text: bool,
    /// Keep entries judged to be binary.
    pub include_binary: bool,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: None,
            include_text: true,
            include_binary: true,
        }
    }
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn text_only(mut self) -> Self {
        self.include_text = true;
        self.include_binary = false;
        self
    }

    pub fn binary_only(mut self) -> Self {
        self.include_text = false;
        self.include_binary = true;
        self
    }

    /// Whether `entry` passes every criterion.
    pub fn matches(&self, entry: &ResolvedEntry) -> bool {
        let class_ok = if entry.is_text() {
            self.include_text
        } else {
            self.include_binary
        };
        if !class_ok {
            return false;
        }

        if !self.name.is_empty()
            && !entry
                .filename()
                .to_lowercase()
                .contains(&self.name.to_lowercase())
        {
            return false;
        }

        self.category.map_or(true, |category| category == entry.category)
    }
}
