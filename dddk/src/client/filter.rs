//! Client-side filtering of list results.

use crate::api::{DashboardSummary, MonitorSummary, SloSummary, SyntheticSummary};

/// Narrows a listing down by exact name and/or ownership marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub name: Option<String>,
    pub has_tag: Option<String>,
}

impl Filter {
    pub fn has_tag(tag: impl Into<String>) -> Self {
        Self {
            name: None,
            has_tag: Some(tag.into()),
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            has_tag: None,
        }
    }

    pub fn matches<T: Listed>(&self, item: &T) -> bool {
        if let Some(tag) = &self.has_tag {
            if !item.has_marker(tag) {
                return false;
            }
        }
        match &self.name {
            Some(name) => item.name() == name,
            None => true,
        }
    }

    pub fn apply<T: Listed>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().filter(|i| self.matches(i)).collect()
    }
}

/// A list entry that can be matched by name and ownership marker.
pub trait Listed {
    fn name(&self) -> &str;

    fn has_marker(&self, marker: &str) -> bool;
}

// Dashboards have no tags; the marker lives in the description.
impl Listed for DashboardSummary {
    fn name(&self) -> &str {
        &self.title
    }

    fn has_marker(&self, marker: &str) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| d.contains(marker))
    }
}

impl Listed for MonitorSummary {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_marker(&self, marker: &str) -> bool {
        has_tag(&self.tags, marker)
    }
}

impl Listed for SyntheticSummary {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_marker(&self, marker: &str) -> bool {
        has_tag(&self.tags, marker)
    }
}

impl Listed for SloSummary {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_marker(&self, marker: &str) -> bool {
        has_tag(&self.tags, marker)
    }
}

fn has_tag(tags: &Option<Vec<String>>, marker: &str) -> bool {
    tags.as_ref().is_some_and(|t| t.iter().any(|tag| tag == marker))
}
