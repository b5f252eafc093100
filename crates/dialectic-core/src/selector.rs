use crate::error::{DialecticError, Result};
use crate::template::Template;
use crate::types::{Category, FocusFlags};
use std::collections::{BTreeMap, HashSet};

/// Maps focus flags to the ordered list of templates to apply.
///
/// Selection depends only on the flags and the category mapping given at
/// construction time.
#[derive(Debug, Clone)]
pub struct Selector {
    templates: BTreeMap<Category, Template>,
}

impl Selector {
    /// Build a selector. Every category must have a template.
    pub fn new(templates: BTreeMap<Category, Template>) -> Result<Self> {
        if let Some(missing) = Category::all().iter().find(|c| !templates.contains_key(*c)) {
            return Err(DialecticError::MissingTemplate(*missing));
        }
        Ok(Self { templates })
    }

    pub fn template(&self, category: Category) -> Option<&Template> {
        self.templates.get(&category)
    }

    /// Templates for the active categories, ordered by ascending priority.
    ///
    /// Ties keep category declaration order. When several categories share a
    /// template name, only its first occurrence after sorting is kept. No
    /// active flag yields an empty list.
    pub fn select(&self, flags: &FocusFlags) -> Vec<Template> {
        let mut selected: Vec<&Template> = Category::all()
            .iter()
            .filter(|c| flags.is_set(**c))
            .filter_map(|c| self.templates.get(c))
            .collect();

        // `sort_by_key` is stable
        selected.sort_by_key(|t| t.priority);

        let mut seen = HashSet::new();
        selected
            .into_iter()
            .filter(|t| seen.insert(t.name.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            templates: Category::all()
                .iter()
                .map(|c| (*c, c.default_template()))
                .collect(),
        }
    }
}
