//! Closed set of object categories used for category filtered queries and for
//! routing of objects to indexes.
//!
//! Categories form a small directed acyclic graph registered once at startup.
//! The first parent of a category is its primary (class-like) parent, any
//! other parents are interface-like memberships. Membership tests are O(1)
//! thanks to a precomputed lineage bit mask.

use std::fmt;

use ahash::AHashMap;
use thiserror::Error;

/// Maximum number of categories in a single [`Taxonomy`].
pub const MAX_CATEGORIES: usize = 64;

/// Category of spatial objects.
///
/// Categories are cheap copyable handles. Mixing categories of different
/// taxonomies is not supported.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category {
    index: u8,
    /// Bit `i` is set if the category is category `i` or descends from it.
    lineage: u64,
}

impl Category {
    /// Position of the category within its taxonomy.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Returns true if `self` is `other` or descends from it, either via
    /// primary or interface-like parents.
    pub fn is_a(self, other: Category) -> bool {
        self.lineage & (1 << other.index) != 0
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Category({})", self.index)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CategoryError {
    #[error("at most {MAX_CATEGORIES} categories can be defined")]
    TooMany,
    #[error("category `{0}` is already defined")]
    DuplicateName(String),
    #[error("parent {parent:?} of category `{name}` is not defined in this taxonomy")]
    UnknownParent { name: String, parent: Category },
}

#[derive(Default)]
pub struct TaxonomyBuilder {
    entries: Vec<Entry>,
    names: AHashMap<String, Category>,
}

impl TaxonomyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new category.
    ///
    /// # Arguments
    ///
    /// * `name` - unique human readable name of the category.
    ///
    /// * `parents` - already defined categories the new category belongs to.
    ///   The first one, if any, is the primary parent.
    pub fn define(&mut self, name: &str, parents: &[Category]) -> Result<Category, CategoryError> {
        if self.entries.len() >= MAX_CATEGORIES {
            return Err(CategoryError::TooMany);
        }
        if self.names.contains_key(name) {
            return Err(CategoryError::DuplicateName(name.to_owned()));
        }

        let index = self.entries.len() as u8;
        let mut lineage = 1 << index;
        for &parent in parents {
            if !self.is_own(parent) {
                return Err(CategoryError::UnknownParent {
                    name: name.to_owned(),
                    parent,
                });
            }
            lineage |= parent.lineage;
        }

        let category = Category { index, lineage };
        self.entries.push(Entry {
            name: name.to_owned(),
            category,
            primary_parent: parents.first().copied(),
        });
        self.names.insert(name.to_owned(), category);
        Ok(category)
    }

    pub fn build(self) -> Taxonomy {
        Taxonomy {
            entries: self.entries,
            names: self.names,
        }
    }

    fn is_own(&self, category: Category) -> bool {
        self.entries
            .get(category.index())
            .map_or(false, |entry| entry.category == category)
    }
}

/// Frozen set of categories.
pub struct Taxonomy {
    entries: Vec<Entry>,
    names: AHashMap<String, Category>,
}

impl Taxonomy {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the category was defined by this taxonomy.
    pub fn contains(&self, category: Category) -> bool {
        self.entry(category).is_some()
    }

    /// Iterates over all categories in definition order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().map(|entry| entry.category)
    }

    pub fn get(&self, name: &str) -> Option<Category> {
        self.names.get(name).copied()
    }

    pub fn name(&self, category: Category) -> Option<&str> {
        self.entry(category).map(|entry| entry.name.as_str())
    }

    pub fn primary_parent(&self, category: Category) -> Option<Category> {
        self.entry(category).and_then(|entry| entry.primary_parent)
    }

    /// Iterates over the category itself followed by its primary ancestors,
    /// most specific first.
    pub fn primary_lineage(&self, category: Category) -> impl Iterator<Item = Category> + '_ {
        let start = self.contains(category).then_some(category);
        std::iter::successors(start, |&current| self.primary_parent(current))
    }

    fn entry(&self, category: Category) -> Option<&Entry> {
        self.entries
            .get(category.index())
            .filter(|entry| entry.category == category)
    }
}

impl fmt::Debug for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| &entry.name))
            .finish()
    }
}

struct Entry {
    name: String,
    category: Category,
    primary_parent: Option<Category>,
}
