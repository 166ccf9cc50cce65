//! Category routing of objects to separate indexes.

use std::{fmt, ops::ControlFlow, rc::Rc};

use ahash::AHashSet;
use glam::Vec2;
use thiserror::Error;
use tracing::debug;

use crate::{
    aggregate::AggregateIndex,
    category::{Category, Taxonomy},
    grid::{ConfigError, GridIndex},
    index::{IndexError, SpatialIndex},
    query::Query,
    spatial::{Spatial, SpatialRef},
};

const ROOT: usize = 0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManagerError {
    #[error("{0:?} is not defined in the taxonomy")]
    UnknownCategory(Category),
    #[error("{0:?} is configured more than once")]
    DuplicateCategory(Category),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Index routing objects to per-category indexes.
///
/// The manager keeps a tree with one node per configured category under a
/// root node. The tree parent of a node is the node of the closest configured
/// primary ancestor of its category, or the root. Every node owns a leaf
/// index created by the factory:
///
/// * Objects are added to (and removed from) the leaf of the node of the
///   closest configured primary ancestor of their category, or the root leaf.
///   Each object is thus stored in exactly one leaf.
///
/// * Category filtered queries are forwarded to the smallest subtree covering
///   every category belonging to the queried category. Queries without a
///   category, or with a category from another taxonomy, search the whole
///   tree.
///
/// All routes are precomputed during construction.
pub struct IndexManager {
    nodes: Vec<Node>,
    /// Categories of the taxonomy in definition order.
    categories: Vec<Category>,
    /// Node of each taxonomy category where its objects are stored.
    add_routes: Vec<usize>,
    /// Node of each taxonomy category whose subtree is searched by queries.
    query_routes: Vec<usize>,
}

struct Node {
    category: Option<Category>,
    parent: Option<usize>,
    depth: usize,
    /// Objects stored directly at this node.
    leaf: Rc<dyn SpatialIndex>,
    /// The leaf and all descendant leaves.
    resolved: Rc<dyn SpatialIndex>,
}

impl IndexManager {
    /// # Arguments
    ///
    /// * `taxonomy` - all categories objects may have.
    ///
    /// * `configured` - categories which get their own index.
    ///
    /// * `factory` - creates an empty leaf index. It is called once per
    ///   configured category plus once for the root.
    pub fn new<F>(
        taxonomy: &Taxonomy,
        configured: &[Category],
        mut factory: F,
    ) -> Result<Self, ManagerError>
    where
        F: FnMut() -> Rc<dyn SpatialIndex>,
    {
        Self::try_new(taxonomy, configured, || Ok::<_, ManagerError>(factory()))
    }

    /// Same as [`Self::new`] but with a fallible leaf factory.
    pub fn try_new<F, E>(
        taxonomy: &Taxonomy,
        configured: &[Category],
        mut factory: F,
    ) -> Result<Self, ManagerError>
    where
        F: FnMut() -> Result<Rc<dyn SpatialIndex>, E>,
        ManagerError: From<E>,
    {
        let mut unique = AHashSet::new();
        for &category in configured {
            if !taxonomy.contains(category) {
                return Err(ManagerError::UnknownCategory(category));
            }
            if !unique.insert(category) {
                return Err(ManagerError::DuplicateCategory(category));
            }
        }

        let categories: Vec<Category> = taxonomy.categories().collect();
        let mut node_of = vec![None; categories.len()];
        let mut parents: Vec<Option<usize>> = vec![None];
        let mut node_categories = vec![None];

        // Parents are always defined before their descendants, thus parent
        // nodes exist before their children in definition order.
        for &category in categories.iter().filter(|c| unique.contains(*c)) {
            let parent = taxonomy
                .primary_lineage(category)
                .skip(1)
                .find_map(|ancestor| node_of[ancestor.index()])
                .unwrap_or(ROOT);
            node_of[category.index()] = Some(parents.len());
            parents.push(Some(parent));
            node_categories.push(Some(category));
        }

        let leaves = (0..parents.len())
            .map(|_| factory())
            .collect::<Result<Vec<Rc<dyn SpatialIndex>>, E>>()?;

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); parents.len()];
        for (node, parent) in parents.iter().enumerate() {
            if let Some(parent) = parent {
                children[*parent].push(node);
            }
        }

        // Children are always after their parents, thus a reverse pass
        // resolves the tree bottom-up.
        let mut resolved: Vec<Option<Rc<dyn SpatialIndex>>> = vec![None; parents.len()];
        for node in (0..parents.len()).rev() {
            let index = if children[node].is_empty() {
                Rc::clone(&leaves[node])
            } else {
                let members = std::iter::once(Rc::clone(&leaves[node])).chain(
                    children[node]
                        .iter()
                        .filter_map(|&child| resolved[child].clone()),
                );
                Rc::new(AggregateIndex::new(members)) as Rc<dyn SpatialIndex>
            };
            resolved[node] = Some(index);
        }

        let mut depths = vec![0; parents.len()];
        for node in 1..parents.len() {
            if let Some(parent) = parents[node] {
                depths[node] = depths[parent] + 1;
            }
        }

        let nodes: Vec<Node> = leaves
            .into_iter()
            .zip(resolved)
            .enumerate()
            .map(|(node, (leaf, resolved))| Node {
                category: node_categories[node],
                parent: parents[node],
                depth: depths[node],
                resolved: resolved.unwrap_or_else(|| Rc::clone(&leaf)),
                leaf,
            })
            .collect();

        let add_routes: Vec<usize> = categories
            .iter()
            .map(|&category| {
                taxonomy
                    .primary_lineage(category)
                    .find_map(|ancestor| node_of[ancestor.index()])
                    .unwrap_or(ROOT)
            })
            .collect();

        let mut manager = Self {
            nodes,
            categories,
            add_routes,
            query_routes: Vec::new(),
        };
        manager.query_routes = manager
            .categories
            .iter()
            .map(|&queried| {
                manager
                    .categories
                    .iter()
                    .filter(|category| category.is_a(queried))
                    .map(|category| manager.add_routes[category.index()])
                    .fold(manager.add_routes[queried.index()], |a, b| {
                        manager.common_ancestor(a, b)
                    })
            })
            .collect();

        debug!(
            "Created spatial index manager with {} nodes over {} categories.",
            manager.nodes.len(),
            manager.categories.len()
        );

        Ok(manager)
    }

    /// Creates a manager whose leaves are [`GridIndex`] instances with the
    /// given segment size.
    pub fn with_grids(
        taxonomy: &Taxonomy,
        configured: &[Category],
        segment_size: u32,
    ) -> Result<Self, ManagerError> {
        Self::try_new(taxonomy, configured, || {
            GridIndex::new(segment_size).map(|grid| Rc::new(grid) as Rc<dyn SpatialIndex>)
        })
    }

    /// Index searched by queries filtered by the category (or by any query
    /// if `None`).
    pub fn index_for(&self, category: Option<Category>) -> &Rc<dyn SpatialIndex> {
        let node = match category.and_then(|category| self.position(category)) {
            Some(position) => self.query_routes[position],
            None => ROOT,
        };
        &self.nodes[node].resolved
    }

    /// Leaf index storing objects of the category.
    pub fn leaf_for(&self, category: Category) -> &Rc<dyn SpatialIndex> {
        let node = match self.position(category) {
            Some(position) => self.add_routes[position],
            None => ROOT,
        };
        &self.nodes[node].leaf
    }

    /// Number of nodes, including the root.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn position(&self, category: Category) -> Option<usize> {
        let position = category.index();
        (self.categories.get(position) == Some(&category)).then_some(position)
    }

    fn common_ancestor(&self, mut a: usize, mut b: usize) -> usize {
        while self.nodes[a].depth > self.nodes[b].depth {
            a = self.nodes[a].parent.unwrap_or(ROOT);
        }
        while self.nodes[b].depth > self.nodes[a].depth {
            b = self.nodes[b].parent.unwrap_or(ROOT);
        }
        while a != b {
            a = self.nodes[a].parent.unwrap_or(ROOT);
            b = self.nodes[b].parent.unwrap_or(ROOT);
        }
        a
    }
}

impl fmt::Debug for IndexManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|node| (node.category, node.parent)))
            .finish()
    }
}

impl SpatialIndex for IndexManager {
    fn set_area_size(&self, size: Vec2) {
        for node in &self.nodes {
            node.leaf.set_area_size(size);
        }
    }

    /// Adds the object to the single leaf index of its category.
    fn add(&self, spatial: SpatialRef) -> Result<(), IndexError> {
        let leaf = self.leaf_for(spatial.category());
        leaf.add(spatial)
    }

    fn remove(&self, spatial: &dyn Spatial) -> Result<bool, IndexError> {
        self.leaf_for(spatial.category()).remove(spatial)
    }

    fn clear(&self) {
        for node in &self.nodes {
            node.leaf.clear();
        }
    }

    fn len(&self) -> usize {
        self.nodes.iter().map(|node| node.leaf.len()).sum()
    }

    fn is_tracked(&self, spatial: &dyn Spatial) -> bool {
        self.leaf_for(spatial.category()).is_tracked(spatial)
    }

    fn visit(
        &self,
        query: &Query<'_>,
        visitor: &mut dyn FnMut(&SpatialRef) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        self.index_for(query.category()).visit(query, visitor)
    }

    fn contains(&self, query: &Query<'_>) -> bool {
        self.index_for(query.category()).contains(query)
    }

    fn get(&self, query: &Query<'_>) -> Option<SpatialRef> {
        self.index_for(query.category()).get(query)
    }

    fn get_many(&self, query: &Query<'_>) -> Vec<SpatialRef> {
        self.index_for(query.category()).get_many(query)
    }

    fn nearest(&self, point: Vec2, query: &Query<'_>) -> Option<SpatialRef> {
        self.index_for(query.category()).nearest(point, query)
    }
}
