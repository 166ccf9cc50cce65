use anyhow::Result;
use de_spatial::{Category, Taxonomy, TaxonomyBuilder};

/// Categories of simulated objects.
///
/// ```text
/// spatial
/// ├── movable
/// │   └── unit (also attackable)
/// └── static
///     ├── building (also attackable)
///     └── tree
/// attackable
/// ```
pub(crate) struct Kinds {
    pub(crate) taxonomy: Taxonomy,
    pub(crate) spatial: Category,
    pub(crate) attackable: Category,
    pub(crate) movable: Category,
    pub(crate) stationary: Category,
    pub(crate) unit: Category,
    pub(crate) building: Category,
    pub(crate) tree: Category,
}

impl Kinds {
    pub(crate) fn new() -> Result<Self> {
        let mut builder = TaxonomyBuilder::new();
        let spatial = builder.define("spatial", &[])?;
        let attackable = builder.define("attackable", &[])?;
        let movable = builder.define("movable", &[spatial])?;
        let stationary = builder.define("static", &[spatial])?;
        let unit = builder.define("unit", &[movable, attackable])?;
        let building = builder.define("building", &[stationary, attackable])?;
        let tree = builder.define("tree", &[stationary])?;

        Ok(Self {
            taxonomy: builder.build(),
            spatial,
            attackable,
            movable,
            stationary,
            unit,
            building,
            tree,
        })
    }

    /// Categories with a dedicated index.
    pub(crate) fn indexed(&self) -> [Category; 3] {
        [self.movable, self.building, self.tree]
    }
}
