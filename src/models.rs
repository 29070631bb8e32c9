//! Data models and structures for Mallrow.
//!
//! This module contains the immutable inputs of a layout run: the recipe
//! graph, flattened ingredient keys, exclusive recipe groups and the
//! layout configuration.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{MallError, Result};
use crate::row::{Row, RowShape};

/// Mapping from recipe name to its ordered list of (non-fluid) ingredient names.
///
/// # Example
///
/// ```
/// use mallrow::models::RecipeGraph;
///
/// let mut graph = RecipeGraph::new();
/// graph.insert("iron-chest", vec!["iron-plate".to_string()]);
///
/// assert!(graph.contains("iron-chest"));
/// assert_eq!(graph.ingredients("iron-chest"), &["iron-plate".to_string()]);
/// assert!(graph.ingredients("iron-plate").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeGraph {
    recipes: BTreeMap<String, Vec<String>>,
}

impl RecipeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a recipe.
    pub fn insert(&mut self, name: impl Into<String>, ingredients: Vec<String>) {
        self.recipes.insert(name.into(), ingredients);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    /// Returns the direct ingredients of a recipe, or an empty slice for
    /// names that are not recipes (raw resources).
    pub fn ingredients(&self, name: &str) -> &[String] {
        self.recipes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates recipe names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for RecipeGraph {
    fn from_iter<T: IntoIterator<Item = (S, Vec<String>)>>(iter: T) -> Self {
        let mut graph = RecipeGraph::new();
        for (name, ingredients) in iter {
            graph.insert(name, ingredients);
        }
        graph
    }
}

/// The flattened, deduplicated set of root ingredients a recipe requires.
///
/// Iteration order is lexicographic so that anything derived from a key is
/// reproducible between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IngredientKey(BTreeSet<String>);

impl IngredientKey {
    pub fn singleton(name: &str) -> Self {
        IngredientKey(BTreeSet::from([name.to_string()]))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Ingredients of this key not present in `existing`, in key order.
    pub fn missing_from<'a, I>(&self, existing: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let existing: BTreeSet<&str> = existing.into_iter().collect();
        self.0
            .iter()
            .filter(|name| !existing.contains(name.as_str()))
            .cloned()
            .collect()
    }

    pub(crate) fn extend_from(&mut self, other: &IngredientKey) {
        self.0.extend(other.0.iter().cloned());
    }

    pub(crate) fn remove_all(&mut self, names: &BTreeSet<String>) {
        self.0.retain(|name| !names.contains(name));
    }
}

impl<S: Into<String>> FromIterator<S> for IngredientKey {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        IngredientKey(iter.into_iter().map(Into::into).collect())
    }
}

/// Groups of recipes that may never share a side with another member of
/// the same group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusiveGroups(Vec<BTreeSet<String>>);

impl ExclusiveGroups {
    pub fn new(groups: Vec<BTreeSet<String>>) -> Self {
        ExclusiveGroups(groups)
    }

    pub fn groups(&self) -> &[BTreeSet<String>] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if placing `recipe` next to `assigned` would put two
    /// different members of one group on the same side.
    pub fn conflicts(&self, recipe: &str, assigned: &[String]) -> bool {
        self.0.iter().filter(|group| group.contains(recipe)).any(|group| {
            assigned
                .iter()
                .any(|other| other != recipe && group.contains(other))
        })
    }
}

/// Configuration for a layout run.
///
/// `Default` gives the stock mall: six lanes per side with the middle four
/// shared, ten recipes per side, and two seeded rows carrying the plates,
/// gears, circuits and stone every mall needs.
///
/// # Example
///
/// ```
/// use mallrow::models::LayoutConfig;
///
/// let config = LayoutConfig::default();
/// assert_eq!(config.shape().total_lanes(), 8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Recipes treated as opaque leaves during flattening
    pub intermediate_names: BTreeSet<String>,
    /// Ingredients fed from the bus and never given a lane
    pub bus_exclusions: BTreeSet<String>,
    /// Mutually exclusive recipe groups
    pub exclusive_groups: ExclusiveGroups,
    /// Ingredient lanes visible to one side
    pub lane_capacity_per_side: usize,
    /// Lanes visible to both sides
    pub shared_lanes: usize,
    /// Maximum recipes assigned to one side
    pub recipe_capacity_per_side: usize,
    /// Initial lane contents of the pre-built rows, `null` for an empty lane
    pub seeded_rows: Vec<Vec<Option<String>>>,
}

const STOCK_INTERMEDIATES: &[&str] = &[
    "iron-plate",
    "copper-plate",
    "steel-plate",
    "iron-gear-wheel",
    "stone-brick",
    "electronic-circuit",
    "advanced-circuit",
    "processing-unit",
    "battery",
];

fn lanes(names: &[Option<&str>]) -> Vec<Option<String>> {
    names.iter().map(|n| n.map(str::to_string)).collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            intermediate_names: STOCK_INTERMEDIATES.iter().map(|s| s.to_string()).collect(),
            bus_exclusions: ["stone", "stone-brick"].iter().map(|s| s.to_string()).collect(),
            exclusive_groups: ExclusiveGroups::default(),
            lane_capacity_per_side: 6,
            shared_lanes: 4,
            recipe_capacity_per_side: 10,
            seeded_rows: vec![
                lanes(&[
                    Some("iron-plate"),
                    None,
                    Some("iron-gear-wheel"),
                    Some("electronic-circuit"),
                ]),
                lanes(&[Some("stone"), Some("stone-brick")]),
            ],
        }
    }
}

impl LayoutConfig {
    /// The row dimensions shared by every row of this run.
    pub fn shape(&self) -> RowShape {
        RowShape::new(
            self.lane_capacity_per_side,
            self.shared_lanes,
            self.recipe_capacity_per_side,
        )
    }

    /// Checks capacities and seeded rows.
    pub fn validate(&self) -> Result<()> {
        if self.lane_capacity_per_side == 0 {
            return Err(MallError::InvalidConfig(
                "lane_capacity_per_side must be at least 1".to_string(),
            ));
        }
        if self.recipe_capacity_per_side == 0 {
            return Err(MallError::InvalidConfig(
                "recipe_capacity_per_side must be at least 1".to_string(),
            ));
        }
        if self.shared_lanes > self.lane_capacity_per_side {
            return Err(MallError::InvalidConfig(format!(
                "shared_lanes ({}) exceeds lane_capacity_per_side ({})",
                self.shared_lanes, self.lane_capacity_per_side
            )));
        }
        let total = self
            .lane_capacity_per_side
            .checked_mul(2)
            .map(|lanes| lanes - self.shared_lanes)
            .ok_or_else(|| {
                MallError::InvalidConfig(format!(
                    "lane_capacity_per_side ({}) is too large",
                    self.lane_capacity_per_side
                ))
            })?;
        for (i, seed) in self.seeded_rows.iter().enumerate() {
            if seed.len() > total {
                return Err(MallError::InvalidConfig(format!(
                    "seeded row {} has {} lanes, rows only have {}",
                    i,
                    seed.len(),
                    total
                )));
            }
        }
        Ok(())
    }

    /// Builds the seeded rows for a fresh run.
    pub fn initial_rows(&self) -> Result<Vec<Row>> {
        let shape = self.shape();
        self.seeded_rows
            .iter()
            .map(|seed| Row::with_lanes(shape, seed.clone()))
            .collect()
    }
}

// ============================================================================
// CSV Row Structures
// ============================================================================

/// CSV row structure for the recipe table.
#[derive(Debug, Deserialize)]
pub struct RecipeRow {
    /// Recipe name
    pub name: String,
    /// Semicolon-separated ingredient names (may be empty)
    #[serde(default)]
    pub ingredients: String,
}
