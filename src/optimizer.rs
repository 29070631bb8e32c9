//! Lane assignment optimization for mall rows.
//!
//! This module contains the greedy layout loop. Each iteration scans every
//! side of every row, groups the pending recipes by the exact set of new
//! ingredient lanes they would need there, and commits the globally best
//! group. When no side can take anything, a new empty row is appended.
//!
//! Candidates are ranked by:
//!   1. fewest new ingredient lanes
//!   2. most ingredients reused from the side
//!   3. most recipes enabled at once
//!
//! Remaining ties go to the earliest row, TOP before BOT, then the
//! lexicographically smallest ingredient set.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::error::{MallError, Result};
use crate::models::{IngredientKey, LayoutConfig, RecipeGraph};
use crate::resolver::IngredientKeyResolver;
use crate::row::{Row, Side};

/// A set of ingredients to add to one side, and the recipes it enables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Index of the row in the layout
    pub row: usize,
    pub side: Side,
    /// Direct ingredients of the recipes already present on the side.
    /// Negative when a recipe's key is wider than its direct ingredient list.
    pub reused: isize,
    /// Ingredients that need a new lane, sorted
    pub new_ingredients: Vec<String>,
    /// Recipes satisfied once the new ingredients are placed, sorted
    pub recipes: Vec<String>,
}

impl Candidate {
    fn rank(&self) -> (usize, Reverse<isize>, Reverse<usize>) {
        (
            self.new_ingredients.len(),
            Reverse(self.reused),
            Reverse(self.recipes.len()),
        )
    }
}

/// Greedy driver assigning product recipes to row sides.
#[derive(Debug)]
pub struct LaneAssignmentOptimizer<'a> {
    config: &'a LayoutConfig,
    resolver: IngredientKeyResolver<'a>,
    keys: BTreeMap<String, IngredientKey>,
}

impl<'a> LaneAssignmentOptimizer<'a> {
    pub fn new(graph: &'a RecipeGraph, config: &'a LayoutConfig) -> Self {
        LaneAssignmentOptimizer {
            config,
            resolver: IngredientKeyResolver::from_config(graph, config),
            keys: BTreeMap::new(),
        }
    }

    /// Resolves any pending recipe not yet seen in this run.
    fn ensure_keys(&mut self, pending: &BTreeSet<String>) -> Result<()> {
        for recipe in pending {
            if !self.keys.contains_key(recipe) {
                let key = self.resolver.resolve(recipe)?;
                self.keys.insert(recipe.clone(), key);
            }
        }
        Ok(())
    }

    /// Finds the best group of pending recipes for one side of a row.
    fn best_for_side(
        &self,
        row: &Row,
        row_index: usize,
        side: Side,
        pending: &BTreeSet<String>,
    ) -> Option<Candidate> {
        if row.full(side) {
            return None;
        }

        let available = row.count_available_lanes(side);
        let assigned = row.get_recipes(side);
        let graph = self.resolver.graph();
        let mut groups: BTreeMap<(isize, Vec<String>), Vec<String>> = BTreeMap::new();

        for recipe in pending {
            let Some(key) = self.keys.get(recipe) else {
                continue;
            };
            let new_ingredients = key.missing_from(row.placed_ingredients(side));
            if new_ingredients.len() > available {
                continue;
            }
            if self.config.exclusive_groups.conflicts(recipe, assigned) {
                continue;
            }
            // Measured against the direct ingredient list, not the flattened key
            let reused = graph.ingredients(recipe).len() as isize - new_ingredients.len() as isize;
            let members = groups.entry((reused, new_ingredients)).or_default();
            // One member per exclusive group; `pending` is sorted, so the first wins
            if !self.config.exclusive_groups.conflicts(recipe, members) {
                members.push(recipe.clone());
            }
        }

        groups
            .into_iter()
            .map(|((reused, new_ingredients), recipes)| Candidate {
                row: row_index,
                side,
                reused,
                new_ingredients,
                recipes,
            })
            .min_by_key(Candidate::rank)
    }

    /// Returns the globally best candidate across all rows, if any side can
    /// accept a pending recipe.
    pub fn best_candidate(
        &mut self,
        rows: &[Row],
        pending: &BTreeSet<String>,
    ) -> Result<Option<Candidate>> {
        self.ensure_keys(pending)?;
        let this: &Self = self;
        Ok(rows
            .iter()
            .enumerate()
            .flat_map(|(index, row)| {
                Side::ALL
                    .into_iter()
                    .filter_map(move |side| this.best_for_side(row, index, side, pending))
            })
            .min_by_key(Candidate::rank))
    }

    /// Places the candidate's ingredients, then its recipes until the side
    /// fills up. Returns the number of recipes placed.
    fn commit(
        &self,
        candidate: &Candidate,
        rows: &mut [Row],
        pending: &mut BTreeSet<String>,
    ) -> Result<usize> {
        let row = &mut rows[candidate.row];
        for ingredient in &candidate.new_ingredients {
            let lane = row.add_ingredient(candidate.side, ingredient)?;
            debug!(row = candidate.row, side = %candidate.side, lane, ingredient = %ingredient, "placed ingredient");
        }

        let mut placed = 0;
        for recipe in &candidate.recipes {
            if row.full(candidate.side) {
                // The rest stay pending for the next scan
                break;
            }
            if self
                .config
                .exclusive_groups
                .conflicts(recipe, row.get_recipes(candidate.side))
            {
                continue;
            }
            row.add_recipe(candidate.side, recipe)?;
            pending.remove(recipe);
            placed += 1;
            debug!(row = candidate.row, side = %candidate.side, recipe = %recipe, "placed recipe");
        }
        Ok(placed)
    }

    /// Assigns every recipe in `pending` to a side, starting from `rows` and
    /// appending empty rows as needed.
    ///
    /// # Errors
    ///
    /// - [`MallError::InvalidConfig`] if the configuration is unusable
    /// - [`MallError::CyclicRecipe`] if a recipe's ingredients loop
    /// - [`MallError::UnplaceableRecipe`] if a recipe needs more lanes than a side has
    /// - [`MallError::Stalled`] if the loop stops making progress
    pub fn optimize<I, S>(&mut self, pending: I, mut rows: Vec<Row>) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.validate()?;

        let mut pending_set: BTreeSet<String> = BTreeSet::new();
        for recipe in pending {
            let recipe: String = recipe.into();
            if !pending_set.insert(recipe.clone()) {
                warn!(recipe = %recipe, "duplicate product ignored");
            }
        }
        self.ensure_keys(&pending_set)?;

        let capacity = self.config.lane_capacity_per_side;
        for recipe in &pending_set {
            if let Some(key) = self.keys.get(recipe) {
                if key.len() > capacity {
                    return Err(MallError::UnplaceableRecipe {
                        recipe: recipe.clone(),
                        required: key.len(),
                        capacity,
                    });
                }
            }
        }

        info!(
            products = pending_set.len(),
            seeded_rows = rows.len(),
            "starting lane assignment"
        );

        let shape = self.config.shape();
        let mut fresh_row = false;
        while !pending_set.is_empty() {
            match self.best_candidate(&rows, &pending_set)? {
                Some(candidate) => {
                    let placed = self.commit(&candidate, &mut rows, &mut pending_set)?;
                    if placed == 0 {
                        return Err(MallError::Stalled {
                            pending: pending_set.into_iter().collect(),
                        });
                    }
                    fresh_row = false;
                }
                None if fresh_row => {
                    return Err(MallError::Stalled {
                        pending: pending_set.into_iter().collect(),
                    });
                }
                None => {
                    rows.push(Row::new(shape));
                    fresh_row = true;
                    info!(rows = rows.len(), pending = pending_set.len(), "appended row");
                }
            }
        }

        info!(rows = rows.len(), "lane assignment complete");
        Ok(rows)
    }
}

/// Lays out `products` starting from the config's seeded rows.
///
/// # Example
///
/// ```
/// use mallrow::models::{LayoutConfig, RecipeGraph};
/// use mallrow::optimizer::optimize_layout;
///
/// let graph: RecipeGraph = [
///     ("iron-chest", vec!["iron-plate".to_string()]),
///     ("pipe", vec!["iron-plate".to_string()]),
/// ]
/// .into_iter()
/// .collect();
/// let config = LayoutConfig::default();
///
/// let rows = optimize_layout(&graph, &["iron-chest", "pipe"], &config).unwrap();
/// assert_eq!(rows.len(), 2);
/// ```
pub fn optimize_layout<S: AsRef<str>>(
    graph: &RecipeGraph,
    products: &[S],
    config: &LayoutConfig,
) -> Result<Vec<Row>> {
    config.validate()?;
    let rows = config.initial_rows()?;
    LaneAssignmentOptimizer::new(graph, config)
        .optimize(products.iter().map(|p| p.as_ref().to_string()), rows)
}

/// Lists every recipe whose flattened key contains `ingredient`, sorted.
pub fn recipes_using(
    graph: &RecipeGraph,
    config: &LayoutConfig,
    ingredient: &str,
) -> Result<Vec<String>> {
    let mut resolver = IngredientKeyResolver::from_config(graph, config);
    let mut found = Vec::new();
    for name in graph.names() {
        if resolver.resolve(name)?.contains(ingredient) {
            found.push(name.to_string());
        }
    }
    Ok(found)
}
