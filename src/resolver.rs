//! Flattening recipes into their root ingredient keys.
//!
//! A recipe's key is the union of its ingredients' keys, stopping at
//! configured intermediates and raw resources, with bus-fed ingredients
//! removed. The walk uses an explicit stack so deep crafting trees never
//! touch the call stack, and an on-path set turns a looping graph into a
//! [`MallError::CyclicRecipe`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::trace;

use crate::error::{MallError, Result};
use crate::models::{IngredientKey, LayoutConfig, RecipeGraph};

/// Memoizing resolver for [`IngredientKey`]s. One resolver serves one run.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use mallrow::models::RecipeGraph;
/// use mallrow::resolver::IngredientKeyResolver;
///
/// let graph: RecipeGraph = [
///     ("iron-gear-wheel", vec!["iron-plate".to_string()]),
///     ("transport-belt", vec!["iron-gear-wheel".to_string(), "iron-plate".to_string()]),
/// ]
/// .into_iter()
/// .collect();
/// let none = BTreeSet::new();
///
/// let mut resolver = IngredientKeyResolver::new(&graph, &none, &none);
/// let key = resolver.resolve("transport-belt").unwrap();
/// assert_eq!(key.iter().collect::<Vec<_>>(), vec!["iron-plate"]);
/// ```
#[derive(Debug)]
pub struct IngredientKeyResolver<'a> {
    graph: &'a RecipeGraph,
    intermediates: &'a BTreeSet<String>,
    exclusions: &'a BTreeSet<String>,
    memo: HashMap<String, IngredientKey>,
}

impl<'a> IngredientKeyResolver<'a> {
    pub fn new(
        graph: &'a RecipeGraph,
        intermediates: &'a BTreeSet<String>,
        exclusions: &'a BTreeSet<String>,
    ) -> Self {
        IngredientKeyResolver {
            graph,
            intermediates,
            exclusions,
            memo: HashMap::new(),
        }
    }

    /// Resolver using the intermediates and bus exclusions of `config`.
    pub fn from_config(graph: &'a RecipeGraph, config: &'a LayoutConfig) -> Self {
        Self::new(graph, &config.intermediate_names, &config.bus_exclusions)
    }

    pub fn graph(&self) -> &'a RecipeGraph {
        self.graph
    }

    /// Number of names resolved so far.
    pub fn cached(&self) -> usize {
        self.memo.len()
    }

    fn is_leaf(&self, name: &str) -> bool {
        !self.graph.contains(name) || self.intermediates.contains(name)
    }

    fn leaf_key(&self, name: &str) -> IngredientKey {
        let mut key = IngredientKey::singleton(name);
        key.remove_all(self.exclusions);
        key
    }

    /// Returns the flattened root-ingredient key of `recipe`.
    pub fn resolve(&mut self, recipe: &str) -> Result<IngredientKey> {
        if let Some(key) = self.memo.get(recipe) {
            return Ok(key.clone());
        }

        let graph = self.graph;
        // (name, index of the next ingredient to visit)
        let mut stack: Vec<(String, usize)> = vec![(recipe.to_string(), 0)];
        let mut on_path: HashSet<String> = HashSet::from([recipe.to_string()]);

        while let Some((name, next)) = stack.last_mut() {
            let leaf = self.is_leaf(name);
            let ingredients = graph.ingredients(name);

            if !leaf && *next < ingredients.len() {
                let child = &ingredients[*next];
                *next += 1;
                if self.memo.contains_key(child) {
                    continue;
                }
                if on_path.contains(child) {
                    let start = stack.iter().position(|(n, _)| n == child).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|(n, _)| n.clone()).collect();
                    cycle.push(child.clone());
                    return Err(MallError::CyclicRecipe { cycle });
                }
                on_path.insert(child.clone());
                stack.push((child.clone(), 0));
                continue;
            }

            let key = if leaf {
                self.leaf_key(name)
            } else {
                let mut key = IngredientKey::default();
                for ingredient in ingredients {
                    if let Some(sub) = self.memo.get(ingredient) {
                        key.extend_from(sub);
                    }
                }
                key.remove_all(self.exclusions);
                key
            };
            let name = name.clone();
            stack.pop();
            on_path.remove(&name);
            trace!(recipe = %name, lanes = key.len(), "resolved ingredient key");
            self.memo.insert(name, key);
        }

        self.memo
            .get(recipe)
            .cloned()
            .ok_or_else(|| MallError::CyclicRecipe {
                cycle: vec![recipe.to_string()],
            })
    }

    /// Resolves every name in `recipes`, keyed by name.
    pub fn resolve_all<'n, I>(&mut self, recipes: I) -> Result<BTreeMap<String, IngredientKey>>
    where
        I: IntoIterator<Item = &'n str>,
    {
        recipes
            .into_iter()
            .map(|name| Ok((name.to_string(), self.resolve(name)?)))
            .collect()
    }
}
