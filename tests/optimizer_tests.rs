//! Tests for the lane assignment optimizer.

use std::collections::{BTreeMap, BTreeSet};

use mallrow::error::MallError;
use mallrow::models::{ExclusiveGroups, LayoutConfig, RecipeGraph};
use mallrow::optimizer::{optimize_layout, recipes_using, LaneAssignmentOptimizer};
use mallrow::resolver::IngredientKeyResolver;
use mallrow::row::{Row, Side};

fn graph(entries: &[(&str, &[&str])]) -> RecipeGraph {
    entries
        .iter()
        .map(|(name, ings)| (*name, ings.iter().map(|s| s.to_string()).collect::<Vec<String>>()))
        .collect()
}

fn bare_config(lanes: usize, shared: usize, recipes: usize) -> LayoutConfig {
    LayoutConfig {
        intermediate_names: BTreeSet::new(),
        bus_exclusions: BTreeSet::new(),
        exclusive_groups: ExclusiveGroups::default(),
        lane_capacity_per_side: lanes,
        shared_lanes: shared,
        recipe_capacity_per_side: recipes,
        seeded_rows: vec![],
    }
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Checks capacity, coverage, exclusivity and that every placed recipe
/// finds all of its ingredients on its side.
fn assert_layout_invariants(
    rows: &[Row],
    graph: &RecipeGraph,
    products: &[String],
    config: &LayoutConfig,
) {
    let mut resolver = IngredientKeyResolver::from_config(graph, config);
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();

    for row in rows {
        for side in Side::ALL {
            let lanes = row.get_ingredients(side);
            assert_eq!(lanes.len(), config.lane_capacity_per_side);
            assert!(lanes.iter().flatten().count() <= config.lane_capacity_per_side);

            let recipes = row.get_recipes(side);
            assert!(recipes.len() <= config.recipe_capacity_per_side);
            assert_eq!(row.full(side), recipes.len() == config.recipe_capacity_per_side);

            let placed: BTreeSet<&str> = row.placed_ingredients(side).collect();
            for recipe in recipes {
                *seen.entry(recipe.clone()).or_default() += 1;
                let key = resolver.resolve(recipe).unwrap();
                for ingredient in key.iter() {
                    assert!(
                        placed.contains(ingredient),
                        "{} on {} side is missing {}",
                        recipe,
                        side,
                        ingredient
                    );
                }
            }

            for group in config.exclusive_groups.groups() {
                let members = recipes.iter().filter(|r| group.contains(*r)).count();
                assert!(members <= 1, "exclusive group shares the {} side", side);
            }
        }
    }

    let expected: BTreeSet<&String> = products.iter().collect();
    assert_eq!(seen.len(), expected.len());
    for product in expected {
        assert_eq!(seen.get(product), Some(&1), "{} not placed exactly once", product);
    }
}

/// Small deterministic generator so the fixtures need no extra crates.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn generated_fixture(seed: u64) -> (RecipeGraph, Vec<String>, LayoutConfig) {
    let mut rng = Lcg(seed);
    let mut graph = RecipeGraph::new();
    let mut products = Vec::new();
    for i in 0..60 {
        let count = 1 + rng.next(3);
        let ingredients: Vec<String> = (0..count)
            .map(|_| {
                if i >= 20 && rng.next(2) == 0 {
                    format!("item-{}", rng.next(20))
                } else {
                    format!("raw-{}", rng.next(12))
                }
            })
            .collect();
        graph.insert(format!("item-{}", i), ingredients);
        products.push(format!("item-{}", i));
    }

    let mut config = bare_config(6, 4, 5);
    config.intermediate_names = (0..20).map(|i| format!("item-{}", i)).collect();
    config.exclusive_groups = ExclusiveGroups::new(vec![
        set(&["item-21", "item-22", "item-23"]),
        set(&["item-40", "item-41"]),
    ]);
    config.seeded_rows = vec![vec![Some("raw-0".to_string()), None, Some("raw-1".to_string())]];
    (graph, products, config)
}

#[test]
fn test_reuse_places_partial_match_first() {
    let g = graph(&[("ab", &["a", "b"]), ("ac", &["a", "c"]), ("de", &["d", "e"])]);
    let mut config = bare_config(3, 0, 10);
    config.seeded_rows = vec![vec![Some("a".to_string())]];
    let rows = config.initial_rows().unwrap();

    let mut optimizer = LaneAssignmentOptimizer::new(&g, &config);
    let first = optimizer
        .best_candidate(&rows, &set(&["ab", "ac", "de"]))
        .unwrap()
        .unwrap();
    assert_eq!((first.row, first.side), (0, Side::Top));
    assert_eq!(first.recipes, vec!["ab"]);
    assert_eq!(first.new_ingredients, vec!["b"]);

    let rows = optimize_layout(&g, &["ab", "ac", "de"], &config).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_recipes(Side::Top), &["ab", "ac"]);
    assert_eq!(rows[0].get_recipes(Side::Bot), &["de"]);
}

#[test]
fn test_one_lane_left_takes_the_reuser() {
    let g = graph(&[("ab", &["a", "b"]), ("de", &["d", "e"])]);
    let config = bare_config(3, 0, 10);
    let rows = vec![Row::with_lanes(
        config.shape(),
        vec![Some("a".to_string()), Some("z".to_string())],
    )
    .unwrap()];

    let mut optimizer = LaneAssignmentOptimizer::new(&g, &config);
    let best = optimizer
        .best_candidate(&rows[..1], &set(&["ab", "de"]))
        .unwrap()
        .unwrap();
    assert_eq!(best.side, Side::Top);
    assert_eq!(best.recipes, vec!["ab"]);
}

#[test]
fn test_unplaceable_recipe_is_reported() {
    let raws = ["r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9"];
    let g = graph(&[("X", &raws), ("small", &["r1"])]);
    let config = bare_config(8, 4, 10);

    match optimize_layout(&g, &["small", "X"], &config) {
        Err(MallError::UnplaceableRecipe {
            recipe,
            required,
            capacity,
        }) => {
            assert_eq!(recipe, "X");
            assert_eq!(required, 9);
            assert_eq!(capacity, 8);
        }
        other => panic!("expected UnplaceableRecipe, got {:?}", other),
    }

    let err = optimize_layout(&g, &["X"], &config).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("X") && message.contains('9'));
}

#[test]
fn test_full_side_excluded_from_later_scans() {
    let g = graph(&[("r1", &["a"]), ("r2", &["a"]), ("r3", &["a"])]);
    let config = bare_config(6, 4, 2);

    let rows = optimize_layout(&g, &["r1", "r2", "r3"], &config).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_recipes(Side::Top), &["r1", "r2"]);
    assert!(rows[0].full(Side::Top));
    // "a" sits in a shared lane, so the bottom side reuses it
    assert_eq!(rows[0].get_recipes(Side::Bot), &["r3"]);
    assert!(!rows[0].full(Side::Bot));
    assert_eq!(rows[0].lanes().iter().flatten().count(), 1);
}

#[test]
fn test_exclusive_members_split_across_sides() {
    let g = graph(&[("furnace", &["brick"]), ("wall", &["brick"]), ("path", &["brick"])]);
    let mut config = bare_config(6, 4, 10);
    config.exclusive_groups = ExclusiveGroups::new(vec![set(&["furnace", "wall"])]);

    let products = vec!["furnace".to_string(), "wall".to_string(), "path".to_string()];
    let rows = optimize_layout(&g, &products, &config).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_recipes(Side::Top), &["furnace", "path"]);
    assert_eq!(rows[0].get_recipes(Side::Bot), &["wall"]);
    assert_layout_invariants(&rows, &g, &products, &config);
}

#[test]
fn test_new_rows_appended_when_nothing_fits() {
    let g = graph(&[("p", &["a", "b"]), ("q", &["c", "d"]), ("s", &["e", "f"])]);
    let config = bare_config(2, 0, 10);

    let products = vec!["p".to_string(), "q".to_string(), "s".to_string()];
    let rows = optimize_layout(&g, &products, &config).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get_recipes(Side::Top), &["p"]);
    assert_eq!(rows[0].get_recipes(Side::Bot), &["q"]);
    assert_eq!(rows[1].get_recipes(Side::Top), &["s"]);
    assert_layout_invariants(&rows, &g, &products, &config);
}

#[test]
fn test_seeded_lanes_are_reused() {
    let g = graph(&[("iron-chest", &["iron-plate"]), ("pipe", &["iron-plate"])]);
    let config = LayoutConfig::default();

    let rows = optimize_layout(&g, &["pipe", "iron-chest"], &config).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get_recipes(Side::Top), &["iron-chest", "pipe"]);
    assert_eq!(rows[0].lanes()[0].as_deref(), Some("iron-plate"));
    assert_eq!(rows[0].lanes().iter().flatten().count(), 3);
}

#[test]
fn test_cycle_aborts_run() {
    let g = graph(&[("a", &["b"]), ("b", &["a"])]);
    let config = bare_config(6, 4, 10);
    assert!(matches!(
        optimize_layout(&g, &["a"], &config),
        Err(MallError::CyclicRecipe { .. })
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let g = graph(&[("a", &["b"])]);
    let config = bare_config(6, 4, 0);
    assert!(matches!(
        optimize_layout(&g, &["a"], &config),
        Err(MallError::InvalidConfig(_))
    ));
}

#[test]
fn test_oversized_config_rejected_before_seeding() {
    let g = graph(&[("a", &["b"])]);
    let config = LayoutConfig {
        lane_capacity_per_side: usize::MAX,
        shared_lanes: 0,
        ..LayoutConfig::default()
    };
    assert!(!config.seeded_rows.is_empty());
    assert!(matches!(
        optimize_layout(&g, &["a"], &config),
        Err(MallError::InvalidConfig(_))
    ));
}

#[test]
fn test_generated_layouts_hold_invariants() {
    for seed in [1, 7, 42, 1234, 99_999] {
        let (g, products, config) = generated_fixture(seed);
        let rows = optimize_layout(&g, &products, &config).unwrap();
        assert_layout_invariants(&rows, &g, &products, &config);
    }
}

#[test]
fn test_product_order_does_not_change_layout() {
    let (g, products, config) = generated_fixture(42);
    let mut reversed = products.clone();
    reversed.reverse();

    let forward = optimize_layout(&g, &products, &config).unwrap();
    let backward = optimize_layout(&g, &reversed, &config).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn test_duplicate_products_placed_once() {
    let g = graph(&[("pipe", &["iron-plate"])]);
    let config = bare_config(6, 4, 10);
    let rows = optimize_layout(&g, &["pipe", "pipe"], &config).unwrap();
    assert_eq!(rows[0].get_recipes(Side::Top), &["pipe"]);
    assert!(rows[0].get_recipes(Side::Bot).is_empty());
}

#[test]
fn test_recipes_using_flattened_ingredient() {
    let g = graph(&[
        ("copper-cable", &["copper-plate"]),
        ("small-lamp", &["copper-cable", "iron-plate"]),
        ("pipe", &["iron-plate"]),
    ]);
    let config = bare_config(6, 4, 10);
    assert_eq!(
        recipes_using(&g, &config, "copper-plate").unwrap(),
        vec!["copper-cable", "small-lamp"]
    );
    assert_eq!(
        recipes_using(&g, &config, "iron-plate").unwrap(),
        vec!["pipe", "small-lamp"]
    );
}
