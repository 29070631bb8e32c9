//! Data loading functionality for Mallrow.
//!
//! This module reads the inputs of a layout run from disk:
//!
//! - the recipe graph, either as a CSV table or as the raw in-game dump
//! - plain-text name lists (products, intermediates, exclusive products)
//! - the JSON layout configuration
//!
//! The in-game dump is produced with the console command
//!
//! ```text
//! /c local list = {} for _, recipe in pairs(game.player.force.recipes) do list[#list+1] = {recipe.name,{recipe.ingredients}} end helpers.write_file("recipes.txt", serpent.block(list))
//! ```
//!
//! Running it disables achievements for the save.

use csv::ReaderBuilder;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{MallError, Result};
use crate::models::{ExclusiveGroups, LayoutConfig, RecipeGraph, RecipeRow};

/// Splits a semicolon-separated ingredient field.
fn parse_ingredient_list(s: &str) -> Vec<String> {
    s.split(';')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Reads a recipe table from any CSV source.
///
/// # CSV Format
///
/// Expected columns: `name, ingredients` where `ingredients` is a
/// `;`-separated list (fluids already removed).
pub fn read_recipe_csv<R: Read>(reader: R) -> Result<RecipeGraph> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut graph = RecipeGraph::new();
    for result in rdr.deserialize() {
        let row: RecipeRow = result?;
        graph.insert(row.name, parse_ingredient_list(&row.ingredients));
    }
    Ok(graph)
}

/// Loads a recipe table from a CSV file.
pub fn load_recipe_csv(path: &Path) -> Result<RecipeGraph> {
    let file = File::open(path)?;
    read_recipe_csv(file)
}

/// Strips the quotes and trailing comma from a serpent value.
fn unquote(value: &str) -> &str {
    let value = value.trim_end_matches(',');
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parses the serpent block dump of every recipe known to the force.
///
/// Depth 2 holds the recipe name, depth 5 the `key = value` attributes of
/// one ingredient. Ingredients of type `fluid` are dropped.
///
/// # Example
///
/// ```
/// use mallrow::data::parse_recipe_dump;
///
/// let dump = r#"{
///   {
///     "pipe",
///     {
///       {
///         {
///           amount = 1,
///           name = "iron-plate",
///           type = "item"
///         }
///       }
///     }
///   }
/// }"#;
/// let graph = parse_recipe_dump(dump).unwrap();
/// assert_eq!(graph.ingredients("pipe"), &["iron-plate".to_string()]);
/// ```
pub fn parse_recipe_dump(text: &str) -> Result<RecipeGraph> {
    let mut graph = RecipeGraph::new();
    let mut depth = 0usize;
    let mut recipe_name: Option<String> = None;
    let mut ingredients: Vec<String> = Vec::new();
    let mut name: Option<String> = None;
    let mut kind: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = match raw.find("--[[") {
            Some(pos) => raw[..pos].trim(),
            None => raw.trim(),
        };
        if line.is_empty() || line == "{}" || line == "{}," {
            continue;
        }

        if line == "{" {
            depth += 1;
        } else if line.starts_with('}') {
            depth = depth.checked_sub(1).ok_or_else(|| MallError::Parse {
                line: line_no,
                message: "unbalanced closing brace".to_string(),
            })?;
            match depth {
                4 => {
                    if let Some(n) = name.take() {
                        if kind.as_deref() != Some("fluid") {
                            ingredients.push(n);
                        }
                    }
                    kind = None;
                }
                1 => {
                    if let Some(recipe) = recipe_name.take() {
                        graph.insert(recipe, std::mem::take(&mut ingredients));
                    }
                }
                _ => {}
            }
        } else if depth == 2 {
            let recipe = line
                .strip_suffix(',')
                .and_then(|l| l.strip_prefix('"'))
                .and_then(|l| l.strip_suffix('"'))
                .ok_or_else(|| MallError::Parse {
                    line: line_no,
                    message: format!("expected quoted recipe name, got `{}`", line),
                })?;
            recipe_name = Some(recipe.to_string());
            ingredients.clear();
        } else if depth == 5 {
            let (attribute, value) = line.split_once(" = ").ok_or_else(|| MallError::Parse {
                line: line_no,
                message: format!("expected `key = value`, got `{}`", line),
            })?;
            match attribute {
                "name" => name = Some(unquote(value).to_string()),
                "type" => kind = Some(unquote(value).to_string()),
                _ => {}
            }
        }
    }

    if depth != 0 {
        return Err(MallError::Parse {
            line: text.lines().count(),
            message: format!("{} unclosed braces at end of input", depth),
        });
    }
    Ok(graph)
}

/// Loads a recipe dump file.
pub fn load_recipe_dump(path: &Path) -> Result<RecipeGraph> {
    parse_recipe_dump(&fs::read_to_string(path)?)
}

/// Loads recipes from `path`, as CSV when the extension is `.csv` and as
/// an in-game dump otherwise.
pub fn load_recipes(path: &Path) -> Result<RecipeGraph> {
    let graph = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => load_recipe_csv(path)?,
        _ => load_recipe_dump(path)?,
    };
    debug!(path = %path.display(), recipes = graph.len(), "loaded recipes");
    Ok(graph)
}

/// Parses a name list: one name per line, `#` comments and blank lines skipped.
pub fn parse_name_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_name_list(path: &Path) -> Result<Vec<String>> {
    Ok(parse_name_list(&fs::read_to_string(path)?))
}

/// Parses exclusive product groups: names one per line, blank lines
/// between groups.
///
/// # Example
///
/// ```
/// use mallrow::data::parse_exclusive_groups;
///
/// let groups = parse_exclusive_groups("stone-furnace\nstone-wall\n\n# rails\nrail\n");
/// assert_eq!(groups.groups().len(), 2);
/// assert!(groups.conflicts("stone-wall", &["stone-furnace".to_string()]));
/// ```
pub fn parse_exclusive_groups(text: &str) -> ExclusiveGroups {
    let mut groups = Vec::new();
    let mut current = BTreeSet::new();
    for line in text.lines().map(str::trim) {
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.insert(line.to_string());
    }
    if !current.is_empty() {
        groups.push(current);
    }
    ExclusiveGroups::new(groups)
}

pub fn load_exclusive_groups(path: &Path) -> Result<ExclusiveGroups> {
    Ok(parse_exclusive_groups(&fs::read_to_string(path)?))
}

/// Loads a JSON layout configuration. Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<LayoutConfig> {
    let file = File::open(path)?;
    let config: LayoutConfig = serde_json::from_reader(file)?;
    config.validate()?;
    Ok(config)
}

/// Input files of a full run, as laid out in the `data/` directory.
#[derive(Debug, Clone)]
pub struct MallData {
    pub recipes: RecipeGraph,
    pub products: Vec<String>,
    pub config: LayoutConfig,
}

/// Loads everything from a data directory.
///
/// Reads `recipes.csv` (or `recipes.raw`), `mall_products.txt`, and when
/// present `config.json`, `intermediates.txt` and `exclusive_products.txt`.
/// The text lists replace the matching config fields.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use mallrow::data::load_all_data;
///
/// let data = load_all_data(Path::new("data")).unwrap();
/// println!("Loaded {} recipes", data.recipes.len());
/// ```
pub fn load_all_data(data_dir: &Path) -> Result<MallData> {
    let csv_path = data_dir.join("recipes.csv");
    let recipes = if csv_path.exists() {
        load_recipes(&csv_path)?
    } else {
        load_recipes(&data_dir.join("recipes.raw"))?
    };

    let products = load_name_list(&data_dir.join("mall_products.txt"))?;

    let config_path = data_dir.join("config.json");
    let mut config = if config_path.exists() {
        load_config(&config_path)?
    } else {
        LayoutConfig::default()
    };

    let intermediates_path = data_dir.join("intermediates.txt");
    if intermediates_path.exists() {
        config.intermediate_names = load_name_list(&intermediates_path)?.into_iter().collect();
    }
    let exclusive_path = data_dir.join("exclusive_products.txt");
    if exclusive_path.exists() {
        config.exclusive_groups = load_exclusive_groups(&exclusive_path)?;
    }

    Ok(MallData {
        recipes,
        products,
        config,
    })
}
