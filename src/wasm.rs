//! WebAssembly bindings for Mallrow.
//!
//! This module provides JavaScript-accessible functions for the layout optimizer.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::models::{LayoutConfig, RecipeGraph};
use crate::optimizer::optimize_layout;
use crate::row::{Row, Side};

/// JavaScript-friendly input for a layout run.
#[derive(Debug, Clone, Deserialize)]
pub struct JsLayoutInput {
    /// Recipe name to ingredient names
    pub recipes: RecipeGraph,
    /// Products to place
    pub products: Vec<String>,
    #[serde(default)]
    pub config: Option<LayoutConfig>,
}

/// JavaScript-friendly view of one side.
#[derive(Debug, Clone, Serialize)]
pub struct JsSide {
    pub side: Side,
    pub ingredients: Vec<Option<String>>,
    pub recipes: Vec<String>,
    pub full: bool,
}

/// JavaScript-friendly view of one row.
#[derive(Debug, Clone, Serialize)]
pub struct JsRow {
    pub lanes: Vec<Option<String>>,
    pub sides: Vec<JsSide>,
}

/// JavaScript-friendly layout result.
#[derive(Debug, Clone, Serialize)]
pub struct JsLayoutResult {
    pub success: bool,
    pub error: Option<String>,
    pub rows: Vec<JsRow>,
}

impl From<&Row> for JsRow {
    fn from(row: &Row) -> Self {
        JsRow {
            lanes: row.lanes().to_vec(),
            sides: Side::ALL
                .iter()
                .map(|&side| JsSide {
                    side,
                    ingredients: row.get_ingredients(side).to_vec(),
                    recipes: row.get_recipes(side).to_vec(),
                    full: row.full(side),
                })
                .collect(),
        }
    }
}

fn failure(message: String) -> String {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(&message));

    serde_json::to_string(&JsLayoutResult {
        success: false,
        error: Some(message),
        rows: vec![],
    })
    .unwrap_or_default()
}

/// Run the layout optimizer.
///
/// Takes a JSON string input and returns a JSON string result.
#[wasm_bindgen]
pub fn optimize(input_json: &str) -> String {
    let input: JsLayoutInput = match serde_json::from_str(input_json) {
        Ok(i) => i,
        Err(e) => return failure(format!("Invalid input: {}", e)),
    };
    let config = input.config.unwrap_or_default();

    match optimize_layout(&input.recipes, &input.products, &config) {
        Ok(rows) => serde_json::to_string(&JsLayoutResult {
            success: true,
            error: None,
            rows: rows.iter().map(JsRow::from).collect(),
        })
        .unwrap_or_default(),
        Err(e) => failure(e.to_string()),
    }
}

/// Get the version of the optimizer.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
