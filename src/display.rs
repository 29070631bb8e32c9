//! Display and formatting utilities for Mallrow.
//!
//! Rows are printed in physical order, top to bottom: the lanes only the
//! TOP side reaches, the TOP recipes, the shared lanes, the BOT recipes,
//! then the lanes only the BOT side reaches.

use crate::row::{Row, Side};

const EMPTY_LANE: &str = "----";
const ROW_RULE: &str = "===============================";

fn push_lanes(lines: &mut Vec<String>, row: &Row, lanes: std::ops::Range<usize>) {
    for lane in lanes {
        let name = row.lanes()[lane].as_deref().unwrap_or(EMPTY_LANE);
        lines.push(name.to_string());
    }
}

fn push_recipes(lines: &mut Vec<String>, row: &Row, side: Side) {
    let mut recipes: Vec<&String> = row.get_recipes(side).iter().collect();
    recipes.sort();
    for recipe in recipes {
        lines.push(format!("    {}", recipe));
    }
}

/// Formats one row.
///
/// # Example
///
/// ```
/// use mallrow::display::format_row;
/// use mallrow::row::{Row, RowShape, Side};
///
/// let mut row = Row::new(RowShape::new(2, 1, 4));
/// row.add_ingredient(Side::Top, "iron-plate").unwrap();
/// row.add_recipe(Side::Top, "pipe").unwrap();
///
/// assert_eq!(format_row(&row), "----\n    pipe\niron-plate\n----");
/// ```
pub fn format_row(row: &Row) -> String {
    let shape = row.shape();
    let shared = shape.shared();
    let mut lines = Vec::new();

    push_lanes(&mut lines, row, 0..shared.start);
    push_recipes(&mut lines, row, Side::Top);
    push_lanes(&mut lines, row, shared.clone());
    push_recipes(&mut lines, row, Side::Bot);
    push_lanes(&mut lines, row, shared.end..shape.total_lanes());

    lines.join("\n")
}

/// Formats every row, each followed by a separator rule.
pub fn format_layout(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| format!("{}\n{}\n", format_row(row), ROW_RULE))
        .collect()
}

/// One-paragraph summary of a finished layout.
pub fn format_summary(rows: &[Row]) -> String {
    let recipes: usize = rows
        .iter()
        .map(|row| Side::ALL.iter().map(|&s| row.get_recipes(s).len()).sum::<usize>())
        .sum();
    let lanes_used: usize = rows
        .iter()
        .map(|row| row.lanes().iter().filter(|l| l.is_some()).count())
        .sum();
    let lanes_total: usize = rows.iter().map(|row| row.lanes().len()).sum();
    let full_sides = rows
        .iter()
        .map(|row| Side::ALL.iter().filter(|&&s| row.full(s)).count())
        .sum::<usize>();

    format!(
        "Rows:        {}\nRecipes:     {}\nLanes used:  {}/{}\nFull sides:  {}",
        rows.len(),
        recipes,
        lanes_used,
        lanes_total,
        full_sides
    )
}

/// Prints the layout and its summary to stdout.
pub fn display_layout(rows: &[Row]) {
    println!();
    println!("[MALL LAYOUT]");
    println!("{}", ROW_RULE);
    print!("{}", format_layout(rows));
    println!();
    println!("[SUMMARY]");
    println!("{}", format_summary(rows));
}
