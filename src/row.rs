//! Mall rows and their two sides.
//!
//! A row is one fixed-size array of ingredient lanes viewed from two sides.
//! The middle lanes are visible to both sides, so an ingredient placed
//! there feeds the TOP and BOT recipes alike. Lanes are filled once and
//! never cleared.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::error::{MallError, Result};

/// One half of a [`Row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bot,
}

impl Side {
    /// Both sides in scan order.
    pub const ALL: [Side; 2] = [Side::Top, Side::Bot];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Top => write!(f, "top"),
            Side::Bot => write!(f, "bottom"),
        }
    }
}

/// Physical dimensions shared by every row in a run.
///
/// With `lane_capacity = 6` and `shared_lanes = 4` a row has eight lanes:
/// TOP sees lanes `0..6`, BOT sees lanes `2..8`, and lanes `2..6` are shared.
///
/// # Example
///
/// ```
/// use mallrow::row::{RowShape, Side};
///
/// let shape = RowShape::new(6, 4, 10);
/// assert_eq!(shape.total_lanes(), 8);
/// assert_eq!(shape.window(Side::Bot), 2..8);
/// assert_eq!(shape.lane_preference(Side::Top), vec![2, 3, 4, 5, 0, 1]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShape {
    lane_capacity: usize,
    shared_lanes: usize,
    recipe_capacity: usize,
}

impl RowShape {
    pub fn new(lane_capacity: usize, shared_lanes: usize, recipe_capacity: usize) -> Self {
        RowShape {
            lane_capacity,
            shared_lanes: shared_lanes.min(lane_capacity),
            recipe_capacity,
        }
    }

    /// Lanes visible to one side.
    pub fn lane_capacity(&self) -> usize {
        self.lane_capacity
    }

    /// Always at most [`lane_capacity`](Self::lane_capacity).
    pub fn shared_lanes(&self) -> usize {
        self.shared_lanes
    }

    pub fn recipe_capacity(&self) -> usize {
        self.recipe_capacity
    }

    pub fn total_lanes(&self) -> usize {
        2 * self.lane_capacity - self.shared_lanes
    }

    /// Lane indices shared by both sides.
    pub fn shared(&self) -> Range<usize> {
        self.lane_capacity - self.shared_lanes..self.lane_capacity
    }

    /// Lane indices visible from `side`.
    pub fn window(&self, side: Side) -> Range<usize> {
        match side {
            Side::Top => 0..self.lane_capacity,
            Side::Bot => self.lane_capacity - self.shared_lanes..self.total_lanes(),
        }
    }

    /// Order in which `side` claims empty lanes: shared lanes first, then
    /// the lanes only that side can reach.
    pub fn lane_preference(&self, side: Side) -> Vec<usize> {
        let exclusive = match side {
            Side::Top => 0..self.lane_capacity - self.shared_lanes,
            Side::Bot => self.lane_capacity..self.total_lanes(),
        };
        self.shared().chain(exclusive).collect()
    }
}

/// A mall row: shared lane array plus the recipes placed on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    shape: RowShape,
    lanes: Vec<Option<String>>,
    recipes_top: Vec<String>,
    recipes_bot: Vec<String>,
}

impl Row {
    /// Creates a row with every lane empty.
    pub fn new(shape: RowShape) -> Self {
        Row {
            shape,
            lanes: vec![None; shape.total_lanes()],
            recipes_top: Vec::new(),
            recipes_bot: Vec::new(),
        }
    }

    /// Creates a row pre-populated with `lanes`, padding the rest with
    /// empty lanes.
    pub fn with_lanes(shape: RowShape, mut lanes: Vec<Option<String>>) -> Result<Self> {
        let total = shape.total_lanes();
        if lanes.len() > total {
            return Err(MallError::InvalidConfig(format!(
                "row seeded with {} lanes but only has {}",
                lanes.len(),
                total
            )));
        }
        lanes.resize(total, None);
        Ok(Row {
            shape,
            lanes,
            recipes_top: Vec::new(),
            recipes_bot: Vec::new(),
        })
    }

    pub fn shape(&self) -> RowShape {
        self.shape
    }

    /// The whole physical lane array.
    pub fn lanes(&self) -> &[Option<String>] {
        &self.lanes
    }

    /// Lane contents visible from `side`, empty lanes included.
    pub fn get_ingredients(&self, side: Side) -> &[Option<String>] {
        &self.lanes[self.shape.window(side)]
    }

    /// Names of the ingredients already reachable from `side`.
    pub fn placed_ingredients(&self, side: Side) -> impl Iterator<Item = &str> {
        self.get_ingredients(side).iter().flatten().map(String::as_str)
    }

    pub fn count_available_lanes(&self, side: Side) -> usize {
        self.get_ingredients(side).iter().filter(|l| l.is_none()).count()
    }

    /// Places `ingredient` in the first empty lane of `side`'s preference
    /// order and returns the lane index.
    pub fn add_ingredient(&mut self, side: Side, ingredient: &str) -> Result<usize> {
        for lane in self.shape.lane_preference(side) {
            if self.lanes[lane].is_none() {
                self.lanes[lane] = Some(ingredient.to_string());
                return Ok(lane);
            }
        }
        Err(MallError::LanesFull {
            side,
            ingredient: ingredient.to_string(),
        })
    }

    pub fn get_recipes(&self, side: Side) -> &[String] {
        match side {
            Side::Top => &self.recipes_top,
            Side::Bot => &self.recipes_bot,
        }
    }

    /// Appends a recipe to `side`. Fails if the side is already full.
    pub fn add_recipe(&mut self, side: Side, recipe: &str) -> Result<()> {
        if self.full(side) {
            return Err(MallError::SideFull {
                side,
                recipe: recipe.to_string(),
            });
        }
        match side {
            Side::Top => self.recipes_top.push(recipe.to_string()),
            Side::Bot => self.recipes_bot.push(recipe.to_string()),
        }
        Ok(())
    }

    pub fn full(&self, side: Side) -> bool {
        self.get_recipes(side).len() >= self.shape.recipe_capacity
    }
}
