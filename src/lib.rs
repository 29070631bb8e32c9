//! # Mallrow
//!
//! A command-line tool and library for laying out a Factorio mall: a run
//! of assembler rows where every row has a TOP and a BOT side, each fed by
//! a handful of ingredient belt lanes.
//!
//! Given the recipes to build, Mallrow packs them into as few rows as it
//! can while:
//!
//! - using as few distinct ingredient lanes as possible
//! - reusing ingredients already on a side
//! - keeping mutually exclusive products on different sides
//!
//! ## Modules
//!
//! - [`models`] - Recipe graph, ingredient keys, exclusive groups and configuration
//! - [`row`] - Rows, sides and shared lane placement
//! - [`resolver`] - Flattening recipes into root ingredient keys
//! - [`optimizer`] - The greedy lane assignment loop
//! - [`data`] - Recipe, list and config loading
//! - [`display`] - Text rendering of a layout
//! - [`error`] - Error type shared by every module
//!
//! ## Example Usage
//!
//! ```no_run
//! use mallrow::{
//!     data::load_all_data,
//!     display::display_layout,
//!     optimizer::optimize_layout,
//! };
//! use std::path::Path;
//!
//! let data = load_all_data(Path::new("data")).unwrap();
//! let rows = optimize_layout(&data.recipes, &data.products, &data.config).unwrap();
//! display_layout(&rows);
//! ```
//!
//! ## Row geometry
//!
//! With the stock configuration a row has eight lanes. TOP sees lanes
//! 0..6, BOT sees lanes 2..8, and the four middle lanes feed both sides.
//! New ingredients go to shared lanes first.

pub mod data;
pub mod display;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod resolver;
pub mod row;
pub mod wasm;

pub use error::{MallError, Result};
