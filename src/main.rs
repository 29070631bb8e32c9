//! Mallrow - Command Line Interface
//!
//! This is the main entry point for the mall layout tool.
//! Run with `--help` to see all available options.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mallrow::{
    data::{load_all_data, load_exclusive_groups, load_name_list},
    display::display_layout,
    optimizer::{optimize_layout, recipes_using},
};

/// Command-line arguments for Mallrow.
#[derive(Parser, Debug)]
#[command(name = "mallrow")]
#[command(author, version, about = "Pack Factorio mall recipes into as few rows as possible", long_about = None)]
struct Args {
    /// Directory holding recipes, product lists and config
    #[arg(short, long, default_value = "data")]
    data: PathBuf,

    /// Intermediates list, replaces the one from the data directory
    #[arg(long)]
    intermediates: Option<PathBuf>,

    /// Exclusive products list, replaces the one from the data directory
    #[arg(long)]
    exclusive: Option<PathBuf>,

    // ========== Row shape ==========
    /// Ingredient lanes visible to one side
    #[arg(long)]
    lanes: Option<usize>,

    /// Lanes shared by both sides
    #[arg(long)]
    shared_lanes: Option<usize>,

    /// Maximum recipes per side
    #[arg(long)]
    recipes: Option<usize>,

    /// Start from empty rows instead of the seeded ones
    #[arg(long)]
    no_seed: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every recipe whose flattened ingredients include INGREDIENT
    Uses {
        ingredient: String,
    },
}

fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    if !args.data.exists() {
        eprintln!(
            "Error: '{}' directory not found. Please run from the project root.",
            args.data.display()
        );
        std::process::exit(1);
    }

    let mut data = load_all_data(&args.data)?;
    if let Some(path) = &args.intermediates {
        data.config.intermediate_names = load_name_list(path)?.into_iter().collect();
    }
    if let Some(path) = &args.exclusive {
        data.config.exclusive_groups = load_exclusive_groups(path)?;
    }
    if let Some(lanes) = args.lanes {
        data.config.lane_capacity_per_side = lanes;
    }
    if let Some(shared) = args.shared_lanes {
        data.config.shared_lanes = shared;
    }
    if let Some(recipes) = args.recipes {
        data.config.recipe_capacity_per_side = recipes;
    }
    if args.no_seed {
        data.config.seeded_rows.clear();
    }
    data.config.validate()?;
    info!(
        recipes = data.recipes.len(),
        products = data.products.len(),
        "loaded data from {}",
        args.data.display()
    );

    if let Some(Command::Uses { ingredient }) = &args.command {
        for recipe in recipes_using(&data.recipes, &data.config, ingredient)? {
            println!("{}", recipe);
        }
        return Ok(());
    }

    println!("Mallrow - Mall Layout Optimizer");
    println!("================================================================");
    println!();
    println!("Configuration:");
    println!("  Products:        {}", data.products.len());
    println!("  Lanes per side:  {}", data.config.lane_capacity_per_side);
    println!("  Shared lanes:    {}", data.config.shared_lanes);
    println!("  Recipes / side:  {}", data.config.recipe_capacity_per_side);
    println!("  Seeded rows:     {}", data.config.seeded_rows.len());

    let rows = optimize_layout(&data.recipes, &data.products, &data.config)?;
    display_layout(&rows);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_seed_is_a_plain_flag() {
        let args = Args::try_parse_from(["mallrow"]).unwrap();
        assert!(!args.no_seed);
        let args = Args::try_parse_from(["mallrow", "--no-seed", "--lanes", "4"]).unwrap();
        assert!(args.no_seed);
        assert_eq!(args.lanes, Some(4));
    }
}
