use crate::app::ExportFormat;
use crate::domain::model::{TraitMap, TraitValue};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "listing-tracker")]
#[command(about = "Track apartment listings with tags and yes/no traits")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override storage.data_dir from config
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List listings, optionally filtered
    List {
        /// Only listings carrying this tag (repeatable, all must match)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Trait filter as NAME=yes|no|unknown (repeatable)
        #[arg(long = "trait", value_parser = parse_trait_arg)]
        traits: Vec<(String, TraitValue)>,
    },

    /// Show one listing
    Show { id: String },

    /// Add a listing; title and image are fetched from the URL unless given
    Add {
        #[arg(long)]
        url: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long = "trait", value_parser = parse_trait_arg)]
        traits: Vec<(String, TraitValue)>,

        #[arg(long)]
        image: Option<String>,

        /// Skip the metadata lookup
        #[arg(long)]
        no_fetch: bool,
    },

    /// Edit fields of an existing listing
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        url: Option<String>,

        /// Replace the tag list (repeatable)
        #[arg(long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,

        #[arg(long)]
        clear_tags: bool,

        #[arg(long = "trait", value_parser = parse_trait_arg)]
        traits: Vec<(String, TraitValue)>,

        #[arg(long)]
        image: Option<String>,
    },

    /// Delete a listing
    Delete { id: String },

    /// List every tag in use
    Tags,

    /// List known trait names
    Traits,

    /// Register a trait name
    AddTrait { name: String },

    /// Export listings to a file
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },

    /// Replace all listings with the contents of an exported JSON file
    Import { file: PathBuf },

    /// Print the title and image scraped from a URL
    FetchMetadata { url: String },
}

pub fn parse_trait_arg(arg: &str) -> Result<(String, TraitValue), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("trait name cannot be empty".to_string());
    }
    Ok((name.to_string(), value.parse()?))
}

/// `--trait` flags as a listing's trait map; `None` when none were given.
pub fn trait_map(args: Vec<(String, TraitValue)>) -> Option<TraitMap> {
    if args.is_empty() {
        None
    } else {
        Some(args.into_iter().collect())
    }
}
