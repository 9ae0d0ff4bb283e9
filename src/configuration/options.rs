use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// Command line options
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(name = "weekboard", author, version, about)]
pub struct Opt {
    /// The config file to read
    ///
    /// The base_dir is also set from this file so that all paths mentioned in
    /// the config are relative to the directory containing the config file.
    #[clap(long, default_value = "weekboard.toml")]
    pub config_file: String,

    /// Create the example config file in the current directory
    #[clap(long, default_value_t = false)]
    pub create_default_config: bool,

    /// Restore the missing default templates to the templates path specified in the config file
    #[clap(long, default_value_t = false)]
    pub restore_missing_templates: bool,

    /// Restore the missing assets to the assets path specified in the config file
    #[clap(long, default_value_t = false)]
    pub restore_missing_assets: bool,

    /// Do not delete files in the output directory
    #[clap(long, default_value_t = false)]
    pub no_delete: bool,

    #[command(subcommand)]
    #[serde(skip)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render all week pages (the default when no command is given)
    Render,

    /// Add an event to the store and re-render the pages
    Add {
        /// Title shown on the event block
        #[arg(long)]
        title: String,

        /// Day of the event, e.g. "2024-06-05" or "tomorrow" (defaults to today)
        #[arg(long)]
        day: Option<String>,

        /// Start time as HH:MM
        #[arg(long)]
        start: String,

        /// End time as HH:MM, at least 15 minutes after the start
        #[arg(long)]
        end: String,

        /// Service kind, e.g. "Massage" (defaults to the configured kind)
        #[arg(long, visible_alias = "type")]
        kind: Option<String>,

        /// Capacity of the event, left empty when not given
        #[arg(long)]
        capacity: Option<String>,
    },

    /// Delete a stored event by its key, asking for confirmation first
    Remove {
        /// The storage key, as shown by `weekboard list`
        key: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List stored events with their storage keys
    List,
}
