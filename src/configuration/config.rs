use chrono::NaiveDate;
use color_eyre::eyre::{Context, Result};
use doku::Document;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::options::Opt;
use super::types::{parse_human_date, ConfigColor, ConfigUrl};

const DEFAULT_STYLESHEET_PATH: &str = "assets/weekboard.sass";
const DEFAULT_TEMPLATE_PATH: &str = "templates";
const DEFAULT_ASSETS_PATH: &str = "assets";

/// A display color for one service kind
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Document)]
pub struct KindColor {
    /// The service kind this color applies to
    #[doku(example = "Massage")]
    pub kind: String,

    /// Any CSS color, e.g. "#9ad1ba" or "rebeccapurple"
    #[doku(example = "#9ad1ba")]
    pub color: ConfigColor,
}

#[derive(Debug, Deserialize, Serialize, Document)]
pub struct Config {
    /// The base directory against which all other paths are resolved
    ///
    /// This is normally automatically derived from the directory in which the config file resides
    #[doku(example = ".")]
    pub base_dir: PathBuf,

    /// The date that is considered "today" on the rendered board
    /// (defaults to today if left empty)
    ///
    /// The week page containing this date becomes the index page
    #[doku(example = "today")]
    pub board_today_date: String,

    // this field is resolved from board_today_date in Config::new() hence the serde skip
    // this is the machine readable version of the above
    #[serde(skip)]
    pub today_date: NaiveDate,

    /// The file in which events are stored
    ///
    /// NOTE: This is relative to the config file
    #[doku(example = "events.json")]
    pub store_path: PathBuf,

    /// The path to the output directory where files will be written.
    ///
    /// NOTE: This is relative to the config file
    #[doku(example = "output")]
    pub output_dir: PathBuf,

    /// Do not delete files in the output directory
    #[doku(example = "false")]
    pub no_delete: bool,

    /// The base url at which the site will be served
    #[doku(example = "/")]
    pub base_url_path: ConfigUrl,

    /// The path to add into the stylesheet link tag
    #[doku(example = "/styles/style.css")]
    pub stylesheet_path: ConfigUrl,

    /// Whether to compile the stylesheet into the output dir
    pub copy_stylesheet_to_output: bool,

    /// The sass stylesheet to compile into the output dir
    ///
    /// NOTE: This is relative to the config file
    #[doku(example = "assets/weekboard.sass")]
    pub copy_stylesheet_from: PathBuf,

    /// The path for template files
    #[doku(example = "templates")]
    pub template_path: PathBuf,

    /// The path for asset files
    #[doku(example = "assets")]
    pub assets_path: PathBuf,

    /// The path to an HTML page in which to embed the output of weekboard
    pub embed_in_page: Option<PathBuf>,

    /// The CSS selector for the element whose content will be replaced
    pub embed_element_selector: String,

    /// The strftime format for the week heading
    #[doku(example = "Week of %B %-d, %Y")]
    pub week_view_format: String,

    /// The format for the start time of events
    ///
    /// Available format options: <https://docs.rs/chrono/latest/chrono/format/strftime/index.html>
    #[doku(example = "%H:%M")]
    pub event_start_format: String,

    /// The format for the end time of events
    ///
    /// Available format options: <https://docs.rs/chrono/latest/chrono/format/strftime/index.html>
    #[doku(example = "%H:%M")]
    pub event_end_format: String,

    /// The service kind given to new events when none is specified
    #[doku(example = "Massage")]
    pub default_event_kind: String,

    /// Display colors by service kind
    pub kind_colors: Vec<KindColor>,

    /// The first hour shown on the day columns
    #[doku(example = "6")]
    pub day_start_hour: u32,

    /// The number of hour slots in each day column
    #[doku(example = "16")]
    pub day_slot_count: u32,

    /// The pixel height of one hour slot
    #[doku(example = "60")]
    pub slot_height: u32,

    /// The pixel height of the day column header
    #[doku(example = "28")]
    pub day_header_height: u32,

    /// The pixel inset applied to the top and bottom of event blocks
    #[doku(example = "2")]
    pub block_inset: u32,
}

/// Sane default values for the config struct.
impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: ".".into(),
            board_today_date: "today".into(),
            today_date: NaiveDate::default(),
            store_path: "events.json".into(),
            output_dir: "output".into(),
            no_delete: false,
            base_url_path: "/".into(),
            stylesheet_path: "/styles/style.css".into(),
            copy_stylesheet_to_output: true,
            copy_stylesheet_from: DEFAULT_STYLESHEET_PATH.into(),
            template_path: DEFAULT_TEMPLATE_PATH.into(),
            assets_path: DEFAULT_ASSETS_PATH.into(),
            embed_in_page: None,
            embed_element_selector: "main".into(),
            week_view_format: "Week of %B %-d, %Y".into(),
            event_start_format: "%H:%M".into(),
            event_end_format: "%H:%M".into(),
            default_event_kind: "Massage".into(),
            kind_colors: Vec::new(),
            day_start_hour: 6,
            day_slot_count: 16,
            slot_height: 60,
            day_header_height: 28,
            block_inset: 2,
        }
    }
}

impl Config {
    pub fn new(config_path: &str, args: &Opt) -> Result<Config> {
        debug!("reading configuration...");
        let figment: Figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .admerge(Serialized::defaults(args));

        // all paths in the config are relative to the config file when it
        // exists, otherwise to the current directory
        let base_dir = match PathBuf::from(config_path).canonicalize() {
            Ok(config_file) => config_file
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| ".".into()),
            Err(_) => std::env::current_dir().wrap_err("could not determine current directory")?,
        };

        debug!("base directory is set to: {:?}", base_dir);

        let mut config: Config = figment
            .merge(Figment::new().join(("base_dir", &base_dir)))
            .extract()?;

        config.today_date = parse_human_date(&config.board_today_date)
            .wrap_err("could not parse board_today_date")?;

        Ok(config)
    }

    /// Look up the configured display color for a service kind
    pub fn color_for(&self, kind: &str) -> Option<&ConfigColor> {
        self.kind_colors
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| &entry.color)
    }
}
