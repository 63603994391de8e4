//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigLayer;

#[derive(Parser, Debug, Default)]
#[command(
    name = "slot-gallery",
    version,
    about = "Browse a folder of numbered images page by page",
    long_about = "Browse a folder of numbered images (1.jpg, 2.png, ...) page by page.\n\n\
                  Each slot's extension is discovered by probing the candidates in order;\n\
                  slots without an image are skipped."
)]
pub struct Cli {
    /// Gallery folder. Without one the window opens with a folder picker.
    #[arg(value_name = "FOLDER")]
    pub folder: Option<PathBuf>,

    /// Total number of slots across all pages.
    #[arg(long)]
    pub total: Option<u32>,

    /// Slots per page.
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,

    /// Extension candidates in priority order (e.g. jpg,png,jpeg,webp).
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Number of page buttons shown in the pagination bar.
    #[arg(long = "max-buttons")]
    pub max_buttons: Option<u32>,

    /// Cards per row.
    #[arg(long)]
    pub columns: Option<u32>,

    /// Extra config file applied over the user config.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The flag layer, applied last over every config file
    pub fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            folder: None,
            total: self.total,
            page_size: self.page_size,
            extensions: self.extensions.clone(),
            max_buttons: self.max_buttons,
            columns: self.columns,
        }
    }
}
