use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::theme::SystemScheme;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// HTML page to drive.
    #[arg(long)]
    pub page: PathBuf,

    /// Location the page is served from (e.g. `https://user.github.io/handbook/sections/intro.html`).
    ///
    /// The site base and the search index URL are derived from it.
    #[arg(long)]
    pub url: Url,

    /// Type this query into the search field and print the results.
    #[arg(long)]
    pub query: Option<String>,

    /// Click the theme toggle once after page load.
    #[arg(long)]
    pub toggle_theme: bool,

    /// System dark-mode signal seen by the page.
    #[arg(long, value_enum, default_value = "light")]
    pub color_scheme: SystemScheme,

    /// JSON file persisting the theme preference. Without it the preference lives for this run only.
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Read the search index from a local JSON file instead of fetching it.
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// TOML file overriding element ids, selectors and labels.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the resulting page HTML here.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// HTTP User-Agent used for fetching the search index.
    #[arg(long, default_value = "docsite-behavior/0.1")]
    pub user_agent: String,
}
