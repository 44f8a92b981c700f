use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use catalog_client::{load_settings, CatalogClient, CatalogQuery, CatalogState};
use clap::{Parser, Subcommand};
use shared::domain::{Barcode, CategoryFilter, SortDirection, SortKey};
use tracing_subscriber::EnvFilter;

mod browse;
mod render;

#[derive(Parser, Debug)]
#[command(name = "explorer", about = "Browse the Open Food Facts catalog")]
struct Cli {
    #[arg(long, default_value = catalog_client::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Overrides `api_base_url` from config and environment.
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Free-text search; without a term, the default listing.
    Search {
        term: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "name")]
        sort: SortKey,
        #[arg(long)]
        desc: bool,
        /// Number of pages to show.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    Barcode {
        code: String,
    },
    Categories,
    /// Detail view for one barcode.
    Show {
        code: String,
    },
    /// Interactive session.
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    if let Some(base_url) = cli.base_url {
        settings.api_base_url = base_url;
    }
    let client = CatalogClient::from_settings(&settings)
        .with_context(|| format!("failed to set up directory at '{}'", settings.api_base_url))?;

    match cli.command {
        Command::Search {
            term,
            category,
            sort,
            desc,
            pages,
        } => {
            let outcome = client.search(term.as_deref().unwrap_or_default(), false).await;
            let text = client
                .with_state(|state| {
                    if let Some(category) = &category {
                        state.select_category(CategoryFilter::from_selection(category));
                    }
                    apply_sort(state, sort, desc);
                    for _ in 1..pages.max(1) {
                        state.load_more();
                    }
                    render::query_result(state, outcome)
                })
                .await;
            print!("{text}");
        }
        Command::Barcode { code } => {
            let outcome = client
                .submit(CatalogQuery::Barcode(Barcode::new(code.trim())))
                .await;
            let text = client
                .with_state(|state| render::query_result(state, outcome))
                .await;
            print!("{text}");
        }
        Command::Categories => {
            client.refresh_categories().await;
            let text = client
                .with_state(|state| render::categories(state.categories()))
                .await;
            print!("{text}");
        }
        Command::Show { code } => {
            client
                .submit(CatalogQuery::Barcode(Barcode::new(code.trim())))
                .await;
            let text = client
                .with_state(|state| match state.raw_products().first().cloned() {
                    Some(product) => render::detail(&state.open_detail(product)),
                    None => render::NO_PRODUCTS.to_string(),
                })
                .await;
            print!("{text}");
        }
        Command::Browse => browse::run(Arc::clone(&client)).await?,
    }

    Ok(())
}

/// Puts the view on `key`, descending when `desc`. Re-selecting the active
/// key flips direction, so only select when it changes anything.
fn apply_sort(state: &mut CatalogState, key: SortKey, desc: bool) {
    if state.view().sort_key() != key {
        state.select_sort(key);
    }
    let is_desc = state.view().direction() == SortDirection::Desc;
    if desc != is_desc {
        state.select_sort(key);
    }
}
