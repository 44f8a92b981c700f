//! Interactive session over stdin, mapping the catalog controls to commands.

use std::sync::Arc;

use anyhow::Result;
use catalog_client::{CatalogClient, CatalogEvent, CatalogQuery};
use shared::domain::{CategoryFilter, SortKey};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::broadcast,
};
use tracing::debug;

use crate::render;

const HELP: &str = "\
commands:
  search [term]      free-text search (no term: default listing)
  barcode <code>     exact product lookup
  categories         list the category filter options
  category <id|all>  filter by category
  sort <name|grade>  sort; repeat to flip direction
  more               load the next page
  show [n]           open product n (or redisplay the open product)
  add [n]            add product n (or the open product) to the cart
  back               close the product view
  cart               show the cart
  quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Query(CatalogQuery),
    Categories,
    Category(CategoryFilter),
    Sort(SortKey),
    More,
    Show(Option<usize>),
    Add(Option<usize>),
    Back,
    Cart,
    Help,
    Quit,
}

/// Parses one input line. Product numbers are 1-based as rendered.
pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    match verb.to_ascii_lowercase().as_str() {
        "search" | "s" => Ok(BrowseCommand::Query(CatalogQuery::from_input(rest, false))),
        "barcode" | "b" => {
            if rest.is_empty() {
                Err("barcode needs a code".to_string())
            } else {
                Ok(BrowseCommand::Query(CatalogQuery::from_input(rest, true)))
            }
        }
        "categories" => Ok(BrowseCommand::Categories),
        "category" | "c" => Ok(BrowseCommand::Category(CategoryFilter::from_selection(rest))),
        "sort" => rest
            .parse::<SortKey>()
            .map(BrowseCommand::Sort)
            .map_err(|err| err.to_string()),
        "more" | "m" => Ok(BrowseCommand::More),
        "show" => parse_optional_position(rest).map(BrowseCommand::Show),
        "add" | "a" => parse_optional_position(rest).map(BrowseCommand::Add),
        "back" => Ok(BrowseCommand::Back),
        "cart" => Ok(BrowseCommand::Cart),
        "help" | "?" => Ok(BrowseCommand::Help),
        "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
        "" => Err(String::new()),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn parse_optional_position(raw: &str) -> Result<Option<usize>, String> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse_position(raw).map(Some)
    }
}

fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position - 1),
        _ => Err(format!("expected a product number, got '{raw}'")),
    }
}

pub async fn run(client: Arc<CatalogClient>) -> Result<()> {
    let mut events = client.subscribe_events();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let (outcome, _) = client.load_initial().await;
    let mut text = client
        .with_state(|state| render::query_result(state, outcome))
        .await;
    text.push_str(&drain_failures(&mut events));
    text.push_str("type 'help' for commands\n");
    stdout.write_all(text.as_bytes()).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                if !message.is_empty() {
                    stdout.write_all(format!("{message}\n").as_bytes()).await?;
                }
                continue;
            }
        };
        debug!(?command, "browse: command");
        if command == BrowseCommand::Quit {
            break;
        }

        let mut text = execute(&client, command).await;
        text.push_str(&drain_failures(&mut events));
        stdout.write_all(text.as_bytes()).await?;
    }

    Ok(())
}

async fn execute(client: &CatalogClient, command: BrowseCommand) -> String {
    match command {
        BrowseCommand::Query(query) => {
            let outcome = client.submit(query).await;
            client
                .with_state(|state| {
                    state.close_detail();
                    render::query_result(state, outcome)
                })
                .await
        }
        BrowseCommand::Categories => {
            if client.with_state(|state| state.categories().is_empty()).await {
                client.refresh_categories().await;
            }
            client
                .with_state(|state| render::categories(state.categories()))
                .await
        }
        BrowseCommand::Category(filter) => {
            client
                .with_state(|state| {
                    state.select_category(filter);
                    render::catalog(state)
                })
                .await
        }
        BrowseCommand::Sort(key) => {
            client
                .with_state(|state| {
                    state.select_sort(key);
                    render::catalog(state)
                })
                .await
        }
        BrowseCommand::More => {
            client
                .with_state(|state| {
                    state.load_more();
                    render::catalog(state)
                })
                .await
        }
        BrowseCommand::Show(None) => {
            client
                .with_state(|state| match state.detail() {
                    Some(detail) => render::detail(&detail),
                    None => "no product is open\n".to_string(),
                })
                .await
        }
        BrowseCommand::Show(Some(index)) => {
            client
                .with_state(|state| {
                    let key = state.visible_product(index).map(|product| product.key.clone());
                    match key.and_then(|key| state.open_detail_by_key(&key)) {
                        Some(detail) => render::detail(&detail),
                        None => format!("no product #{}\n", index + 1),
                    }
                })
                .await
        }
        BrowseCommand::Add(index) => {
            client
                .with_state(|state| {
                    let key = match index {
                        Some(index) => state.visible_product(index),
                        None => state.selected_product(),
                    }
                    .map(|product| product.key.clone());
                    let Some(key) = key else {
                        return "nothing to add\n".to_string();
                    };
                    let name = state.find(&key).map(|product| product.name.clone());
                    match (name, state.add_key_to_cart(&key)) {
                        (Some(name), Some(quantity)) => format!(
                            "added {name} (x{quantity}), cart: {}\n",
                            state.cart().total_quantity()
                        ),
                        _ => "nothing to add\n".to_string(),
                    }
                })
                .await
        }
        BrowseCommand::Back => {
            client
                .with_state(|state| {
                    state.close_detail();
                    render::catalog(state)
                })
                .await
        }
        BrowseCommand::Cart => client.with_state(|state| render::cart(state.cart())).await,
        BrowseCommand::Help => HELP.to_string(),
        BrowseCommand::Quit => String::new(),
    }
}

fn drain_failures(events: &mut broadcast::Receiver<CatalogEvent>) -> String {
    let mut out = String::new();
    while let Ok(event) = events.try_recv() {
        if let CatalogEvent::FetchFailed { operation, error } = event {
            out.push_str(&format!("{operation} failed: {}\n", error.message));
        }
    }
    out
}
