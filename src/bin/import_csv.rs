// Command-line ingredient import: runs the same import as `POST /ingredients/import`
// against a database file and prints the JSON response.
//
// Usage:
//   cargo run --bin import_csv -- <csv_path> [db_path]
//
// Exit code is 0 on success, 1 on a structural or aborted import.

use anyhow::{bail, Context};
use formula_inventory::app::{get_default_db_path, AppState};
use formula_inventory::logging;
use serde_json::json;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(csv_path) = args.next().map(PathBuf::from) else {
        bail!("usage: import_csv <csv_path> [db_path]");
    };
    let db_path = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match state.import_api.import_ingredients_from_path(csv_path).await {
        Ok(response) => {
            let out = serde_json::to_string_pretty(&response).context("failed to encode response")?;
            println!("{}", out);
            Ok(())
        }
        Err(e) => {
            let out = json!({ "error": e.to_string() });
            println!("{}", out);
            std::process::exit(1);
        }
    }
}
