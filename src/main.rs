// Entrypoint for the importer.
// - Parses the outline before touching the network, so a broken file
//   never results in a partial import.
// - Returns `anyhow::Result`: any input or transport error ends the run
//   with a non-zero exit code.

use anyhow::Result;
use clap::Parser;
use opml_import::api::ReaderClient;
use opml_import::importer::{import_entries, Mode};
use opml_import::opml::{read_outline_file, Outline};
use opml_import::{logging, ui};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "opml-import")]
#[command(about = "Replay OPML subscriptions against a Google Reader compatible service", long_about = None)]
struct Cli {
    /// OPML file to import
    opml_file: PathBuf,
    /// Base URL of the reader service
    server: String,
    /// Account to log in with; enables authenticated mode
    username: Option<String>,
    /// Account password; prompted for when omitted
    #[arg(requires = "username")]
    password: Option<String>,
}

fn main() -> Result<()> {
    logging::configure_logging();
    let cli = Cli::parse();

    let text = read_outline_file(&cli.opml_file)?;
    let outline = Outline::parse(&text)?;

    let mut api = ReaderClient::new(&cli.server)?;
    let mode = match &cli.username {
        Some(username) => {
            let password = match cli.password {
                Some(password) => password,
                None => ui::prompt_password(username)?,
            };
            let header = api.client_login(username, &password)?;
            api.set_auth(&header)?;
            info!(server = api.base_url(), "logged in");
            Mode::WithAuth
        }
        None => Mode::WithoutAuth,
    };

    let spinner = ui::import_spinner();
    let result = import_entries(&api, outline.entries(), mode, |entry| {
        spinner.inc(1);
        spinner.set_message(entry.url.clone());
    });
    match result {
        Ok(summary) => {
            spinner.finish_with_message(format!("Imported {} feeds", summary.feeds));
            info!(feeds = summary.feeds, requests = summary.requests, "import finished");
            Ok(())
        }
        Err(e) => {
            spinner.abandon();
            Err(e)
        }
    }
}
