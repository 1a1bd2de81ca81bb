//! # deskrep-cli: service-catalog report exporter
//!
//! The operator front end: log in against a helpdesk tenant, browse the
//! report-card catalog, and export a Service Request report as a
//! two-sheet spreadsheet.

mod cards;
mod session;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use deskrep::auth::Session;
use deskrep::{build_report, CatalogLookup, NameCache, Report, TracingSink};
use deskrep_client::FreshserviceClient;
use session::FileSessionStore;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to a helpdesk tenant and store the session
    Login(LoginArgs),
    /// Drop the stored session
    Logout,
    /// List the available report cards
    Cards,
    /// Filter report cards by a substring of their name or description
    Search(SearchArgs),
    /// Build the Service Request report and export it as a spreadsheet
    Report(ReportArgs),
}

#[derive(Parser, Debug)]
struct LoginArgs {
    /// Tenant subdomain, e.g. `acme` for acme.freshservice.com
    #[arg(long, env = "DESKREP_DOMAIN")]
    domain: String,
    /// Tenant API key
    #[arg(long, env = "DESKREP_API_KEY")]
    api_key: String,
}

#[derive(Parser, Debug)]
struct SearchArgs {
    query: String,
}

#[derive(Parser, Debug)]
struct ReportArgs {
    /// Display id of the service request
    display_id: u64,
    /// File name stem for the spreadsheet (defaults to `<name>_<id>`)
    #[arg(long)]
    out: Option<String>,
    /// Build and print the report without writing a spreadsheet
    #[arg(long)]
    no_export: bool,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Log to a file so stdout stays clean for the tables.
    let log_file = File::create("deskrep-cli.log")?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(Arc::new(log_file))
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let store = FileSessionStore::open_default()?;

    match cli.command {
        Commands::Login(args) => handle_login(&store, args).await,
        Commands::Logout => {
            store.clear()?;
            println!("Session cleared.");
            Ok(())
        }
        Commands::Cards => {
            print_cards(cards::ALL_CARDS.iter().collect());
            Ok(())
        }
        Commands::Search(args) => {
            let matches = cards::search_cards(&args.query);
            if matches.is_empty() {
                println!("No report cards match '{}'.", args.query);
            } else {
                print_cards(matches);
            }
            Ok(())
        }
        Commands::Report(args) => handle_report(&store, args).await,
    }
}

// --- Command Handlers ---

async fn handle_login(store: &FileSessionStore, args: LoginArgs) -> Result<()> {
    let mut session = Session::new(args.domain, args.api_key);
    let client = FreshserviceClient::new(&session.credentials())?;

    // Verify the credentials by listing workspaces; keep the list so
    // report runs can seed their cache with it.
    let workspaces = client
        .list_workspaces()
        .await
        .context("could not verify the credentials against the tenant")?;
    if workspaces.is_empty() {
        bail!("the tenant returned no workspaces; check the domain and API key");
    }

    info!(count = workspaces.len(), "login verified");
    println!("Connected to {}.freshservice.com", session.domain);
    println!("Workspaces:");
    for workspace in &workspaces {
        println!("  {} - {}", workspace.id, workspace.name);
    }

    session.workspaces = workspaces;
    store.save(&session)?;
    Ok(())
}

async fn handle_report(store: &FileSessionStore, args: ReportArgs) -> Result<()> {
    let Some(session) = store.valid_session() else {
        bail!("Session expired or invalid. Run `deskrep login` to reconnect.");
    };
    if args.display_id == 0 {
        bail!("the display id must be a positive number");
    }

    let client = FreshserviceClient::new(&session.credentials())?;

    // Seed the name cache with the workspaces fetched at login, tagged so
    // they stay listable by kind.
    let mut cache = NameCache::new();
    for workspace in &session.workspaces {
        cache.put(workspace.id, workspace.name.as_str(), Some("workspace"));
    }

    let sink = TracingSink;
    let report = build_report(args.display_id, &client, &mut cache, &sink).await?;
    print_report(&report);

    if !args.no_export {
        let stem = args.out.unwrap_or_else(|| report.export_file_stem());
        let path = deskrep_xlsx::write_report(&report.default_rows, &report.custom_rows, &stem)?;
        println!("\nSaved {}", path.display());
    }
    Ok(())
}

// --- Output ---

fn print_cards(cards: Vec<&cards::ReportCard>) {
    for card in cards {
        println!("[{}] {} ({})", card.id, card.name, card.file_type);
        println!("    {}", card.description);
        println!("    tags: {}", card.tags.join(", "));
    }
}

fn print_report(report: &Report) {
    println!("SR Name: {}", report.item.name);
    println!("Display ID: {}", report.item.display_id);
    println!("Short Description: {}", report.item.short_description);
    println!();

    println!("Default fields:");
    for row in &report.default_rows {
        let mandatory = row
            .mandatory
            .map(|flag| flag.to_string())
            .unwrap_or_default();
        println!(
            "  {:<45} | {:<12} | {}",
            row.label,
            mandatory,
            row.value.replace('\n', " / ")
        );
    }

    println!();
    println!("Custom fields:");
    for row in &report.custom_rows {
        let mut line = format!("  {:<30} | {:<25} | {}", row.label, row.name, row.field_type);
        if !row.drop_down_values.is_empty() {
            line.push_str(&format!(" | choices: {}", row.drop_down_values));
        }
        if !row.dependent_fields.is_empty() {
            line.push_str(&format!(
                " | shown for {} = {}",
                row.dependent_fields, row.dependent_field_value
            ));
        }
        println!("{line}");
    }
}
