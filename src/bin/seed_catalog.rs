use std::path::PathBuf;

use anyhow::Context;
use calamine::open_workbook_auto;
use clap::Parser;
use site_survey_api::{config, db, services::catalog_import};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "seed-catalog",
    about = "Load regions, municipalities and master items from the master workbook",
    version
)]
struct Cli {
    #[arg(help = "Path to the master workbook (.xlsx)")]
    workbook: PathBuf,
    #[arg(
        long,
        help = "Delete each region's existing master items before inserting"
    )]
    replace_items: bool,
    #[arg(long, help = "Run pending migrations first")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let mut workbook = open_workbook_auto(&cli.workbook)
        .with_context(|| format!("failed to open {}", cli.workbook.display()))?;
    let catalog = catalog_import::read_catalog(&mut workbook)?;
    for sheet in &catalog.missing_sheets {
        warn!(sheet = %sheet, "Skipped missing sheet");
    }

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    if cli.migrate || cfg.auto_migrate {
        db::run_migrations(&pool).await?;
    }

    let summary = catalog_import::seed_catalog(&pool, &catalog, cli.replace_items).await?;
    info!(
        regions = summary.regions,
        municipalities = summary.municipalities,
        items = summary.items,
        "Catalog seeded"
    );
    println!(
        "Seeded {} regions, {} municipalities, {} master items",
        summary.regions, summary.municipalities, summary.items
    );

    db::close_pool(pool).await?;
    Ok(())
}
