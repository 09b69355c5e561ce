//! planner-import: 从 CSV 批量导入信用卡或礼品卡
//!
//! ```text
//! planner-import credit-cards --user <subject> --file cards.csv
//! planner-import gift-cards --user <subject> --file gift_cards.csv --dry-run
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::fs::File;
use std::path::PathBuf;

use card_planner::{
    config::Config,
    database::{create_pool, run_migrations},
    models::{CreateCreditCardRequest, CreateGiftCardRequest},
    services::{ImportService, UserService, parse_credit_cards_csv, parse_gift_cards_csv},
    utils::format_cents,
};

#[derive(Parser, Debug)]
#[command(name = "planner-import")]
#[command(about = "Import credit cards or gift cards from a CSV file", long_about = None)]
struct Cli {
    /// Database connection string (overrides config.toml / DATABASE_URL)
    #[arg(long, value_name = "URL", env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// issuer,name,last_four,annual_fee,base_rate,bonus_categories
    CreditCards(ImportArgs),
    /// merchant,card_number,balance,expires_on
    GiftCards(ImportArgs),
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// User subject the rows belong to
    #[arg(long, value_name = "USER_ID")]
    user: String,

    /// CSV file with a header row
    #[arg(long, value_name = "FILE")]
    file: PathBuf,

    /// Only parse and validate the file
    #[arg(long)]
    dry_run: bool,
}

enum Parsed {
    CreditCards(Vec<CreateCreditCardRequest>),
    GiftCards(Vec<CreateGiftCardRequest>),
}

fn open_csv(args: &ImportArgs) -> Result<File> {
    File::open(&args.file).with_context(|| format!("Failed to open {}", args.file.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let (kind, args, parsed) = match &cli.command {
        Command::CreditCards(args) => (
            "credit-cards",
            args,
            Parsed::CreditCards(parse_credit_cards_csv(open_csv(args)?)?),
        ),
        Command::GiftCards(args) => (
            "gift-cards",
            args,
            Parsed::GiftCards(parse_gift_cards_csv(open_csv(args)?)?),
        ),
    };

    if args.dry_run {
        match &parsed {
            Parsed::CreditCards(rows) => {
                let fees: i64 = rows.iter().map(|r| r.annual_fee_cents).sum();
                println!(
                    "{} credit cards parsed, {} in annual fees",
                    rows.len(),
                    format_cents(fees)
                );
            }
            Parsed::GiftCards(rows) => {
                let balance: i64 = rows.iter().map(|r| r.balance_cents).sum();
                println!(
                    "{} gift cards parsed, {} total balance",
                    rows.len(),
                    format_cents(balance)
                );
            }
        }
        return Ok(());
    }

    let config = Config::load(cli.database_url.clone())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let user = UserService::new(pool.clone()).ensure_user(&args.user).await?;
    let import_service = ImportService::new(pool);

    let summary = match parsed {
        Parsed::CreditCards(rows) => import_service.import_credit_cards(user.id, rows).await?,
        Parsed::GiftCards(rows) => import_service.import_gift_cards(user.id, rows).await?,
    };

    println!(
        "{kind}: {} imported, {} skipped (already present)",
        summary.imported, summary.skipped
    );
    Ok(())
}
