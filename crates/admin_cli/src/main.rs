use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{BudgetAggregate, CategoryGroup, Engine, InitializeBudgetCmd, Money, Reconciliation};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

mod prompt;

#[derive(Parser, Debug)]
#[command(name = "kantong_admin")]
#[command(about = "Admin utilities for Kantong (users and budgets)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./kantong.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Budget(Budget),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user and fund their budget. The password is prompted.
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// e.g. `1500000`, `1.500.000` or `Rp1.500.000`
    #[arg(long, default_value = "0")]
    initial_budget: Money,
}

#[derive(Args, Debug)]
struct Budget {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Print the budget and its drift from the category spends.
    Show(OwnerArgs),
    /// Set the total budget and category allocations.
    Initialize(BudgetInitializeArgs),
    /// Rebuild spends and balance from the ledger.
    Recompute(OwnerArgs),
}

#[derive(Args, Debug)]
struct OwnerArgs {
    #[arg(long)]
    owner: String,
}

#[derive(Args, Debug)]
struct BudgetInitializeArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    total: Money,
    /// `<category>=<amount>`, repeatable, e.g. `--allocate food=200.000`
    #[arg(long = "allocate", value_parser = parse_allocation)]
    allocations: Vec<(String, Money)>,
}

fn parse_allocation(raw: &str) -> Result<(String, Money), String> {
    let (name, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <category>=<amount>, got {raw}"))?;
    let amount = amount.parse::<Money>().map_err(|err| err.to_string())?;
    Ok((name.trim().to_string(), amount))
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_budget(aggregate: &BudgetAggregate) {
    println!("owner:    {}", aggregate.owner_id);
    println!("total:    {}", Money::new(aggregate.total_budget));
    println!("balance:  {}", Money::new(aggregate.current_balance));
    for group in CategoryGroup::ALL {
        println!("[{group}]");
        for entry in aggregate.categories.group(group) {
            println!(
                "  {:<20} allocated {:>14}  spent {:>14}  remaining {:>14}",
                entry.key.label(),
                Money::new(entry.allocated).to_string(),
                Money::new(entry.spent).to_string(),
                Money::new(entry.remaining()).to_string(),
            );
        }
    }
    if let Some(alert) = engine::critical_alert(aggregate) {
        println!("!! {}", alert.message);
    }
}

fn print_reconciliation(reconciliation: &Reconciliation) {
    print_budget(&reconciliation.aggregate);
    for warning in &reconciliation.warnings {
        println!("warning: {warning}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt::new_password()?;
            let aggregate = engine
                .register_user(&args.username, &password, args.initial_budget.minor())
                .await?;
            println!(
                "created user: {} (budget {})",
                args.username,
                Money::new(aggregate.total_budget)
            );
        }
        Command::Budget(Budget {
            command: BudgetCommand::Show(args),
        }) => {
            let aggregate = engine.budget(&args.owner).await?;
            print_budget(&aggregate);
            println!("drift:    {}", Money::new(aggregate.ledger_drift()));
        }
        Command::Budget(Budget {
            command: BudgetCommand::Initialize(args),
        }) => {
            let cmd = args
                .allocations
                .into_iter()
                .fold(InitializeBudgetCmd::new(args.total.minor()), |cmd, (name, amount)| {
                    cmd.allocate(name, amount.minor())
                });
            let reconciliation = engine.initialize_budget(&args.owner, cmd).await?;
            print_reconciliation(&reconciliation);
        }
        Command::Budget(Budget {
            command: BudgetCommand::Recompute(args),
        }) => {
            let before = engine.budget(&args.owner).await?;
            let reconciliation = engine.recompute_budget(&args.owner).await?;
            print_reconciliation(&reconciliation);
            println!(
                "balance {} -> {}",
                Money::new(before.current_balance),
                Money::new(reconciliation.aggregate.current_balance)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_argument() {
        assert_eq!(
            parse_allocation("food=200.000").unwrap(),
            ("food".to_string(), Money::new(200_000))
        );
        assert_eq!(
            parse_allocation("Self Reward = Rp50.000").unwrap(),
            ("Self Reward".to_string(), Money::new(50_000))
        );
        assert!(parse_allocation("food").is_err());
        assert!(parse_allocation("food=12.34").is_err());
    }

    #[test]
    fn cli_parses_budget_initialize() {
        let cli = Cli::try_parse_from([
            "kantong_admin",
            "budget",
            "initialize",
            "--owner",
            "alice",
            "--total",
            "1.000.000",
            "--allocate",
            "food=200.000",
            "--allocate",
            "transport=150000",
        ])
        .unwrap();
        let Command::Budget(Budget {
            command: BudgetCommand::Initialize(args),
        }) = cli.command
        else {
            panic!("expected budget initialize");
        };
        assert_eq!(args.total, Money::new(1_000_000));
        assert_eq!(args.allocations.len(), 2);
    }
}
