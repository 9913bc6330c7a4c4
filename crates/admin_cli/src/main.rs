use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, MoneyCents, SnapshotStore};

#[derive(Parser, Debug)]
#[command(name = "depogaz_admin")]
#[command(about = "Admin utilities for Depogaz (bootstrap catalog/drivers, snapshot maintenance)")]
struct Cli {
    /// Snapshot data file (also read from `DEPOGAZ_DATA`).
    #[arg(long, env = "DEPOGAZ_DATA", default_value = "./depogaz.json")]
    data_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    BottleType(BottleType),
    Driver(Driver),
    Snapshot(SnapshotCmd),
    Stock(Stock),
}

#[derive(Args, Debug)]
struct BottleType {
    #[command(subcommand)]
    command: BottleTypeCommand,
}

#[derive(Subcommand, Debug)]
enum BottleTypeCommand {
    Create(BottleTypeCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct BottleTypeCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    capacity: String,
    /// Unit price in euros, e.g. "50" or "49,90".
    #[arg(long)]
    unit_price: String,
    #[arg(long, default_value_t = 0)]
    total_quantity: u32,
}

#[derive(Args, Debug)]
struct Driver {
    #[command(subcommand)]
    command: DriverCommand,
}

#[derive(Subcommand, Debug)]
enum DriverCommand {
    Create(DriverCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct DriverCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    truck: Option<String>,
}

#[derive(Args, Debug)]
struct SnapshotCmd {
    #[command(subcommand)]
    command: SnapshotCommand,
}

#[derive(Subcommand, Debug)]
enum SnapshotCommand {
    /// Print the full snapshot as JSON.
    Export,
    /// Replace the whole state from a JSON snapshot file.
    Import(SnapshotImportArgs),
}

#[derive(Args, Debug)]
struct SnapshotImportArgs {
    #[arg(long)]
    input: String,
}

#[derive(Args, Debug)]
struct Stock {
    #[command(subcommand)]
    command: StockCommand,
}

#[derive(Subcommand, Debug)]
enum StockCommand {
    /// Show per-type catalog counters and pool quantities.
    Show,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = SnapshotStore::new(&cli.data_file);
    let mut engine = Engine::builder().store(store).build()?;

    match cli.command {
        Command::BottleType(cmd) => match cmd.command {
            BottleTypeCommand::Create(args) => {
                let unit_price: MoneyCents = args.unit_price.parse()?;
                let id = engine.create_bottle_type(
                    &args.name,
                    &args.capacity,
                    unit_price,
                    args.total_quantity,
                )?;
                println!("created bottle type {id}");
            }
            BottleTypeCommand::List => {
                for bottle_type in engine.bottle_types() {
                    println!(
                        "{}  {}  {}  total={} distributed={} remaining={}",
                        bottle_type.id,
                        bottle_type.name,
                        bottle_type.unit_price,
                        bottle_type.total_quantity,
                        bottle_type.distributed_quantity,
                        bottle_type.remaining_quantity,
                    );
                }
            }
        },
        Command::Driver(cmd) => match cmd.command {
            DriverCommand::Create(args) => {
                let id = engine.create_driver(&args.name, args.truck.as_deref())?;
                println!("created driver {id}");
            }
            DriverCommand::List => {
                for driver in engine.drivers() {
                    let held: u32 = driver.remaining_bottles.values().sum();
                    println!(
                        "{}  {}  truck={}  holding {held} bottles",
                        driver.id,
                        driver.name,
                        driver.truck.as_deref().unwrap_or("-"),
                    );
                }
            }
        },
        Command::Snapshot(cmd) => match cmd.command {
            SnapshotCommand::Export => {
                let snapshot = engine.export_snapshot();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            SnapshotCommand::Import(args) => {
                let raw = std::fs::read_to_string(&args.input)?;
                engine.import_snapshot(serde_json::from_str(&raw)?)?;
                println!("imported snapshot from {}", args.input);
            }
        },
        Command::Stock(cmd) => match cmd.command {
            StockCommand::Show => {
                for bottle_type in engine.bottle_types() {
                    let empty = engine
                        .empty_stock()
                        .iter()
                        .find(|e| e.bottle_type_id == bottle_type.id)
                        .map_or(0, |e| e.quantity);
                    let defective = engine
                        .defective_stock()
                        .iter()
                        .find(|e| e.bottle_type_id == bottle_type.id)
                        .map_or(0, |e| e.quantity);
                    println!(
                        "{}  remaining={} distributed={} empty={} defective={}",
                        bottle_type.name,
                        bottle_type.remaining_quantity,
                        bottle_type.distributed_quantity,
                        empty,
                        defective,
                    );
                }
            }
        },
    }

    Ok(())
}
