//! Lot-size calculator.
//!
//! Runs the terminal UI by default; subcommands expose the catalog and the
//! sizing engine for scripting.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lotsizer::config::{AppConfig, fetch_config};
use lotsizer::sizing::breakdown::render_breakdown;
use lotsizer::tui::{self, App};
use lotsizer::{
    Catalog, InstrumentDefinition, InstrumentStore, JsonFileStore, LotsizerError, Result,
    RiskBudget, RoundingPolicy, SaveStatus, TradingParameters, calculate,
};

/// Position-sizing calculator for leveraged instruments.
#[derive(Parser)]
#[command(name = "lotsizer", version)]
#[command(about = "Size trades from a risk budget and a stop-loss distance", long_about = None)]
struct Cli {
    /// Instrument store file (overrides LOTSIZER_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Rounding policy: floored or unrounded (overrides LOTSIZER_ROUNDING)
    #[arg(long, global = true)]
    rounding: Option<RoundingPolicy>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive calculator (default)
    Tui {
        /// Instrument selected at startup
        #[arg(short, long)]
        instrument: Option<String>,
    },

    /// List all instruments
    List,

    /// Show one instrument
    Show {
        /// Instrument name
        name: String,
    },

    /// Add or replace a custom instrument
    Add {
        name: String,
        /// Dollar cost per unit of price movement
        cost: Decimal,
        /// Unit-to-volume conversion factor
        conversion: Decimal,
        /// Standard lot size
        lot: Decimal,
    },

    /// Change an instrument's cost per unit and conversion factor
    Edit {
        name: String,
        cost: Decimal,
        conversion: Decimal,
    },

    /// Delete a custom instrument or reset a modified default
    Remove {
        name: String,
    },

    /// Calculate a recommended volume
    Calc(CalcArgs),
}

#[derive(Args)]
struct CalcArgs {
    /// Instrument whose economics are used
    #[arg(short, long)]
    instrument: String,

    /// Stop-loss distance in points
    #[arg(short, long)]
    stop_loss: Decimal,

    /// Account capital in dollars
    #[arg(long, requires = "risk_pct", conflicts_with = "risk_amount")]
    capital: Option<Decimal>,

    /// Percentage of capital to risk
    #[arg(long, requires = "capital")]
    risk_pct: Option<Decimal>,

    /// Fixed dollar amount to risk
    #[arg(long, required_unless_present = "capital")]
    risk_amount: Option<Decimal>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = fetch_config()?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(rounding) = cli.rounding {
        config.rounding = rounding;
    }

    let command = cli.command.unwrap_or(Commands::Tui { instrument: None });
    match command {
        Commands::Tui { .. } => init_file_logging(&config.log_file)?,
        _ => init_stderr_logging(),
    }

    let store: Box<dyn InstrumentStore> = Box::new(JsonFileStore::new(&config.store_path));
    let mut catalog = Catalog::with_builtin_defaults(store);

    match command {
        Commands::Tui { instrument } => {
            let initial = instrument.unwrap_or_else(|| config.default_instrument.clone());
            let mut app = App::new(catalog, config.rounding, &initial);
            tui::run(&mut app)?;
        }
        Commands::List => {
            for entry in catalog.entries() {
                println!(
                    "{:<10} {:<9} {}",
                    entry.definition.name,
                    entry.provenance.label(),
                    describe(&entry.definition)
                );
            }
        }
        Commands::Show { name } => {
            let def = catalog.resolve(&name)?;
            println!("{}", serde_json::to_string_pretty(def)?);
        }
        Commands::Add {
            name,
            cost,
            conversion,
            lot,
        } => {
            let status = catalog.add(InstrumentDefinition::new(name.clone(), cost, conversion, lot))?;
            report(&format!("added {name}"), status, &config)?;
        }
        Commands::Edit {
            name,
            cost,
            conversion,
        } => {
            let status = catalog.edit_numeric_fields(&name, cost, conversion)?;
            report(&format!("updated {name}"), status, &config)?;
        }
        Commands::Remove { name } => {
            let status = catalog.remove(&name);
            report(&format!("removed override for {name}"), status, &config)?;
        }
        Commands::Calc(args) => run_calc(&catalog, &args, config.rounding)?,
    }

    Ok(())
}

fn run_calc<S: InstrumentStore>(
    catalog: &Catalog<S>,
    args: &CalcArgs,
    policy: RoundingPolicy,
) -> Result<()> {
    let instrument = catalog.resolve(&args.instrument)?;
    let risk = RiskBudget::from_parts(args.capital, args.risk_pct, args.risk_amount)?;

    let params = TradingParameters::for_instrument(risk, args.stop_loss, instrument);
    let Some(result) = calculate(&params, policy)? else {
        return Err(LotsizerError::Usage(
            "all amounts must be positive and risk at most 100%".to_string(),
        ));
    };

    println!("{}: {}", instrument.name, describe(instrument));
    for line in render_breakdown(&result, &params) {
        println!("{line}");
    }
    Ok(())
}

fn describe(def: &InstrumentDefinition) -> String {
    format!(
        "${}/point, conversion {}, lot {}",
        def.dollar_cost_per_unit.normalize(),
        def.unit_to_volume_conversion.normalize(),
        def.standard_lot_size.normalize()
    )
}

/// Prints the outcome of a catalog mutation.
fn report(label: &str, status: SaveStatus, config: &AppConfig) -> Result<()> {
    match status {
        SaveStatus::Saved => {
            info!(path = %config.store_path.display(), "{label}");
            println!("{label}");
            Ok(())
        }
        SaveStatus::Unchanged => {
            println!("nothing to change");
            Ok(())
        }
        SaveStatus::Failed(reason) => Err(LotsizerError::Store(reason)),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Logs to a file so the alternate screen stays clean.
fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir).map_err(|e| LotsizerError::Io(e.to_string()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LotsizerError::Io(format!("cannot open log file {}: {e}", path.display())))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
