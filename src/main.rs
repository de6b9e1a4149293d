use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use shipkiosk::application::processor::PaymentProcessor;
use shipkiosk::config::SimulationConfig;
use shipkiosk::domain::card::{detect_card_type, validate_card_number};
use shipkiosk::domain::format::{format_amount, mask_card_number};
use shipkiosk::domain::money::Money;
use shipkiosk::domain::pricing::{ServiceTier, price, quote_all};
use shipkiosk::infrastructure::clock::SystemClock;
use shipkiosk::infrastructure::simulated::SimulatedBackend;
use shipkiosk::interfaces::csv::outcome_writer::{OutcomeRecord, OutcomeWriter};
use shipkiosk::interfaces::csv::payment_reader::PaymentRequestReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a package for one or every service tier
    Quote {
        /// Package weight in kilograms
        #[arg(long)]
        weight: Decimal,

        /// Service tier (overnight, 2day, ground). Omit to list all tiers.
        #[arg(long)]
        service: Option<ServiceTier>,
    },
    /// Detect the card network and run the Luhn check
    CheckCard {
        /// Card number, spaces allowed
        number: String,
    },
    /// Process a CSV batch of checkouts and print the outcomes as CSV
    Process {
        /// Input CSV: order,card_number,expiry,cvv,cardholder,service,weight
        input: PathBuf,

        /// Shortest simulated network delay
        #[arg(long, default_value_t = 1500)]
        min_delay_ms: u64,

        /// Longest simulated network delay
        #[arg(long, default_value_t = 2500)]
        max_delay_ms: u64,

        /// Probability that a valid charge is approved
        #[arg(long, default_value_t = 0.9)]
        success_rate: f64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Quote { weight, service } => {
            let quotes = match service {
                Some(tier) => vec![(tier, price(tier, weight))],
                None => quote_all(weight),
            };
            for (tier, amount) in quotes {
                println!("{},{}", tier, format_amount(amount));
            }
        }
        Command::CheckCard { number } => {
            let card = detect_card_type(&number).map_or("unknown", |card| card.name());
            println!("type: {card}");
            println!("luhn: {}", if validate_card_number(&number) { "valid" } else { "invalid" });
            println!("masked: {}", mask_card_number(&number));
        }
        Command::Process {
            input,
            min_delay_ms,
            max_delay_ms,
            success_rate,
        } => {
            let config = SimulationConfig::new(
                Duration::from_millis(min_delay_ms),
                Duration::from_millis(max_delay_ms),
                success_rate,
            )
            .into_diagnostic()?;
            let backend = SimulatedBackend::new(config).into_diagnostic()?;
            let processor = PaymentProcessor::new(Box::new(backend), Box::new(SystemClock));

            let file = File::open(input).into_diagnostic()?;
            let reader = PaymentRequestReader::new(file);
            let stdout = io::stdout();
            let mut writer = OutcomeWriter::new(stdout.lock());

            for request in reader.requests() {
                let request = match request {
                    Ok(request) => request,
                    Err(e) => {
                        warn!(error = %e, "skipping malformed payment request");
                        continue;
                    }
                };

                let amount: Money = price(request.service, request.weight);
                info!(order = %request.order, service = %request.service, %amount, "processing checkout");
                let outcome = processor
                    .process_payment(&request.payment_data(), amount)
                    .await;
                writer
                    .write(&OutcomeRecord::new(&request.order, &outcome))
                    .into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
    }

    Ok(())
}
