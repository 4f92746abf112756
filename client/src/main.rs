use anyhow::{Context, Result};
use banx_client::{
    config::Config,
    contract::{ApartmentParams, BookingRequest},
    service::MarketplaceService,
    state::AppState,
};
use banx_common::{config::VERSION, logger::setup_logger, time::millis_to_day};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use serde_json::json;
use std::{fs::File, io::Write, path::Path, sync::Arc};

#[derive(Parser)]
#[clap(
    version = VERSION,
    about = "DappBanX - Browse, book and manage apartments of the DappBanX marketplace contract"
)]
struct Cli {
    #[clap(flatten)]
    config: Config,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Args)]
struct ApartmentArgs {
    #[clap(long)]
    name: String,
    #[clap(long)]
    description: String,
    #[clap(long)]
    location: String,
    #[clap(long)]
    email: String,
    /// Image URI, repeat for several images
    #[clap(long = "image")]
    images: Vec<String>,
    #[clap(long)]
    rooms: u64,
    /// Nightly price, "0.25"
    #[clap(long)]
    price: String,
}

impl From<ApartmentArgs> for ApartmentParams {
    fn from(args: ApartmentArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            location: args.location,
            email: args.email,
            images: args.images,
            rooms: args.rooms,
            price: args.price,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List every apartment, newest first
    Apartments,
    /// Show one apartment
    Apartment { id: u64 },
    /// List the bookings of an apartment
    Bookings { id: u64 },
    /// List the unavailable nights of an apartment (ms timestamps)
    BookedDates { id: u64 },
    /// List the accounts allowed to review an apartment
    Reviewers { id: u64 },
    /// List the reviews of an apartment
    Reviews { id: u64 },
    /// Show the security fee percentage configured in the contract
    SecurityFee,
    /// Show the payment required for a number of nights
    Quote { id: u64, nights: u64 },
    /// Ask the wallet to authorize an account and show the active signer
    Connect,
    /// List a new apartment
    Create {
        #[clap(flatten)]
        apartment: ApartmentArgs,
    },
    /// Update an apartment
    Update {
        id: u64,
        #[clap(flatten)]
        apartment: ApartmentArgs,
    },
    /// Delete an apartment
    Delete { id: u64 },
    /// Book every night from check-in to check-out (YYYY-MM-DD, both included)
    Book {
        id: u64,
        check_in: NaiveDate,
        check_out: NaiveDate,
        /// Pay this exact amount instead of the quoted one
        #[clap(long)]
        amount: Option<String>,
    },
    /// Check in a booking
    CheckIn { id: u64, booking_id: u64 },
    /// Refund a booking
    Refund { id: u64, booking_id: u64 },
    /// Claim the funds of a booking
    Claim { id: u64, booking_id: u64 },
    /// Review an apartment
    Review { id: u64, comment: String },
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Error while serializing result")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    if let Some(path) = cli.config.config_file.as_ref() {
        if cli.config.generate_config_template {
            if Path::new(path).exists() {
                eprintln!("Config file already exists at {}", path);
                return Ok(());
            }

            let mut file = File::create(path).context("Error while creating config file")?;
            let json = serde_json::to_string_pretty(&cli.config)
                .context("Error while serializing config file")?;
            file.write_all(json.as_bytes())
                .context("Error while writing config file")?;
            println!("Config file template generated at {}", path);
            return Ok(());
        }

        let file = File::open(path).context("Error while opening config file")?;
        cli.config = serde_json::from_reader(file).context("Error while reading config file")?;
    } else if cli.config.generate_config_template {
        eprintln!("Provided config file path is required to generate the template with --config-file");
        return Ok(());
    }

    setup_logger(&cli.config.log.to_logger_settings()).context("Error while setting up logger")?;

    let Some(command) = cli.command else {
        eprintln!("No command provided, see --help");
        return Ok(());
    };

    if let Err(e) = run(&cli.config, command).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run(config: &Config, command: Command) -> Result<()> {
    let client_config = config
        .to_client_config()
        .context("Error while building client configuration")?;
    let factory = client_config.build_factory()?;
    let resolver = factory.get_resolver().clone();
    let service = MarketplaceService::new(factory, Arc::new(AppState::new()))
        .with_fee_policy(client_config.fee_policy);

    match command {
        Command::Apartments => print(&service.get_my_apartments().await?)?,
        Command::Apartment { id } => print(&service.get_apartment(id).await?)?,
        Command::Bookings { id } => print(&service.get_bookings(id).await?)?,
        Command::BookedDates { id } => {
            let dates: Vec<_> = service
                .get_booked_dates(id)
                .await?
                .into_iter()
                .map(|timestamp| {
                    json!({
                        "timestamp": timestamp,
                        "day": millis_to_day(timestamp).map(|day| day.to_string())
                    })
                })
                .collect();
            print(&dates)?
        }
        Command::Reviewers { id } => print(&service.get_qualified_reviewers(id).await?)?,
        Command::Reviews { id } => print(&service.get_reviews(id).await?)?,
        Command::SecurityFee => print(&json!({
            "securityFee": service.get_security_fee().await?
        }))?,
        Command::Quote { id, nights } => print(&json!({
            "aid": id,
            "nights": nights,
            "amount": service.quote_booking(id, nights).await?
        }))?,
        Command::Connect => {
            let signer = resolver.connect_wallet().await?;
            info!("Active signer: {:?}", signer);
            print(&json!({
                "address": signer.address(),
                "wallet": signer.is_wallet()
            }))?
        }
        Command::Create { apartment } => {
            print(&service.create_apartment(&apartment.into()).await?)?
        }
        Command::Update { id, apartment } => {
            print(&service.update_apartment(id, &apartment.into()).await?)?
        }
        Command::Delete { id } => print(&service.delete_apartment(id).await?)?,
        Command::Book {
            id,
            check_in,
            check_out,
            amount,
        } => {
            let receipt = match amount {
                Some(amount) => {
                    let request = BookingRequest {
                        aid: id,
                        timestamps: banx_client::booking::booking_timestamps(
                            check_in, check_out,
                        )?,
                        amount,
                    };
                    service.book_apartment(&request).await?
                }
                None => service.book_nights(id, check_in, check_out).await?,
            };
            print(&receipt)?
        }
        Command::CheckIn { id, booking_id } => {
            print(&service.check_in_apartment(id, booking_id).await?)?
        }
        Command::Refund { id, booking_id } => {
            print(&service.refund_booking(id, booking_id).await?)?
        }
        Command::Claim { id, booking_id } => print(&service.claim_funds(id, booking_id).await?)?,
        Command::Review { id, comment } => print(&service.add_review(id, &comment).await?)?,
    }

    Ok(())
}
