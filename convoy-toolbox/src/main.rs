use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod chain;
pub mod create;
pub mod inspect;

#[derive(Debug, Parser)]
#[command(name = "ntc-toolbox", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Create {
        #[arg(
            value_name = "NAME",
            short,
            long,
            required = true,
            help = "Container name; written under containers/NAME.ntc in the data dir"
        )]
        name: String,

        #[arg(
            value_name = "ENTRIES",
            short,
            long,
            default_value = "100",
            help = "Number of demo entries to write"
        )]
        entries: u64,

        #[arg(
            value_name = "CLUSTER_SIZE",
            short,
            long,
            default_value = "50",
            help = "Entries per cluster"
        )]
        cluster_size: u64,
    },
    Inspect {
        #[arg(
            value_name = "NAME",
            short,
            long,
            required = true,
            help = "Name of a container under containers/"
        )]
        name: String,
    },
    Head {
        #[arg(
            value_name = "NAME",
            short,
            long,
            required = true,
            help = "Name of a container under containers/"
        )]
        name: String,

        #[arg(
            value_name = "ENTRIES",
            short,
            long,
            default_value = "10",
            help = "Number of entries to print"
        )]
        entries: u64,
    },
    Chain {
        #[arg(
            value_name = "GLOB",
            short,
            long,
            required = true,
            help = "Glob over container directories under containers/ in the data dir"
        )]
        glob: String,

        #[arg(value_name = "FIELD", short, long, help = "Print only this field")]
        field: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Create {
            name,
            entries,
            cluster_size,
        } => create::create(name, entries, cluster_size).await,
        Commands::Inspect { name } => inspect::inspect(name).await,
        Commands::Head { name, entries } => inspect::head(name, entries).await,
        Commands::Chain { glob, field } => chain::chain(glob, field).await,
    }
}

fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| convoy_config::CONFIG.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
