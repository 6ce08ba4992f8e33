use std::path::PathBuf;

use clap::Parser;

use media_import::db::ServerEndpoint;
use media_import::{ImportConfig, ImportError, ImportLog, MediaImporter, SourceFiles};

#[derive(Parser, Debug)]
#[command(
    name = "import_media",
    about = "Load products, customers and rentals CSV files into the media database"
)]
struct Args {
    /// Directory holding the CSV files.
    directory: PathBuf,

    /// Products file name, relative to the directory.
    #[arg(long, default_value = "products.csv")]
    products: PathBuf,

    /// Customers file name, relative to the directory.
    #[arg(long, default_value = "customers.csv")]
    customers: PathBuf,

    /// Rentals file name, relative to the directory.
    #[arg(long, default_value = "rentals.csv")]
    rentals: PathBuf,

    /// Database host (overrides MEDIA_DB_HOST).
    #[arg(long)]
    host: Option<String>,

    /// Database port (overrides MEDIA_DB_PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Logical database (overrides MEDIA_DB_NAME).
    #[arg(long)]
    database: Option<String>,

    /// Import log file (overrides MEDIA_IMPORT_LOG_FILE).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let mut config = ImportConfig::from_env();
    if args.host.is_some() || args.port.is_some() {
        config.endpoint = ServerEndpoint::new(
            args.host.unwrap_or(config.endpoint.host),
            args.port.unwrap_or(config.endpoint.port),
        );
    }
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = log_file;
    }

    let import_log =
        ImportLog::to_file(&config.log_file, config.log_level).map_err(|source| {
            ImportError::Log {
                path: config.log_file.clone(),
                source,
            }
        })?;

    log::info!(
        "importing {} into {}/{}",
        args.directory.display(),
        config.endpoint,
        config.database
    );

    let importer = MediaImporter::from_config(&config, &import_log);
    let files = SourceFiles::new(args.products, args.customers, args.rentals);
    let report = importer.import(&args.directory, &files)?;

    let ((products, customers, rentals), failures) = report.clone().into_summary();
    println!("{}", report);
    println!("({products}, {customers}, {rentals}), {failures}");

    if failures > 0 {
        log::warn!(
            "{} insert(s) not acknowledged; see {}",
            failures,
            config.log_file.display()
        );
    }

    Ok(())
}
