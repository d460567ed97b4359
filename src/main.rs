use std::path::Path;

use clap::{App, Arg};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sitedata::build;
use sitedata::config::Config;

fn main() {
    let matches = App::new("sitedata")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates series, archive, and sitemap data files for a static blog")
        .arg(
            Arg::with_name("directory")
                .help("Directory to search for the sitedata.yaml project file")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Output directory (defaults to the project's data directory)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Enables debug logging"),
        )
        .get_matches();

    init_logger(matches.is_present("verbose"));

    let directory = Path::new(matches.value_of("directory").unwrap_or("."));
    let output = matches.value_of("output").map(Path::new);

    let config = match Config::from_directory(directory, output) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = build::generate(&config) {
        tracing::error!("generating data files: {}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitedata=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitedata=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}
