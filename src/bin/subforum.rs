use std::path::PathBuf;

use clap::{value_parser, Arg, Command};

use log::info;

use subforum::{logging, new_instance, Config, Result};

async fn main_res() -> Result<()> {
    let matches = Command::new("subforum")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Serve the subforum REST API")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .num_args(1)
                .value_parser(value_parser!(PathBuf))
                .help("Config file to use"),
        )
        .arg(
            Arg::new("database-url")
                .short('u')
                .long("database-url")
                .value_name("URL")
                .num_args(1)
                .help("Path of the SQLite database to use"),
        )
        .get_matches();

    let mut config = Config::load(matches.get_one::<PathBuf>("config"))?;

    if let Some(url) = matches.get_one::<String>("database-url") {
        config.database_url = url.to_owned();
    }

    logging::init(&config)?;

    info!("Starting subforum {}", env!("CARGO_PKG_VERSION"));
    config.debug_log();

    new_instance(config)?.launch().await?;

    Ok(())
}

#[rocket::main]
async fn main() {
    if let Err(e) = main_res().await {
        eprintln!("{}", e);
        std::process::exit(-1);
    }
}
