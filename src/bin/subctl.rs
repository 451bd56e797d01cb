use std::path::PathBuf;

use clap::{value_parser, Arg, Command};

use subforum::models::{NewSub, SingleConnection};
use subforum::views::{self, Schema};
use subforum::{Config, Result};

fn main_res() -> Result<()> {
    let matches = Command::new("subctl")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Control a subforum server")
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
        .subcommand(
            Command::new("create-sub")
                .about("Create a new sub")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("The unique name of the sub")
                        .required(true)
                        .num_args(1),
                )
                .arg(
                    Arg::new("description")
                        .short('d')
                        .long("description")
                        .help("The description of the sub")
                        .required(true)
                        .num_args(1),
                ),
        )
        .subcommand(Command::new("list-subs").about("List all subs as JSON"))
        .subcommand(
            Command::new("stats").about("Count the subs, posts and comments"),
        )
        .subcommand(
            Command::new("check-config")
                .about("Check configuration file for errors"),
        )
        .subcommand(
            Command::new("generate-config")
                .about("Print a config file with the default values"),
        )
        .get_matches();

    if matches.subcommand_matches("generate-config").is_some() {
        return Config::generate(std::io::stdout());
    }

    let conf_path = matches.get_one::<PathBuf>("config");
    let mut config = Config::load(conf_path)?;

    if let Some(url) = matches.get_one::<String>("database-url") {
        config.database_url = url.to_owned();
    }

    if matches.subcommand_matches("check-config").is_some() {
        // We've already loaded the config file, so we know it's good.

        match conf_path {
            Some(path) => println!("Configuration: {}", path.display()),
            None if Config::default_path().exists() => {
                println!("Configuration: {}", Config::default_path().display())
            }
            None => println!("No configuration file, using defaults."),
        }

        println!("\nAll config files are good.");

        return Ok(());
    }

    let mut db = SingleConnection::establish(&config.database_url)?;

    if let Some(matches) = matches.subcommand_matches("create-sub") {
        let sub = db.insert_sub(NewSub {
            name: matches.get_one::<String>("name").unwrap().to_owned(),
            description: matches
                .get_one::<String>("description")
                .unwrap()
                .to_owned(),
        })?;

        println!("{}", serde_json::to_string_pretty(&sub.view())?);
    }

    if matches.subcommand_matches("list-subs").is_some() {
        let subs = db.all_subs()?;

        println!("{}", serde_json::to_string_pretty(&views::many(&subs).0)?);
    }

    if matches.subcommand_matches("stats").is_some() {
        println!(
            "{} subs, {} posts, {} comments",
            db.num_subs()?,
            db.num_posts()?,
            db.num_comments()?
        );
    }

    Ok(())
}

fn main() {
    if let Err(e) = main_res() {
        eprintln!("{}", e);
        std::process::exit(-1);
    }
}
