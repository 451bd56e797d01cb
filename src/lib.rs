//! A REST backend for sub-forums, the posts made on them, and the comments
//! made on posts.

#[macro_use]
extern crate diesel;

use std::time::Duration;

use rocket::{Build, Rocket};

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod schema;
pub mod views;

pub use config::Config;
pub use error::{Error, Result};

use crate::models::Database;
use crate::routes::cors::Cors;

/// Create a new server instance, opening the database and creating any
/// missing tables.
pub fn new_instance(config: Config) -> Result<Rocket<Build>> {
    let database = Database::open(
        &config.database_url,
        config.pool_size,
        Duration::from_millis(config.busy_timeout_ms),
        Duration::from_millis(config.pool_timeout_ms),
    )?;

    let figment = rocket::Config::figment()
        .merge(("address", &config.address))
        .merge(("port", config.port));

    Ok(rocket::custom(figment)
        .mount("/", routes::routes())
        .register("/", routes::catchers())
        .attach(Cors::new(config.allowed_origins.clone()))
        .manage(database))
}
