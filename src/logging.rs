//! Logging setup.

use fern::colors::{Color, ColoredLevelConfig};

use log::LevelFilter;

use crate::{Config, Error, Result};

/// Start logging to stderr, and to the log file if one is configured.
pub fn init(config: &Config) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    let stderr = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} {:5} [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(config.log_level)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("rocket::server", LevelFilter::Warn)
        .chain(stderr);

    if let Some(ref path) = config.log_file {
        let msg = format!("Couldn't open log file at {}", path.display());
        let file = fern::log_file(path).map_err(|err| Error::from_io_error(err, msg))?;

        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} {} [{}] {}",
                        chrono::Utc::now().to_rfc3339(),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    dispatch.apply()?;

    Ok(())
}
