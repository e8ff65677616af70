use fern::colors::{Color, ColoredLevelConfig};
use std::{env, str::FromStr, time::SystemTime};

use crate::config::env::Environment;

/// Installs the global logger. Reads `ENVIRONMENT` directly so it can run
/// before the rest of the configuration is loaded; `LOG_LEVEL` overrides the
/// default level of the environment.
pub fn setup() -> Result<(), log::SetLoggerError> {
    let environment = match env::var("ENVIRONMENT").as_deref() {
        Ok("prd") => Environment::Prd,
        _ => Environment::Dev,
    };
    let default_level = if environment.is_dev() {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };
    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| log::LevelFilter::from_str(&level).ok())
        .unwrap_or(default_level);

    let dispatch = if environment.is_dev() {
        let colors_line = ColoredLevelConfig::new()
            .error(Color::Red)
            .warn(Color::Yellow)
            .info(Color::White)
            .debug(Color::White)
            .trace(Color::BrightBlack);
        let colors_level = colors_line.info(Color::Green);

        fern::Dispatch::new().format(move |out, message, record| {
            out.finish(format_args!(
                "{color_line}[{date} {level} {target} {color_line}] {message}\x1B[0m",
                color_line = format_args!(
                    "\x1B[{}m",
                    colors_line.get_color(&record.level()).to_fg_str()
                ),
                date = humantime::format_rfc3339_seconds(SystemTime::now()),
                target = record.target(),
                level = colors_level.color(record.level()),
                message = message,
            ))
        })
    } else {
        fern::Dispatch::new().format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message,
            ))
        })
    };

    dispatch
        .level(level)
        // the HTTP stack is noisy at trace level
        .level_for("hyper", log::LevelFilter::Info)
        .level_for("tower_http", log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
