use std::str::FromStr;
use std::time::SystemTime;

use log::LevelFilter;

use crate::config::LoggingConfig;

/// installs the global logger. Unknown levels fall back to `info`.
///
/// Rocket and its dependencies are noisy at `info`, so they are capped at `warn`
pub fn init_logger(config: &LoggingConfig) -> Result<(), log::SetLoggerError> {
    let level = LevelFilter::from_str(&config.level).unwrap_or_else(|_| {
        eprintln!("Unknown log level {}, falling back to info", config.level);
        LevelFilter::Info
    });
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("rocket", LevelFilter::Warn)
        .level_for("_", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()
}
