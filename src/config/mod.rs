use config::{Config, Environment, File};
use once_cell::sync::Lazy;
use rocket::serde::Deserialize;

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct DbConfig {
    pub location: String,
}

/// config properties for the folder holding the model library
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct ModelsConfig {
    pub root: String,
    /// whether the database is synchronized with `root` when the server starts
    #[serde(rename = "synconstartup")]
    pub sync_on_startup: bool,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct LoggingConfig {
    /// one of `error`, `warn`, `info`, `debug`, `trace`, or `off`
    pub level: String,
}

/// config properties for the whole of this application
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct StlManagerConfig {
    pub database: DbConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

/// Parses the config file located at ./StlManager.toml, if it exists, and then applies any `STL_MANAGER__*`
/// environment variables on top of it (e.g. `STL_MANAGER__MODELS__ROOT`).
/// Missing values fall back to the defaults. If the config is malformed, the application will panic
pub fn parse_config() -> StlManagerConfig {
    let defaults = &*CONFIG_DEFAULT;
    let settings = Config::builder()
        .set_default("database.location", defaults.database.location.clone())
        .and_then(|b| b.set_default("models.root", defaults.models.root.clone()))
        .and_then(|b| b.set_default("models.synconstartup", defaults.models.sync_on_startup))
        .and_then(|b| b.set_default("logging.level", defaults.logging.level.clone()))
        .map(|b| {
            b.add_source(File::with_name("./StlManager.toml").required(false))
                .add_source(Environment::with_prefix("STL_MANAGER").separator("__"))
        })
        .and_then(|b| b.build());
    let settings = match settings {
        Ok(settings) => settings,
        // basically everything here is unrecoverable
        Err(e) => panic!("Failed to parse config file. Exception is {e}"),
    };
    match settings.try_deserialize() {
        Ok(config) => config,
        Err(e) => panic!("Failed to read config values. Exception is {e}"),
    }
}

/// global variable for config, that way it doesn't need to be repeatedly parsed
pub static STL_MANAGER_CONFIG: Lazy<StlManagerConfig> = Lazy::new(parse_config);
static CONFIG_DEFAULT: Lazy<StlManagerConfig> = Lazy::new(|| StlManagerConfig {
    database: DbConfig {
        location: "./data/stl-manager.db".to_string(),
    },
    models: ModelsConfig {
        root: "./public/models".to_string(),
        sync_on_startup: true,
    },
    logging: LoggingConfig {
        level: "info".to_string(),
    },
});
