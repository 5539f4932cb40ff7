use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod optimizer_config;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use optimizer_config::{OptimizerSettings, ParameterDef, ParameterRange};
pub use settings::{
    BollingerParams, Config, DataSettings, IchimokuParams, LoggingSettings, MACrossoverParams,
    MacdParams, RsiParams, Strategies,
};

/// Prefix for environment overrides, e.g. `CHARTIST__OPTIMIZER__WORKERS=4`.
pub const ENV_PREFIX: &str = "CHARTIST";

/// Loads the application configuration from `config.toml` (if present) and the environment.
///
/// Every section has defaults, so a missing file still yields a usable `Config`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Loads configuration from an explicit file path, layered under environment overrides.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.as_ref().display(), "Configuration loaded");
    Ok(config)
}

/// Parses configuration from an in-memory TOML string. Environment overrides are not applied.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
