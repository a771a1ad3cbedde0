pub mod key_value_encoder;

use std::path::Path;

use anyhow::{Context, anyhow};
use log::{debug, info};
use log4rs::{
    Config,
    config::{Deserializers, RawConfig},
};

use crate::log::key_value_encoder::KeyValueEncoderDeserializer;

const EXTERNAL_CONFIG: &str = "log4rs.yml";
const EMBEDDED_CONFIG: &str = include_str!("../../resources/default_log4rs.yml");

/// Initializes logging
///
/// A `log4rs.yml` in the working directory wins over the embedded defaults,
/// which send everything to stderr so stdout stays free for views.
pub fn init_logging() -> Result<(), anyhow::Error> {
    let path = Path::new(EXTERNAL_CONFIG);

    if path.exists() {
        log4rs::init_file(path, deserializers())
            .with_context(|| format!("Failed to load external {}", EXTERNAL_CONFIG))?;
        info!(path = EXTERNAL_CONFIG; "Logging initialized from external configuration");
        return Ok(());
    }

    log4rs::init_config(embedded_config()?).context("Failed to initialize logging")?;
    debug!("Logging initialized from embedded defaults");
    Ok(())
}

fn deserializers() -> Deserializers {
    let mut deserializers = Deserializers::default();
    deserializers.insert("key_value", KeyValueEncoderDeserializer);
    deserializers
}

fn embedded_config() -> Result<Config, anyhow::Error> {
    let raw: RawConfig = serde_yaml::from_str(EMBEDDED_CONFIG).context("Embedded logging configuration is invalid")?;

    let (appenders, errors) = raw.appenders_lossy(&deserializers());
    if !errors.is_empty() {
        return Err(anyhow!("Invalid appenders in embedded logging configuration: {:?}", errors));
    }

    Config::builder()
        .appenders(appenders)
        .loggers(raw.loggers())
        .build(raw.root())
        .context("Failed to build embedded logging configuration")
}
