use log::{
    Record,
    kv::{Error, Key, Value, VisitSource},
};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::encode::{Encode, Write};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct KeyValueEncoderConfig {
    pub pattern: Option<String>,
}

/// Pattern encoder that appends the record's structured fields as
/// ` key=value` pairs. Values containing whitespace are quoted.
#[derive(Debug)]
pub struct KeyValueEncoder {
    pattern: PatternEncoder,
}

impl KeyValueEncoder {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: PatternEncoder::new(pattern),
        }
    }
}

impl Encode for KeyValueEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        self.pattern.encode(w, record)?;

        let mut fields = FieldCollector::default();
        record
            .key_values()
            .visit(&mut fields)
            .map_err(|e| anyhow::anyhow!("Failed to collect log fields: {}", e))?;

        w.write_all(fields.rendered.as_bytes())?;
        w.write_all(b"\n")?;
        Ok(())
    }
}

#[derive(Default)]
struct FieldCollector {
    rendered: String,
}

impl<'kvs> VisitSource<'kvs> for FieldCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), Error> {
        let value = value.to_string();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            self.rendered.push_str(&format!(" {}={:?}", key, value));
        } else {
            self.rendered.push_str(&format!(" {}={}", key, value));
        }
        Ok(())
    }
}

pub struct KeyValueEncoderDeserializer;

impl log4rs::config::Deserialize for KeyValueEncoderDeserializer {
    type Trait = dyn Encode;
    type Config = KeyValueEncoderConfig;

    fn deserialize(
        &self,
        config: KeyValueEncoderConfig,
        _: &log4rs::config::Deserializers,
    ) -> anyhow::Result<Box<dyn Encode>> {
        let pattern = config.pattern.as_deref().unwrap_or("{d} {l} {m}");
        Ok(Box::new(KeyValueEncoder::new(pattern)))
    }
}
