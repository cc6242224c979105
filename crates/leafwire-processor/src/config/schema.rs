use serde::Deserialize;

use leafwire_core::error::{Result, WireError};
use leafwire_core::ByteOrder;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    pub version: u32,

    #[serde(default)]
    pub codec: CodecSection,

    #[serde(default)]
    pub router: RouterSection,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            codec: CodecSection::default(),
            router: RouterSection::default(),
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WireError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.router.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecSection {
    /// Applies to header fields, length prefixes and numeric body fields.
    #[serde(default)]
    pub byte_order: ByteOrder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterSection {
    #[serde(default = "default_inbox_capacity")]
    pub inbox_capacity: usize,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            inbox_capacity: default_inbox_capacity(),
        }
    }
}

impl RouterSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1_048_576).contains(&self.inbox_capacity) {
            return Err(WireError::Config(
                "router.inbox_capacity must be between 1 and 1048576".into(),
            ));
        }
        Ok(())
    }
}

fn default_inbox_capacity() -> usize {
    1024
}
