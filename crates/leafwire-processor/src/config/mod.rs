//! Processor config loader (strict parsing).

pub mod schema;

use std::fs;

use leafwire_core::error::{Result, WireError};

pub use schema::{CodecSection, ProcessorConfig, RouterSection};

pub fn load_from_file(path: &str) -> Result<ProcessorConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| WireError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ProcessorConfig> {
    let cfg: ProcessorConfig =
        serde_yaml::from_str(s).map_err(|e| WireError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
