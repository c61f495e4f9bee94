
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::gnss::decode::gps_l1_ca::DEFAULT_NUM_DECODERS;
use crate::gnss::tracking::DEFAULT_NAV_BIT_FIFO_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("unable to read {path:?}: {source}")]
	Read{ path:PathBuf, source:std::io::Error },
	#[error("unable to parse config: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("invalid config: {0}")]
	Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
	/// Default `tracing` filter, overridden by `RUST_LOG`
	pub level:String,
}

impl Default for LogConfig {
	fn default() -> Self { Self{ level: "info".to_string() } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
	/// Slots in the GPS L1 C/A decoder pool
	pub gps_l1ca_decoders:usize,
	pub tracking_channels:usize,
	pub nav_bit_fifo_size:usize,
	/// Bits fed between decode passes when replaying a log
	pub tick_interval_bits:usize,
	pub log:LogConfig,
}

impl Default for DecoderConfig {
	fn default() -> Self {
		Self{ gps_l1ca_decoders: DEFAULT_NUM_DECODERS, tracking_channels: 12,
			nav_bit_fifo_size: DEFAULT_NAV_BIT_FIFO_SIZE, tick_interval_bits: 16, log: LogConfig::default() }
	}
}

impl DecoderConfig {

	pub fn from_toml_str(s:&str) -> Result<Self, ConfigError> {
		let config:Self = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}

	pub fn load<P: AsRef<Path>>(path:P) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read{ path: path.to_path_buf(), source })?;
		Self::from_toml_str(&contents)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.gps_l1ca_decoders == 0 { return Err(ConfigError::Invalid("gps_l1ca_decoders must be at least 1")); }
		if self.tracking_channels == 0 { return Err(ConfigError::Invalid("tracking_channels must be at least 1")); }
		if self.nav_bit_fifo_size == 0 { return Err(ConfigError::Invalid("nav_bit_fifo_size must be at least 1")); }

		// Each tick must fit in the FIFO or bits get dropped before the decoder sees them
		if self.tick_interval_bits == 0 || self.tick_interval_bits > self.nav_bit_fifo_size {
			return Err(ConfigError::Invalid("tick_interval_bits must be between 1 and nav_bit_fifo_size"));
		}
		Ok(())
	}

}
