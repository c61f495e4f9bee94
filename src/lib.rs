
pub mod config;
pub mod gnss;
pub mod io;

pub mod utils;

#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum DigSigProcErr {
	#[error("invalid telemetry data: {0}")]
	InvalidTelemetryData(&'static str),
	#[error("parity check failed on word {0}")]
	ParityCheckFailed(usize),
}
