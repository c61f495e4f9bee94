
use tracing::{info, warn, Level};

use crate::gnss::SignalId;
use crate::gnss::tracking::{BitPolarity, ChannelId};

/// Reportable, non-fatal conditions raised while decoding
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DecodeEvent {
	TowSetFailed{ sid:SignalId, tow_ms:i32, polarity:BitPolarity },
	Unhealthy{ sid:SignalId },
	NoFreeDecoder{ sid:SignalId, channel:ChannelId },
}

impl DecodeEvent {

	pub fn sid(&self) -> SignalId {
		match self {
			DecodeEvent::TowSetFailed{ sid, .. }  => *sid,
			DecodeEvent::Unhealthy{ sid }         => *sid,
			DecodeEvent::NoFreeDecoder{ sid, .. } => *sid,
		}
	}

	pub fn level(&self) -> Level {
		match self {
			DecodeEvent::Unhealthy{..} => Level::INFO,
			_                          => Level::WARN,
		}
	}

}

pub trait DiagnosticsSink {
	fn report(&mut self, event:DecodeEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
	fn report(&mut self, event:DecodeEvent) {
		match event {
			DecodeEvent::TowSetFailed{ sid, tow_ms, polarity } =>
				warn!(sid = %sid, tow_ms, polarity = ?polarity, "TOW set failed"),
			DecodeEvent::Unhealthy{ sid } =>
				info!(sid = %sid, "unhealthy"),
			DecodeEvent::NoFreeDecoder{ sid, channel } =>
				warn!(sid = %sid, channel = channel.0, "no free decoder, tracking without decode"),
		}
	}
}

impl DiagnosticsSink for Vec<DecodeEvent> {
	fn report(&mut self, event:DecodeEvent) { self.push(event); }
}
