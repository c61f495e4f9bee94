
use crate::config::DecoderConfig;
use crate::gnss::decode::{ChannelInfo, DecodeContext, DecoderError, DecoderRegistry};
use crate::gnss::decode::diagnostics::{DecodeEvent, DiagnosticsSink, TracingSink};
use crate::gnss::decode::gps_l1_ca::GpsL1CaDecoder;
use crate::gnss::gps_l1_ca::nav_msg::NavMsg;
use crate::gnss::store::{EphemerisTable, L2cCapability};
use crate::gnss::tracking::{ChannelId, TrackingChannels};

/// Everything the decoders share: the registry, the stores they commit to and
/// the diagnostics sink. Owned by whoever drives tracking maintenance.
pub struct Receiver {
	registry:DecoderRegistry,
	ephemerides:EphemerisTable,
	l2c_capability:L2cCapability,
	diagnostics:Box<dyn DiagnosticsSink + Send>,
}

impl Receiver {

	pub fn new(config:&DecoderConfig) -> Result<Self, DecoderError> {
		Self::with_diagnostics(config, Box::new(TracingSink))
	}

	pub fn with_diagnostics(config:&DecoderConfig, diagnostics:Box<dyn DiagnosticsSink + Send>) -> Result<Self, DecoderError> {
		let mut registry = DecoderRegistry::new();
		registry.register(GpsL1CaDecoder::<NavMsg>::new(), config.gps_l1ca_decoders)?;
		Ok(Self{ registry, ephemerides: EphemerisTable::new(), l2c_capability: L2cCapability::default(), diagnostics })
	}

	/// Binds a decoder to a newly started tracking channel. When the pool is
	/// exhausted the channel keeps tracking without decode.
	pub fn enable(&mut self, info:ChannelInfo) -> Result<usize, DecoderError> {
		let result = self.registry.enable(info);
		if let Err(DecoderError::NoFreeSlot{ sid, .. }) = result {
			self.diagnostics.report(DecodeEvent::NoFreeDecoder{ sid, channel: info.tracking_channel });
		}
		result
	}

	pub fn disable(&mut self, channel:ChannelId) -> Option<usize> {
		self.registry.disable(channel)
	}

	/// One decode pass over every active slot
	pub fn tick(&mut self, channels:&mut dyn TrackingChannels) {
		let mut ctx = DecodeContext{
			channels,
			ephemerides:    &mut self.ephemerides,
			l2c_capability: &mut self.l2c_capability,
			diagnostics:    &mut *self.diagnostics,
		};
		self.registry.process_all(&mut ctx);
	}

	pub fn registry(&self) -> &DecoderRegistry { &self.registry }
	pub fn ephemerides(&self) -> &EphemerisTable { &self.ephemerides }
	pub fn l2c_capability(&self) -> L2cCapability { self.l2c_capability }

}
