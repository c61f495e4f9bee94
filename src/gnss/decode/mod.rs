//! Decoder slot pools and the registry that binds them to tracking channels.
//!
//! Each signal type registers one [`SignalDecoder`] together with a fixed
//! number of slots. Enabling a tracking channel claims the lowest free slot of
//! the matching pool; [`DecoderRegistry::process_all`] then runs the decoder
//! once for every active slot, in registration order and then slot order.

use thiserror::Error;
use tracing::{debug, info};

use crate::gnss::{SignalId, SignalType};
use crate::gnss::store::{CapabilityStore, EphemerisStore};
use crate::gnss::tracking::{ChannelId, TrackingChannels};

use self::diagnostics::DiagnosticsSink;

pub mod diagnostics;
pub mod gps_l1_ca;
pub mod task;


/// The tracking channel a slot is bound to
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ChannelInfo {
	pub tracking_channel:ChannelId,
	pub sid:SignalId,
}

/// Collaborators a decoder reads from and commits to
pub struct DecodeContext<'a> {
	pub channels:&'a mut dyn TrackingChannels,
	pub ephemerides:&'a mut dyn EphemerisStore,
	pub l2c_capability:&'a mut dyn CapabilityStore,
	pub diagnostics:&'a mut dyn DiagnosticsSink,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum DecoderError {
	#[error("a decoder for {0} is already registered")]
	DuplicateSignalType(SignalType),
	#[error("the decoder pool for {0} needs at least one slot")]
	ZeroPoolSize(SignalType),
	#[error("no decoder registered for {0}")]
	NoDecoderInterface(SignalType),
	#[error("{0} already has a decoder")]
	ChannelAlreadyEnabled(ChannelId),
	#[error("all {pool_size} decoders in use, {sid} will not be decoded")]
	NoFreeSlot{ sid:SignalId, pool_size:usize },
}

impl DecoderError {

	/// Errors that can only come from bring-up and should stop it
	pub fn is_configuration_error(&self) -> bool {
		matches!(self, DecoderError::DuplicateSignalType(_) | DecoderError::ZeroPoolSize(_))
	}

}

/// Decode behaviour for one signal type. `State` is the per-slot decode state,
/// created once per slot at registration and re-initialized on every enable.
pub trait SignalDecoder: Send {
	type State: Send;

	fn signal_type(&self) -> SignalType;
	fn new_state(&self) -> Self::State;

	fn init(&self, info:&ChannelInfo, state:&mut Self::State);
	fn disable(&self, info:&ChannelInfo, state:&mut Self::State);
	fn process(&self, info:&ChannelInfo, state:&mut Self::State, ctx:&mut DecodeContext<'_>);
}

pub struct DecoderSlot<S> {
	channel:Option<ChannelInfo>,
	state:S,
}

impl<S> DecoderSlot<S> {

	pub fn is_active(&self) -> bool { self.channel.is_some() }
	pub fn channel(&self) -> Option<ChannelInfo> { self.channel }
	pub fn state(&self) -> &S { &self.state }

}

// Lets the registry hold pools of different decoder types side by side
trait DecoderPool: Send {
	fn signal_type(&self) -> SignalType;
	fn pool_size(&self) -> usize;
	fn active_count(&self) -> usize;
	fn slot_of(&self, channel:ChannelId) -> Option<usize>;
	fn enable(&mut self, info:ChannelInfo) -> Option<usize>;
	fn disable(&mut self, channel:ChannelId) -> Option<usize>;
	fn process_all(&mut self, ctx:&mut DecodeContext<'_>);
}

struct SlotPool<D: SignalDecoder> {
	decoder:D,
	slots:Box<[DecoderSlot<D::State>]>,
}

impl<D: SignalDecoder> SlotPool<D> {

	fn new(decoder:D, pool_size:usize) -> Self {
		let slots:Vec<DecoderSlot<D::State>> = (0..pool_size)
			.map(|_| DecoderSlot{ channel: None, state: decoder.new_state() })
			.collect();
		Self{ decoder, slots: slots.into_boxed_slice() }
	}

}

impl<D: SignalDecoder> DecoderPool for SlotPool<D> {

	fn signal_type(&self) -> SignalType { self.decoder.signal_type() }
	fn pool_size(&self) -> usize { self.slots.len() }
	fn active_count(&self) -> usize { self.slots.iter().filter(|s| s.is_active()).count() }

	fn slot_of(&self, channel:ChannelId) -> Option<usize> {
		self.slots.iter().position(|s| s.channel.map(|c| c.tracking_channel) == Some(channel))
	}

	fn enable(&mut self, info:ChannelInfo) -> Option<usize> {
		let (idx, slot) = self.slots.iter_mut().enumerate().find(|(_, s)| !s.is_active())?;
		self.decoder.init(&info, &mut slot.state);
		slot.channel = Some(info);
		Some(idx)
	}

	fn disable(&mut self, channel:ChannelId) -> Option<usize> {
		let idx = self.slot_of(channel)?;
		let slot = &mut self.slots[idx];
		if let Some(info) = slot.channel.take() {
			self.decoder.disable(&info, &mut slot.state);
		}
		Some(idx)
	}

	fn process_all(&mut self, ctx:&mut DecodeContext<'_>) {
		let decoder = &self.decoder;
		for slot in self.slots.iter_mut() {
			if let Some(info) = slot.channel {
				decoder.process(&info, &mut slot.state, ctx);
			}
		}
	}

}

/// Every registered decoder, in registration order
#[derive(Default)]
pub struct DecoderRegistry {
	pools:Vec<Box<dyn DecoderPool>>,
}

impl DecoderRegistry {

	pub fn new() -> Self { Self::default() }

	pub fn register<D: SignalDecoder + 'static>(&mut self, decoder:D, pool_size:usize) -> Result<(), DecoderError> {
		let signal_type = decoder.signal_type();
		if self.pools.iter().any(|p| p.signal_type() == signal_type) {
			return Err(DecoderError::DuplicateSignalType(signal_type));
		}
		if pool_size == 0 {
			return Err(DecoderError::ZeroPoolSize(signal_type));
		}

		self.pools.push(Box::new(SlotPool::new(decoder, pool_size)));
		info!(signal = %signal_type, pool_size, "registered decoder");
		Ok(())
	}

	/// Claims the lowest-index free slot for the channel's signal type and initializes it
	pub fn enable(&mut self, info:ChannelInfo) -> Result<usize, DecoderError> {
		if self.slot_of(info.tracking_channel).is_some() {
			return Err(DecoderError::ChannelAlreadyEnabled(info.tracking_channel));
		}

		let pool = self.pools.iter_mut()
			.find(|p| p.signal_type() == info.sid.code)
			.ok_or(DecoderError::NoDecoderInterface(info.sid.code))?;

		let pool_size = pool.pool_size();
		let idx = pool.enable(info).ok_or(DecoderError::NoFreeSlot{ sid: info.sid, pool_size })?;
		debug!(sid = %info.sid, channel = info.tracking_channel.0, slot = idx, "decoder enabled");
		Ok(idx)
	}

	/// Releases the channel's slot, if it has one. Returns the freed slot index.
	pub fn disable(&mut self, channel:ChannelId) -> Option<usize> {
		let idx = self.pools.iter_mut().find_map(|p| p.disable(channel))?;
		debug!(channel = channel.0, slot = idx, "decoder disabled");
		Some(idx)
	}

	pub fn process_all(&mut self, ctx:&mut DecodeContext<'_>) {
		for pool in self.pools.iter_mut() {
			pool.process_all(ctx);
		}
	}

	pub fn slot_of(&self, channel:ChannelId) -> Option<(SignalType, usize)> {
		self.pools.iter().find_map(|p| p.slot_of(channel).map(|idx| (p.signal_type(), idx)))
	}

	pub fn active_count(&self, signal_type:SignalType) -> usize {
		self.pools.iter().filter(|p| p.signal_type() == signal_type).map(|p| p.active_count()).sum()
	}

	pub fn pool_size(&self, signal_type:SignalType) -> Option<usize> {
		self.pools.iter().find(|p| p.signal_type() == signal_type).map(|p| p.pool_size())
	}

	pub fn signal_types(&self) -> Vec<SignalType> {
		self.pools.iter().map(|p| p.signal_type()).collect()
	}

}
