
use std::collections::VecDeque;
use std::fmt;

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::gnss::SignalId;

pub const TOW_UNKNOWN:i32 = -1;
pub const WEEK_MS:i32 = 604_800_000;

pub const DEFAULT_NAV_BIT_FIFO_SIZE:usize = 64;

/// Index of a tracking channel
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ChannelId(pub usize);

impl fmt::Display for ChannelId {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result { write!(f, "channel {}", self.0) }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum BitPolarity {
	Positive,
	Negative,
	Unknown,
}

impl BitPolarity {
	pub fn is_resolved(&self) -> bool { *self != BitPolarity::Unknown }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum RuntimeState {
	Disabled,
	Running,
	Disabling,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct TimeSync {
	pub tow_ms:i32,
	pub polarity:BitPolarity,
	// Number of nav bits read from the channel when the sync was applied
	pub read_index:u64,
}

/// What a decoder needs from the tracking loop that produces its bits
pub trait TrackingChannels {

	/// Pops the oldest soft bit, or `None` once the FIFO is empty. Never blocks.
	fn nav_bit_get(&mut self, channel:ChannelId) -> Option<i8>;

	/// Returns false if the channel refuses the sync
	fn time_sync(&mut self, channel:ChannelId, tow_ms:i32, polarity:BitPolarity) -> bool;

	fn runtime_state(&self, channel:ChannelId) -> RuntimeState;

}

#[derive(Debug)]
struct TrackingChannel {
	sid:Option<SignalId>,
	state:RuntimeState,
	nav_bits:VecDeque<i8>,
	read_index:u64,
	dropped_bits:u64,
	time_sync:Option<TimeSync>,
}

impl TrackingChannel {

	fn new(fifo_size:usize) -> Self {
		Self{ sid: None, state: RuntimeState::Disabled, nav_bits: VecDeque::with_capacity(fifo_size),
			read_index: 0, dropped_bits: 0, time_sync: None }
	}

	fn reset(&mut self) {
		self.nav_bits.clear();
		self.read_index = 0;
		self.dropped_bits = 0;
		self.time_sync = None;
	}

}

/// Fixed set of tracking channels, each with a bounded nav bit FIFO
#[derive(Debug)]
pub struct TrackingChannelTable {
	channels:Vec<TrackingChannel>,
	fifo_size:usize,
}

impl TrackingChannelTable {

	pub fn new(num_channels:usize, fifo_size:usize) -> Self {
		let channels = (0..num_channels).map(|_| TrackingChannel::new(fifo_size)).collect();
		Self{ channels, fifo_size }
	}

	pub fn len(&self) -> usize { self.channels.len() }
	pub fn is_empty(&self) -> bool { self.channels.is_empty() }
	pub fn fifo_size(&self) -> usize { self.fifo_size }

	pub fn sid(&self, channel:ChannelId) -> Option<SignalId> { self.channels.get(channel.0).and_then(|c| c.sid) }
	pub fn last_time_sync(&self, channel:ChannelId) -> Option<TimeSync> { self.channels.get(channel.0).and_then(|c| c.time_sync) }
	pub fn pending_bits(&self, channel:ChannelId) -> usize { self.channels.get(channel.0).map(|c| c.nav_bits.len()).unwrap_or(0) }
	pub fn dropped_bits(&self, channel:ChannelId) -> u64 { self.channels.get(channel.0).map(|c| c.dropped_bits).unwrap_or(0) }

	/// Lowest-index channel that is not in use
	pub fn free_channel(&self) -> Option<ChannelId> {
		self.channels.iter().position(|c| c.state == RuntimeState::Disabled).map(ChannelId)
	}

	/// Binds a disabled channel to `sid` and starts it running
	pub fn start(&mut self, channel:ChannelId, sid:SignalId) -> bool {
		match self.channels.get_mut(channel.0) {
			Some(c) if c.state == RuntimeState::Disabled => {
				c.reset();
				c.sid = Some(sid);
				c.state = RuntimeState::Running;
				debug!(channel = channel.0, sid = %sid, "tracking channel started");
				true
			},
			_ => false,
		}
	}

	pub fn stop(&mut self, channel:ChannelId) {
		if let Some(c) = self.channels.get_mut(channel.0) {
			c.reset();
			c.sid = None;
			c.state = RuntimeState::Disabled;
		}
	}

	pub fn set_runtime_state(&mut self, channel:ChannelId, state:RuntimeState) -> bool {
		match self.channels.get_mut(channel.0) {
			Some(c) if c.state != RuntimeState::Disabled && state != RuntimeState::Disabled => {
				c.state = state;
				true
			},
			_ => false,
		}
	}

	/// Queues a soft bit. A full FIFO drops the new bit and returns false.
	pub fn push_nav_bit(&mut self, channel:ChannelId, soft_bit:i8) -> bool {
		let fifo_size = self.fifo_size;
		match self.channels.get_mut(channel.0) {
			Some(c) if c.state != RuntimeState::Disabled => {
				if c.nav_bits.len() >= fifo_size {
					c.dropped_bits += 1;
					if c.dropped_bits == 1 {
						warn!(channel = channel.0, "nav bit FIFO full, dropping bits");
					}
					false
				} else {
					c.nav_bits.push_back(soft_bit);
					true
				}
			},
			_ => false,
		}
	}

}

impl TrackingChannels for TrackingChannelTable {

	fn nav_bit_get(&mut self, channel:ChannelId) -> Option<i8> {
		let c = self.channels.get_mut(channel.0)?;
		let bit = c.nav_bits.pop_front()?;
		c.read_index += 1;
		Some(bit)
	}

	fn time_sync(&mut self, channel:ChannelId, tow_ms:i32, polarity:BitPolarity) -> bool {
		match self.channels.get_mut(channel.0) {
			Some(c) if c.state == RuntimeState::Running && polarity.is_resolved() && tow_ms >= 0 && tow_ms < WEEK_MS => {
				c.time_sync = Some(TimeSync{ tow_ms, polarity, read_index: c.read_index });
				true
			},
			_ => false,
		}
	}

	fn runtime_state(&self, channel:ChannelId) -> RuntimeState {
		self.channels.get(channel.0).map(|c| c.state).unwrap_or(RuntimeState::Disabled)
	}

}
