
use std::marker::PhantomData;

use tracing::debug;

use crate::gnss::{SignalType, GPS_L1_CA};
use crate::gnss::gps_l1_ca::nav_msg::{NavMessage, NavMsg};
use crate::gnss::tracking::RuntimeState;

use super::{ChannelInfo, DecodeContext, SignalDecoder};
use super::diagnostics::DecodeEvent;

pub const DEFAULT_NUM_DECODERS:usize = 12;

/// GPS L1 C/A decoder. `N` is the nav message state kept in every slot.
pub struct GpsL1CaDecoder<N = NavMsg> {
	nav_msg:PhantomData<fn() -> N>,
}

impl<N> GpsL1CaDecoder<N> {
	pub fn new() -> Self { Self{ nav_msg: PhantomData } }
}

impl<N> Default for GpsL1CaDecoder<N> {
	fn default() -> Self { Self::new() }
}

impl<N: NavMessage + Default + Send> SignalDecoder for GpsL1CaDecoder<N> {
	type State = N;

	fn signal_type(&self) -> SignalType { GPS_L1_CA }

	fn new_state(&self) -> N { N::default() }

	fn init(&self, _info:&ChannelInfo, nav_msg:&mut N) {
		nav_msg.init();
	}

	fn disable(&self, _info:&ChannelInfo, _nav_msg:&mut N) {}

	fn process(&self, info:&ChannelInfo, nav_msg:&mut N, ctx:&mut DecodeContext<'_>) {
		let channel = info.tracking_channel;

		// Process incoming nav bits
		while let Some(soft_bit) = ctx.channels.nav_bit_get(channel) {
			let (tow_ms, polarity) = nav_msg.update(soft_bit >= 0);
			if tow_ms >= 0 && polarity.is_resolved() && !ctx.channels.time_sync(channel, tow_ms, polarity) {
				ctx.diagnostics.report(DecodeEvent::TowSetFailed{ sid: info.sid, tow_ms, polarity });
			}
		}

		// A subframe is only trusted while the channel is in steady tracking
		if ctx.channels.runtime_state(channel) != RuntimeState::Running || !nav_msg.subframe_ready() {
			return;
		}

		let outcome = match nav_msg.process_subframe(info.sid) {
			Ok(Some(outcome)) => outcome,
			Ok(None) => return,
			Err(e) => {
				debug!(sid = %info.sid, error = %e, "subframe discarded");
				return;
			}
		};

		if let Some(mask) = outcome.l2c_capability {
			ctx.l2c_capability.set_mask(mask);
		}

		if let Some(eph) = outcome.ephemeris {
			ctx.ephemerides.commit(info.sid, &eph);

			// Health is judged on what the store kept, not on the draft
			if let Some(stored) = ctx.ephemerides.fetch(info.sid) {
				if !stored.healthy {
					ctx.diagnostics.report(DecodeEvent::Unhealthy{ sid: info.sid });
				}
			}
		}
	}

}

#[cfg(test)]
mod tests {

	use std::collections::VecDeque;

	use rand::{Rng, SeedableRng};
	use rand::rngs::StdRng;
	use tracing::Level;

	use crate::DigSigProcErr;
	use crate::gnss::SignalId;
	use crate::gnss::gps_l1_ca::ephemeris::Ephemeris;
	use crate::gnss::gps_l1_ca::nav_msg::SubframeOutcome;
	use crate::gnss::store::{CapabilityStore, EphemerisStore};
	use crate::gnss::tracking::{BitPolarity, ChannelId, RuntimeState};
	use crate::gnss::decode::tests::{test_ephemeris, Rig};

	use super::*;

	#[derive(Default)]
	struct ScriptedNav {
		updates:VecDeque<(i32, BitPolarity)>,
		bits_seen:usize,
		ready:bool,
		result:Option<Result<Option<SubframeOutcome>, DigSigProcErr>>,
		subframes_processed:usize,
	}

	impl NavMessage for ScriptedNav {
		fn init(&mut self) { *self = Self::default(); }

		fn update(&mut self, _bit_val:bool) -> (i32, BitPolarity) {
			self.bits_seen += 1;
			self.updates.pop_front().unwrap_or((-1, BitPolarity::Unknown))
		}

		fn subframe_ready(&self) -> bool { self.ready }

		fn process_subframe(&mut self, _sid:SignalId) -> Result<Option<SubframeOutcome>, DigSigProcErr> {
			self.ready = false;
			self.subframes_processed += 1;
			self.result.take().unwrap_or(Ok(None))
		}
	}

	const CH:ChannelId = ChannelId(4);

	fn decoder() -> GpsL1CaDecoder<ScriptedNav> { GpsL1CaDecoder::new() }

	fn info() -> ChannelInfo { ChannelInfo{ tracking_channel: CH, sid: SignalId::gps_l1_ca(21) } }

	fn scripted(updates:&[(i32, BitPolarity)]) -> ScriptedNav {
		ScriptedNav{ updates: updates.iter().cloned().collect(), ..ScriptedNav::default() }
	}

	fn with_subframe(result:Result<Option<SubframeOutcome>, DigSigProcErr>) -> ScriptedNav {
		ScriptedNav{ ready: true, result: Some(result), ..ScriptedNav::default() }
	}

	#[test]
	fn only_complete_tow_is_synced() {
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &[1, -1]);
		let mut nav = scripted(&[(-1, BitPolarity::Positive), (48200, BitPolarity::Positive)]);

		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(rig.channels.syncs(CH), vec![(48200, BitPolarity::Positive)]);
		assert!(rig.events.is_empty());
	}

	#[test]
	fn unknown_polarity_blocks_sync() {
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &[1, 1, 1]);
		let mut nav = scripted(&[(6000, BitPolarity::Unknown), (-1, BitPolarity::Negative), (6040, BitPolarity::Negative)]);

		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(rig.channels.syncs(CH), vec![(6040, BitPolarity::Negative)]);
	}

	#[test]
	fn random_updates_sync_only_on_full_information() {
		let mut rng = StdRng::seed_from_u64(7);
		let polarities = [BitPolarity::Positive, BitPolarity::Negative, BitPolarity::Unknown];
		let updates:Vec<(i32, BitPolarity)> = (0..500)
			.map(|_| (rng.gen_range(-3, 3) * 20_000, polarities[rng.gen_range(0, 3)]))
			.collect();

		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &vec![1; updates.len()]);
		let mut nav = scripted(&updates);
		decoder().process(&info(), &mut nav, &mut rig.ctx());

		let expected:Vec<(i32, BitPolarity)> = updates.iter().cloned()
			.filter(|(tow_ms, polarity)| *tow_ms >= 0 && polarity.is_resolved())
			.collect();
		assert_eq!(rig.channels.syncs(CH), expected);
		assert_eq!(nav.bits_seen, 500);
	}

	#[test]
	fn rejected_sync_is_reported_and_drain_continues() {
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &[1, 1, 1]);
		rig.channels.reject_syncs(CH);
		let mut nav = scripted(&[(1000, BitPolarity::Positive), (-1, BitPolarity::Positive), (7000, BitPolarity::Positive)]);

		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(nav.bits_seen, 3);
		assert_eq!(rig.events, vec![
			DecodeEvent::TowSetFailed{ sid: info().sid, tow_ms: 1000, polarity: BitPolarity::Positive },
			DecodeEvent::TowSetFailed{ sid: info().sid, tow_ms: 7000, polarity: BitPolarity::Positive },
		]);
		assert!(rig.events.iter().all(|e| e.level() == Level::WARN));
	}

	#[test]
	fn subframe_ignored_unless_running() {
		let sid = info().sid;
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Disabling, &[]);
		let mut nav = with_subframe(Ok(Some(SubframeOutcome{ ephemeris: Some(test_ephemeris(sid, true)), l2c_capability: Some(3) })));

		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(nav.subframes_processed, 0);
		assert_eq!(rig.store.commits, 0);
		assert_eq!(rig.caps.mask(), 0);
	}

	#[test]
	fn failed_decode_leaves_state_untouched() {
		let sid = info().sid;
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &[]);
		rig.store.table.commit(sid, &test_ephemeris(sid, true));
		rig.caps.set_mask(0xF0);
		let before = rig.store.table.snapshot();

		let mut nav = with_subframe(Err(DigSigProcErr::ParityCheckFailed(3)));
		decoder().process(&info(), &mut nav, &mut rig.ctx());

		let mut nav = with_subframe(Ok(None));
		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(rig.store.commits, 0);
		assert_eq!(rig.store.table.snapshot(), before);
		assert_eq!(rig.caps.mask(), 0xF0);
		assert!(rig.events.is_empty());
	}

	#[test]
	fn no_ephemeris_update_means_no_commit() {
		let sid = info().sid;
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &[]);
		rig.store.table.commit(sid, &test_ephemeris(sid, true));
		let before = serde_json::to_string(&rig.store.table.snapshot()).unwrap();
		let revision = rig.store.table.revision();

		let mut nav = with_subframe(Ok(Some(SubframeOutcome{ ephemeris: None, l2c_capability: Some(0b1010) })));
		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(rig.store.commits, 0);
		assert_eq!(serde_json::to_string(&rig.store.table.snapshot()).unwrap(), before);
		assert_eq!(rig.store.table.revision(), revision);
		assert_eq!(rig.caps.mask(), 0b1010);
	}

	#[test]
	fn unhealthy_ephemeris_commits_once_and_informs_once() {
		let sid = info().sid;
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &[]);

		let eph = test_ephemeris(sid, false);
		let mut nav = with_subframe(Ok(Some(SubframeOutcome{ ephemeris: Some(eph), l2c_capability: None })));
		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(rig.store.commits, 1);
		assert_eq!(rig.store.fetch(sid), Some(eph));
		assert_eq!(rig.events, vec![DecodeEvent::Unhealthy{ sid }]);
		assert_eq!(rig.events[0].level(), Level::INFO);
	}

	#[test]
	fn healthy_ephemeris_is_silent() {
		let sid = info().sid;
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &[]);

		let mut nav = with_subframe(Ok(Some(SubframeOutcome{ ephemeris: Some(test_ephemeris(sid, true)), l2c_capability: None })));
		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(rig.store.commits, 1);
		assert!(rig.events.is_empty());
	}

	#[test]
	fn health_is_read_back_from_the_store() {
		let sid = info().sid;
		let mut rig = Rig::new();
		rig.channels.add(CH, RuntimeState::Running, &[]);

		// The store refuses invalid ephemerides, so there is nothing to read back
		let eph = Ephemeris{ valid: false, ..test_ephemeris(sid, false) };
		let mut nav = with_subframe(Ok(Some(SubframeOutcome{ ephemeris: Some(eph), l2c_capability: None })));
		decoder().process(&info(), &mut nav, &mut rig.ctx());

		assert_eq!(rig.store.commits, 1);
		assert_eq!(rig.store.fetch(sid), None);
		assert!(rig.events.is_empty());
	}

}
