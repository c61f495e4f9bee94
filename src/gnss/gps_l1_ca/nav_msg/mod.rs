
use std::collections::VecDeque;

use tracing::trace;

use crate::DigSigProcErr;
use crate::gnss::SignalId;
use crate::gnss::gps_l1_ca::ephemeris::Ephemeris;
use crate::gnss::tracking::{BitPolarity, TOW_UNKNOWN, WEEK_MS};
use crate::utils::bools_to_int;

pub mod parity;
pub mod subframe;

#[cfg(test)]
pub mod encode;

use self::parity::SUBFRAME_BITS;
use self::subframe::{subframe1, subframe2, subframe3, SubframeBody};

/*	GPS L1 C/A nav message handling:
	- Search a 60-bit window for a preamble (either polarity) followed by a valid HOW
	- Accumulate polarity-corrected 300-bit subframes, re-checking TLM/HOW on each
	- Parity check and decode subframes on request
*/

const TLM_HOW_BITS:usize = 60;
const TOW_COUNT_PER_WEEK:u32 = 100_800;
const PREAMBLE:[bool; 8] = [true, false, false, false, true, false, true, true];

/// What a subframe contributed to receiver state
#[derive(Debug, PartialEq, Clone, Default)]
pub struct SubframeOutcome {
	pub ephemeris:Option<Ephemeris>,
	pub l2c_capability:Option<u32>,
}

/// Per-channel navigation message decode state
pub trait NavMessage {

	fn init(&mut self);

	/// Feeds one decided bit, returns (TOW in ms or `TOW_UNKNOWN`, polarity)
	fn update(&mut self, bit_val:bool) -> (i32, BitPolarity);

	fn subframe_ready(&self) -> bool;

	/// `Ok(None)` when no subframe is waiting
	fn process_subframe(&mut self, sid:SignalId) -> Result<Option<SubframeOutcome>, DigSigProcErr>;

}

pub struct NavMsg {
	window:VecDeque<bool>,
	subframe:Vec<bool>,
	ready:Option<Vec<bool>>,
	bit_polarity:BitPolarity,
	last_sf1:Option<subframe1::Body>,
	last_sf2:Option<subframe2::Body>,
	last_sf3:Option<subframe3::Body>,
}

impl Default for NavMsg {
	fn default() -> Self { Self::new() }
}

// Polarity-corrected TLM and HOW; the TOW count if both words check out
fn check_tlm_how(bits:&[bool]) -> Option<u32> {
	if bits.len() < TLM_HOW_BITS || bits[..8] != PREAMBLE { return None; }
	if !parity::check_word(&bits[0..30], false, false) || !parity::check_word(&bits[30..60], bits[28], bits[29]) {
		return None;
	}

	let how:Vec<bool> = bits[30..54].iter().map(|b| b ^ bits[29]).collect();
	let tow_count = bools_to_int::to_u32(&how[0..17]).ok()?;
	let subframe_id = bools_to_int::to_u8(&how[19..22]).ok()?;
	if tow_count >= TOW_COUNT_PER_WEEK || !(1..=5).contains(&subframe_id) {
		return None;
	}
	Some(tow_count)
}

// The HOW count is the TOW of the next subframe; we are 60 bits into the current one
fn tow_at_end_of_how(tow_count:u32) -> i32 {
	let next_subframe_ms = (tow_count as i32) * 6000;
	let elapsed_ms = (TLM_HOW_BITS as i32) * super::NAV_BIT_PERIOD_MS;
	(next_subframe_ms - 6000 + elapsed_ms + WEEK_MS) % WEEK_MS
}

impl NavMsg {

	pub fn new() -> Self {
		Self{ window: VecDeque::with_capacity(TLM_HOW_BITS), subframe: Vec::with_capacity(SUBFRAME_BITS), ready: None,
			bit_polarity: BitPolarity::Unknown, last_sf1: None, last_sf2: None, last_sf3: None }
	}

	pub fn bit_polarity(&self) -> BitPolarity { self.bit_polarity }

	fn search(&mut self, raw:bool) -> i32 {
		self.window.push_back(raw);
		while self.window.len() > TLM_HOW_BITS { self.window.pop_front(); }
		if self.window.len() < TLM_HOW_BITS { return TOW_UNKNOWN; }

		for &(polarity, invert) in &[(BitPolarity::Positive, false), (BitPolarity::Negative, true)] {
			let candidate:Vec<bool> = self.window.iter().map(|b| b ^ invert).collect();
			if let Some(tow_count) = check_tlm_how(&candidate) {
				self.bit_polarity = polarity;
				self.window.clear();
				self.subframe = candidate;
				return tow_at_end_of_how(tow_count);
			}
		}
		TOW_UNKNOWN
	}

	fn append(&mut self, bit:bool) -> i32 {
		self.subframe.push(bit);
		match self.subframe.len() {
			TLM_HOW_BITS => match check_tlm_how(&self.subframe) {
				Some(tow_count) => tow_at_end_of_how(tow_count),
				None => {
					self.lose_sync();
					TOW_UNKNOWN
				}
			},
			SUBFRAME_BITS => {
				let complete = std::mem::replace(&mut self.subframe, Vec::with_capacity(SUBFRAME_BITS));
				self.ready = Some(complete);
				TOW_UNKNOWN
			},
			_ => TOW_UNKNOWN,
		}
	}

	// Back to searching; the bits of the partial subframe go back into the window uncorrected
	fn lose_sync(&mut self) {
		let invert = self.bit_polarity == BitPolarity::Negative;
		let keep_from = self.subframe.len().saturating_sub(TLM_HOW_BITS - 1);
		self.window = self.subframe.drain(..).skip(keep_from).map(|b| b ^ invert).collect();
		self.bit_polarity = BitPolarity::Unknown;
		trace!("nav message sync lost");
	}

	fn assemble_ephemeris(&mut self, sid:SignalId) -> Option<Ephemeris> {
		let eph = match (&self.last_sf1, &self.last_sf2, &self.last_sf3) {
			(Some(sf1), Some(sf2), Some(sf3)) => Ephemeris::from_subframes(sid, sf1, sf2, sf3)?,
			_ => return None,
		};
		self.last_sf1 = None;
		self.last_sf2 = None;
		self.last_sf3 = None;
		Some(eph)
	}

}

impl NavMessage for NavMsg {

	fn init(&mut self) { *self = Self::new(); }

	fn update(&mut self, bit_val:bool) -> (i32, BitPolarity) {
		let tow_ms = match self.bit_polarity {
			BitPolarity::Unknown  => self.search(bit_val),
			BitPolarity::Positive => self.append(bit_val),
			BitPolarity::Negative => self.append(!bit_val),
		};
		(tow_ms, self.bit_polarity)
	}

	fn subframe_ready(&self) -> bool { self.ready.is_some() }

	fn process_subframe(&mut self, sid:SignalId) -> Result<Option<SubframeOutcome>, DigSigProcErr> {
		let bits = match self.ready.take() {
			Some(bits) => bits,
			None => return Ok(None),
		};

		let data = match parity::data_recover(&bits) {
			Ok(data) => data,
			Err(e) => {
				self.lose_sync();
				return Err(e);
			}
		};

		let sf = subframe::decode(&data)?;
		let mut outcome = SubframeOutcome::default();
		match sf.body {
			SubframeBody::Subframe1(sf1) => self.last_sf1 = Some(sf1),
			SubframeBody::Subframe2(sf2) => self.last_sf2 = Some(sf2),
			SubframeBody::Subframe3(sf3) => self.last_sf3 = Some(sf3),
			SubframeBody::Subframe4(sf4) => outcome.l2c_capability = sf4.l2c_capability(),
			SubframeBody::Subframe5 => {},
		}
		outcome.ephemeris = self.assemble_ephemeris(sid);

		Ok(Some(outcome))
	}

}
