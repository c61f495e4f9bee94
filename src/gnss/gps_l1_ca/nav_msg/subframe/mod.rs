
use serde::{Serialize, Deserialize};

use crate::DigSigProcErr;
use crate::utils::bools_to_int;

use super::parity::SUBFRAME_DATA_BITS;

pub mod subframe1;
pub mod subframe2;
pub mod subframe3;
pub mod subframe4;

#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct Subframe {
	pub time_of_week_truncated:u32,
	pub subframe_id:u8,
	pub body:SubframeBody,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub enum SubframeBody {
	Subframe1(subframe1::Body),
	Subframe2(subframe2::Body),
	Subframe3(subframe3::Body),
	Subframe4(subframe4::Body),
	// Almanac pages; nothing downstream consumes them yet
	Subframe5,
}

impl Subframe {

	// TOW at the start of the next subframe, in seconds
	pub fn time_of_week(&self) -> f64 { (self.time_of_week_truncated as f64) * 6.0 }

}

pub fn decode(bits:&[bool; SUBFRAME_DATA_BITS]) -> Result<Subframe, DigSigProcErr> {
	let time_of_week_truncated:u32 = bools_to_int::to_u32(&bits[24..41])?;
	let subframe_id:u8 = bools_to_int::to_u8(&bits[43..46])?;

	let body = match subframe_id {
		1 => SubframeBody::Subframe1(subframe1::Body::new(bits)?),
		2 => SubframeBody::Subframe2(subframe2::Body::new(bits)?),
		3 => SubframeBody::Subframe3(subframe3::Body::new(bits)?),
		4 => SubframeBody::Subframe4(subframe4::Body::new(bits)?),
		5 => SubframeBody::Subframe5,
		_ => return Err(DigSigProcErr::InvalidTelemetryData("Subframe number other than 1 through 5")),
	};

	Ok(Subframe{ time_of_week_truncated, subframe_id, body })
}
