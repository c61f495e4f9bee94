
// Builds parity-correct subframes for exercising the decoder

use crate::utils::bools_to_int::write_i64;

use super::PREAMBLE;
use super::parity::{self, SUBFRAME_DATA_BITS, WORD_DATA_BITS};
use super::subframe::subframe4::PAGE_25_SV_ID;

pub const WEEK_NUMBER:i64 = 123;
pub const SQRT_A_RAW:i64 = 2_702_000_000;
pub const E_RAW:i64 = 40_000_000;
pub const M0_RAW:i64 = -1_000_000;
pub const OMEGA0_RAW:i64 = 500_000_000;
pub const A_F0_RAW:i64 = -123_456;
pub const T_OC_RAW:i64 = 7200;
pub const T_OE_RAW:i64 = 7200;

pub struct SubframeBuilder {
	data:[bool; SUBFRAME_DATA_BITS],
}

impl SubframeBuilder {

	pub fn new(tow_count:u32, subframe_id:u8) -> Self {
		let mut data = [false; SUBFRAME_DATA_BITS];
		data[..8].copy_from_slice(&PREAMBLE);
		write_i64(&mut data[24..41], tow_count as i64);
		write_i64(&mut data[43..46], subframe_id as i64);
		Self{ data }
	}

	pub fn field(mut self, start:usize, end:usize, value:i64) -> Self {
		write_i64(&mut self.data[start..end], value);
		self
	}

	pub fn encode(&self) -> Vec<bool> {
		let mut out = Vec::with_capacity(parity::SUBFRAME_BITS);
		let (mut last_d29, mut last_d30) = (false, false);
		for (word_idx, chunk) in self.data.chunks(WORD_DATA_BITS).enumerate() {
			let mut d = chunk.to_vec();
			// HOW and word 10 carry two free bits chosen to zero D29/D30
			if word_idx == 1 || word_idx == 9 {
				for t in 0..4u8 {
					d[22] = t & 2 != 0;
					d[23] = t & 1 != 0;
					let p = parity::parity_bits(&d, last_d29, last_d30);
					if !p[4] && !p[5] { break; }
				}
			}
			let p = parity::parity_bits(&d, last_d29, last_d30);
			out.extend(d.iter().map(|b| b ^ last_d30));
			out.extend(p.iter());
			last_d29 = p[4];
			last_d30 = p[5];
		}
		out
	}

}

pub fn subframe1(tow_count:u32, iodc:u16, sv_health:u8) -> Vec<bool> {
	SubframeBuilder::new(tow_count, 1)
		.field(48, 58, WEEK_NUMBER)
		.field(58, 60, 0b10)
		.field(64, 70, sv_health as i64)
		.field(70, 72, (iodc >> 8) as i64)
		.field(168, 176, (iodc & 0xFF) as i64)
		.field(176, 192, T_OC_RAW)
		.field(216, 238, A_F0_RAW)
		.encode()
}

pub fn subframe2(tow_count:u32, iode:u8) -> Vec<bool> {
	SubframeBuilder::new(tow_count, 2)
		.field(48, 56, iode as i64)
		.field(88, 120, M0_RAW)
		.field(136, 168, E_RAW)
		.field(184, 216, SQRT_A_RAW)
		.field(216, 232, T_OE_RAW)
		.encode()
}

pub fn subframe3(tow_count:u32, iode:u8) -> Vec<bool> {
	SubframeBuilder::new(tow_count, 3)
		.field(64, 96, OMEGA0_RAW)
		.field(216, 224, iode as i64)
		.encode()
}

pub fn page25(tow_count:u32, antispoof_and_config:&[u8; 32]) -> Vec<bool> {
	let mut builder = SubframeBuilder::new(tow_count, 4)
		.field(48, 50, 1)
		.field(50, 56, PAGE_25_SV_ID as i64);
	for (i, x) in antispoof_and_config.iter().enumerate() {
		builder = builder.field(56+(i*4), 60+(i*4), *x as i64);
	}
	builder.encode()
}

// A subframe 4 or 5 page that carries nothing the decoder keeps
pub fn filler(tow_count:u32, subframe_id:u8) -> Vec<bool> {
	SubframeBuilder::new(tow_count, subframe_id)
		.field(48, 50, 1)
		.field(50, 56, 57)
		.encode()
}

/// Subframes 1 through 5; the first HOW carries `tow_count`
pub fn frame(tow_count:u32, iode:u8, sv_health:u8) -> Vec<bool> {
	[subframe1(tow_count, iode as u16, sv_health),
	 subframe2(tow_count + 1, iode),
	 subframe3(tow_count + 2, iode),
	 filler(tow_count + 3, 4),
	 filler(tow_count + 4, 5)].concat()
}

pub fn to_soft_bits(bits:&[bool], invert:bool) -> Vec<i8> {
	bits.iter().map(|b| if b ^ invert { 100 } else { -100 }).collect()
}
