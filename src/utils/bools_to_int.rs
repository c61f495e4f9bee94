
use crate::DigSigProcErr;

// Navigation message fields are transmitted MSB first; a field is a run of
// bools where index 0 is the most significant bit.

pub fn to_u32(bools:&[bool]) -> Result<u32, DigSigProcErr> {
	if bools.len() > 32 {
		return Err(DigSigProcErr::InvalidTelemetryData("field wider than 32 bits in bools_to_int::to_u32"));
	}
	Ok(bools.iter().fold(0u32, |acc, b| (acc << 1) | (*b as u32)))
}

// Two's complement, sign bit first
pub fn to_i32(bools:&[bool]) -> Result<i32, DigSigProcErr> {
	let n = bools.len();
	let raw = to_u32(bools)?;
	match n {
		0  => Ok(0),
		32 => Ok(raw as i32),
		_  => {
			let shift = 32 - n as u32;
			Ok(((raw << shift) as i32) >> shift)
		}
	}
}

pub fn to_u8(bools:&[bool]) -> Result<u8, DigSigProcErr> {
	if bools.len() > 8 { return Err(DigSigProcErr::InvalidTelemetryData("field wider than 8 bits in bools_to_int::to_u8")); }
	Ok(to_u32(bools)? as u8)
}

pub fn to_u16(bools:&[bool]) -> Result<u16, DigSigProcErr> {
	if bools.len() > 16 { return Err(DigSigProcErr::InvalidTelemetryData("field wider than 16 bits in bools_to_int::to_u16")); }
	Ok(to_u32(bools)? as u16)
}

pub fn to_i8(bools:&[bool]) -> Result<i8, DigSigProcErr> {
	if bools.len() > 8 { return Err(DigSigProcErr::InvalidTelemetryData("field wider than 8 bits in bools_to_int::to_i8")); }
	Ok(to_i32(bools)? as i8)
}

pub fn to_i16(bools:&[bool]) -> Result<i16, DigSigProcErr> {
	if bools.len() > 16 { return Err(DigSigProcErr::InvalidTelemetryData("field wider than 16 bits in bools_to_int::to_i16")); }
	Ok(to_i32(bools)? as i16)
}

/// Writes the low `bits.len()` bits of `value` into `bits`, MSB first. Negative
/// values are written in two's complement.
pub fn write_i64(bits:&mut [bool], value:i64) {
	let n = bits.len();
	for (i, b) in bits.iter_mut().enumerate() {
		*b = (value >> (n - i - 1)) & 1 == 1;
	}
}
