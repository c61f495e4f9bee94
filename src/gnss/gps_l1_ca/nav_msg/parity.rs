
use crate::DigSigProcErr;

pub const WORD_BITS:usize = 30;
pub const WORD_DATA_BITS:usize = 24;
pub const SUBFRAME_BITS:usize = 300;
pub const SUBFRAME_DATA_BITS:usize = 240;

/// Parity bits D25..D30 for source data bits d1..d24 (IS-GPS-200, Table 20-XIV)
pub fn parity_bits(d:&[bool], last_d29:bool, last_d30:bool) -> [bool; 6] {
	[
		last_d29 ^ d[0] ^ d[1] ^ d[2] ^ d[4] ^ d[5] ^ d[9]  ^ d[10] ^ d[11] ^ d[12] ^ d[13] ^ d[16] ^ d[17] ^ d[19] ^ d[22],
		last_d30 ^ d[1] ^ d[2] ^ d[3] ^ d[5] ^ d[6] ^ d[10] ^ d[11] ^ d[12] ^ d[13] ^ d[14] ^ d[17] ^ d[18] ^ d[20] ^ d[23],
		last_d29 ^ d[0] ^ d[2] ^ d[3] ^ d[4] ^ d[6] ^ d[7]  ^ d[11] ^ d[12] ^ d[13] ^ d[14] ^ d[15] ^ d[18] ^ d[19] ^ d[21],
		last_d30 ^ d[1] ^ d[3] ^ d[4] ^ d[5] ^ d[7] ^ d[8]  ^ d[12] ^ d[13] ^ d[14] ^ d[15] ^ d[16] ^ d[19] ^ d[20] ^ d[22],
		last_d30 ^ d[0] ^ d[2] ^ d[4] ^ d[5] ^ d[6] ^ d[8]  ^ d[9]  ^ d[13] ^ d[14] ^ d[15] ^ d[16] ^ d[17] ^ d[20] ^ d[21] ^ d[23],
		last_d29 ^ d[2] ^ d[4] ^ d[5] ^ d[7] ^ d[8] ^ d[9]  ^ d[10] ^ d[12] ^ d[14] ^ d[18] ^ d[21] ^ d[22] ^ d[23],
	]
}

/// Checks one transmitted 30-bit word given the last two bits of the previous word
pub fn check_word(word:&[bool], last_d29:bool, last_d30:bool) -> bool {
	if word.len() != WORD_BITS { return false; }

	let d:Vec<bool> = word.iter().take(WORD_DATA_BITS).map(|b| b ^ last_d30).collect();
	word[WORD_DATA_BITS..] == parity_bits(&d, last_d29, last_d30)
}

/// Checks all ten words of a polarity-corrected subframe and strips the parity bits
pub fn data_recover(subframe:&[bool]) -> Result<[bool; SUBFRAME_DATA_BITS], DigSigProcErr> {
	if subframe.len() != SUBFRAME_BITS {
		return Err(DigSigProcErr::InvalidTelemetryData("Expected a 300-bit subframe"));
	}

	let mut ans = [false; SUBFRAME_DATA_BITS];
	// The last word of every subframe ends in two zero parity bits
	let (mut last_d29, mut last_d30) = (false, false);
	for (word_idx, word) in subframe.chunks(WORD_BITS).enumerate() {
		if !check_word(word, last_d29, last_d30) {
			return Err(DigSigProcErr::ParityCheckFailed(word_idx));
		}
		for bit_idx in 0..WORD_DATA_BITS {
			ans[(WORD_DATA_BITS*word_idx) + bit_idx] = word[bit_idx] ^ last_d30;
		}
		last_d29 = word[28];
		last_d30 = word[29];
	}

	Ok(ans)
}
