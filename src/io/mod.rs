
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::warn;

/// Bytes per record: PRN followed by the in-phase prompt correlator output
pub const RECORD_SIZE:usize = 3;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct BitRecord {
	pub prn:u8,
	pub soft_bit:i8,
}

impl BitRecord {

	pub fn from_prompt(prn:u8, prompt_i:i16) -> Self {
		Self{ prn, soft_bit: (prompt_i / 256) as i8 }
	}

}

/// Reads a recorded log of per-satellite nav bits, one `(prn: u8, prompt_i: i16 LE)`
/// record per bit. Yields each record with its index in the log.
pub struct BitLogSource<S: Read> {
	src:S,
	idx:usize,
}

impl BitLogSource<BufReader<File>> {

	pub fn open<P: AsRef<Path>>(path:P) -> io::Result<Self> {
		Ok(Self::new(BufReader::new(File::open(path)?)))
	}

}

impl<S: Read> BitLogSource<S> {

	pub fn new(src:S) -> Self { Self{ src, idx: 0 } }

	fn read_record(&mut self) -> io::Result<BitRecord> {
		let prn = self.src.read_u8()?;
		let prompt_i = self.src.read_i16::<LittleEndian>()?;
		Ok(BitRecord::from_prompt(prn, prompt_i))
	}

}

impl<S: Read> Iterator for BitLogSource<S> {
	type Item = (BitRecord, usize);

	fn next(&mut self) -> Option<(BitRecord, usize)> {
		match self.read_record() {
			Ok(record) => {
				let ans = (record, self.idx);
				self.idx += 1;
				Some(ans)
			},
			// A trailing partial record is treated as the end of the log
			Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => None,
			Err(e) => {
				warn!(record = self.idx, error = %e, "unable to read bit log");
				None
			}
		}
	}
}
