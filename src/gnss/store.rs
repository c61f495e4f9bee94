
use std::collections::HashMap;

use tracing::{debug, info};

use crate::gnss::SignalId;
use crate::gnss::gps_l1_ca::ephemeris::Ephemeris;

pub trait EphemerisStore {

	/// Stores `eph` for `sid`; the store may refuse or normalize it, so read it back with `fetch`
	fn commit(&mut self, sid:SignalId, eph:&Ephemeris);

	fn fetch(&self, sid:SignalId) -> Option<Ephemeris>;

}

/// Process-wide capability mask, last writer wins
pub trait CapabilityStore {
	fn set_mask(&mut self, mask:u32);
}

#[derive(Debug, Default)]
pub struct EphemerisTable {
	entries:HashMap<SignalId, (Ephemeris, u64)>,
	revision:u64,
}

impl EphemerisTable {

	pub fn new() -> Self { Self::default() }

	pub fn len(&self) -> usize { self.entries.len() }
	pub fn is_empty(&self) -> bool { self.entries.is_empty() }

	/// Bumped on every commit that changes the table
	pub fn revision(&self) -> u64 { self.revision }

	/// Entries changed after `revision`, oldest change first
	pub fn updated_since(&self, revision:u64) -> Vec<Ephemeris> {
		let mut updated:Vec<&(Ephemeris, u64)> = self.entries.values().filter(|(_, rev)| *rev > revision).collect();
		updated.sort_by_key(|(_, rev)| *rev);
		updated.into_iter().map(|(eph, _)| *eph).collect()
	}

	/// All entries ordered by satellite
	pub fn snapshot(&self) -> Vec<Ephemeris> {
		let mut all:Vec<Ephemeris> = self.entries.values().map(|(eph, _)| *eph).collect();
		all.sort_by_key(|eph| (eph.sid.sat, eph.sid.code.band as u8));
		all
	}

}

impl EphemerisStore for EphemerisTable {

	fn commit(&mut self, sid:SignalId, eph:&Ephemeris) {
		if !eph.valid {
			debug!(sid = %sid, "ignoring invalid ephemeris");
			return;
		}

		if let Some((stored, _)) = self.entries.get(&sid) {
			if stored == eph { return; }
		}

		self.revision += 1;
		self.entries.insert(sid, (Ephemeris{ sid, ..*eph }, self.revision));
		info!(sid = %sid, iode = eph.iode, toe = eph.t_oe, "new ephemeris");
	}

	fn fetch(&self, sid:SignalId) -> Option<Ephemeris> {
		self.entries.get(&sid).map(|(eph, _)| *eph)
	}

}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct L2cCapability {
	mask:u32,
}

impl L2cCapability {

	pub fn mask(&self) -> u32 { self.mask }

	pub fn is_capable(&self, prn:u16) -> bool {
		(1..=32).contains(&prn) && (self.mask >> (prn - 1)) & 1 == 1
	}

}

impl CapabilityStore for L2cCapability {
	fn set_mask(&mut self, mask:u32) {
		if mask != self.mask {
			debug!(mask, "L2C capability updated");
		}
		self.mask = mask;
	}
}

#[cfg(test)]
mod tests {

	use super::*;
	use crate::gnss::decode::tests::test_ephemeris;

	#[test]
	fn commit_then_fetch() {
		let mut table = EphemerisTable::new();
		let sid = SignalId::gps_l1_ca(8);
		let eph = test_ephemeris(sid, true);

		table.commit(sid, &eph);
		assert_eq!(table.fetch(sid), Some(eph));
		assert_eq!(table.revision(), 1);
		assert_eq!(table.fetch(SignalId::gps_l1_ca(9)), None);
	}

	#[test]
	fn identical_commit_keeps_revision() {
		let mut table = EphemerisTable::new();
		let sid = SignalId::gps_l1_ca(8);
		let eph = test_ephemeris(sid, true);
		table.commit(sid, &eph);
		table.commit(sid, &eph);
		assert_eq!(table.revision(), 1);

		let newer = Ephemeris{ iode: eph.iode + 1, ..eph };
		table.commit(sid, &newer);
		assert_eq!(table.revision(), 2);
		assert_eq!(table.updated_since(1), vec![newer]);
	}

	#[test]
	fn invalid_ephemeris_is_refused() {
		let mut table = EphemerisTable::new();
		let sid = SignalId::gps_l1_ca(8);
		let eph = Ephemeris{ valid: false, ..test_ephemeris(sid, true) };
		table.commit(sid, &eph);
		assert!(table.is_empty());
	}

	#[test]
	fn l2c_mask_last_writer_wins() {
		let mut caps = L2cCapability::default();
		caps.set_mask(0b101);
		caps.set_mask(0b010);
		assert_eq!(caps.mask(), 0b010);
		assert!(caps.is_capable(2));
		assert!(!caps.is_capable(1));
		assert!(!caps.is_capable(0));
		assert!(!caps.is_capable(33));
	}

}
