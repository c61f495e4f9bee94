
use std::fmt;

use serde::{Serialize, Deserialize};

pub mod decode;
pub mod gps_l1_ca;
pub mod receiver;
pub mod store;
pub mod tracking;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Constellation {
	Gps,
	Sbas,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Band {
	L1,
	L2,
}

/// Selects the decode algorithm and bit format for a signal
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SignalType {
	pub constellation:Constellation,
	pub band:Band,
}

pub const GPS_L1_CA:SignalType = SignalType{ constellation: Constellation::Gps, band: Band::L1 };

/// A signal from one transmitter
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SignalId {
	pub sat:u16,
	pub code:SignalType,
}

impl SignalId {

	pub fn new(code:SignalType, sat:u16) -> Self { Self{ sat, code } }

	pub fn gps_l1_ca(prn:u16) -> Self { Self::new(GPS_L1_CA, prn) }

}

impl fmt::Display for Constellation {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
		match self {
			Constellation::Gps  => write!(f, "GPS"),
			Constellation::Sbas => write!(f, "SBAS"),
		}
	}
}

impl fmt::Display for Band {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
		match self {
			Band::L1 => write!(f, "L1"),
			Band::L2 => write!(f, "L2"),
		}
	}
}

impl fmt::Display for SignalType {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} {}", self.constellation, self.band)
	}
}

impl fmt::Display for SignalId {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} {}", self.code, self.sat)
	}
}

#[test]
fn signal_id_display() {
	assert_eq!(format!("{}", SignalId::gps_l1_ca(12)), "GPS L1 12");
	assert_eq!(format!("{}", SignalId::new(SignalType{ constellation: Constellation::Sbas, band: Band::L1 }, 131)), "SBAS L1 131");
}
