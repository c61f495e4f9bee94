use serde::{Serialize, Deserialize};

use crate::gnss::SignalId;
use crate::gnss::gps_l1_ca::nav_msg::subframe::{subframe1, subframe2, subframe3};

// Angles (m0, omega, omega0, omega_dot, i0, idot, dn) are kept in semicircles as broadcast
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub struct Ephemeris {
	pub sid:SignalId,
	pub healthy:bool,    pub valid:bool,
	pub sv_health:u8,    pub ura_index:u8,
	pub week_number:u16, pub t_gd:f64,	  pub aodo: u8,    pub fit_interval:bool,
	pub t_oc: f64,       pub a_f0: f64,   pub a_f1: f64,   pub a_f2: f64,
	pub t_oe: f64,       pub sqrt_a: f64, pub dn: f64,     pub m0: f64,
	pub e: f64,          pub omega: f64,  pub omega0: f64, pub omega_dot: f64,
	pub cus: f64,        pub cuc: f64,    pub crs: f64,    pub crc: f64,
	pub cis: f64,        pub cic: f64,    pub i0: f64,     pub idot: f64,
	pub iodc: u16,       pub iode: u8,
}

impl Ephemeris {

	/// Combines subframes 1-3 if they were broadcast for the same issue of data
	pub fn from_subframes(sid:SignalId, sf1:&subframe1::Body, sf2:&subframe2::Body, sf3:&subframe3::Body) -> Option<Ephemeris> {
		if (sf1.iodc % 256) != (sf2.iode as u16) || sf2.iode != sf3.iode {
			return None;
		}

		let valid = sf2.sqrt_a > 0.0 && sf1.t_oc != 0 && sf2.t_oe != 0.0;

		Some(Ephemeris{ sid, healthy: sf1.sv_health == 0, valid, sv_health: sf1.sv_health, ura_index: sf1.ura_index,
			week_number: sf1.week_number, t_gd: sf1.t_gd, aodo: sf2.aodo, fit_interval: sf2.fit_interval,
			t_oc: sf1.t_oc as f64, a_f0: sf1.a_f0, a_f1: sf1.a_f1, a_f2: sf1.a_f2,
			t_oe: sf2.t_oe, sqrt_a: sf2.sqrt_a, dn: sf2.dn, m0: sf2.m0,
			e: sf2.e, omega: sf3.omega, omega0: sf3.omega0, omega_dot: sf3.omega_dot,
			cus: sf2.cus, cuc: sf2.cuc, crs: sf2.crs, crc: sf3.crc,
			cis: sf3.cis, cic: sf3.cic, i0: sf3.i0, idot: sf3.idot,
			iodc: sf1.iodc, iode: sf2.iode })
	}

	// Curve fit interval in hours; the extended value depends on IODC but 6 covers the common case
	pub fn fit_interval_hours(&self) -> u8 { if self.fit_interval { 6 } else { 4 } }

}
