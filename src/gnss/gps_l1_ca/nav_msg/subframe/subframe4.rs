use serde::{Serialize, Deserialize};

use crate::DigSigProcErr;
use crate::utils::bools_to_int;

pub const PAGE_25_SV_ID:u8 = 63;

#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct Body {
	pub data_id:u8,
	pub sv_id:u8,
	pub page:Page
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub enum Page {
	// 4-bit anti-spoofing flag + configuration code for PRN 1-32, health for PRN 25-32
	Page25{ antispoof_and_config:[u8; 32], sv_health:[u8; 8] },
	Other,
}

impl Body {

	pub fn new(bits:&[bool; 240]) -> Result<Body, DigSigProcErr> {
		let data_id:u8 = bools_to_int::to_u8(&bits[48..50])?;
		let sv_id:u8   = bools_to_int::to_u8(&bits[50..56])?;
		let page:Page = match sv_id {
			PAGE_25_SV_ID => {
				let mut antispoof_and_config:[u8; 32] = [0; 32];
				for (i, x) in antispoof_and_config.iter_mut().enumerate() {
					*x = bools_to_int::to_u8(&bits[(56+(i*4))..(60+(i*4))])?;
				}
				let mut sv_health:[u8; 8] = [0; 8];
				for (i, x) in sv_health.iter_mut().enumerate() {
					*x = bools_to_int::to_u8(&bits[(186+(i*6))..(192+(i*6))])?;
				}
				Page::Page25{ antispoof_and_config, sv_health }
			},
			_ => Page::Other,
		};

		Ok(Body{ data_id, sv_id, page })
	}

	/// Bit `prn-1` is set for every SV whose configuration code says it broadcasts L2C
	pub fn l2c_capability(&self) -> Option<u32> {
		match self.page {
			Page::Page25{ antispoof_and_config, .. } => Some(antispoof_and_config.iter().enumerate()
				.filter(|(_, x)| (2..=4).contains(&(*x & 0x7)))
				.fold(0u32, |mask, (i, _)| mask | (1 << i))),
			Page::Other => None,
		}
	}

}
