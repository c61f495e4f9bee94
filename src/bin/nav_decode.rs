
extern crate clap;
extern crate colored;
extern crate nav_decode;
extern crate serde_json;

use std::collections::HashMap;
use std::error::Error;

use clap::{Arg, App};
use colored::*;
use tracing_subscriber::EnvFilter;

use nav_decode::config::DecoderConfig;
use nav_decode::gnss::SignalId;
use nav_decode::gnss::decode::task::{Command, DecodeTask, Report, Shutdown};
use nav_decode::gnss::receiver::Receiver;
use nav_decode::gnss::tracking::{ChannelId, TrackingChannelTable};
use nav_decode::io::BitLogSource;

fn print_report(report:&Report) {
	match report {
		Report::Enabled{ channel, sid, slot } =>
			eprintln!("{}", format!("  {}: decoding on {}, slot {}", sid, channel, slot).green()),
		Report::EnableFailed{ channel, sid, error } =>
			eprintln!("{}", format!("  {}: tracking on {} without decode ({})", sid, channel, error).yellow()),
		Report::Ephemeris(eph) =>
			eprintln!("{}", format!("  {}: ephemeris IODE {}, toe {} [sec], healthy={}", eph.sid, eph.iode, eph.t_oe, eph.healthy).blue()),
		Report::L2cCapability(mask) =>
			eprintln!("{}", format!("  L2C capability mask {:#010x}", mask).cyan()),
	}
}

#[tokio::main]
async fn main() {
	let matches = App::new("GPS L1 C/A Navigation Decode")
		.version("0.1.0")
		.author("John Stanford (johnwstanford@gmail.com)")
		.about("Replays a log of tracked GPS L1 C/A nav bits through the decoder pool and prints the ephemerides as JSON")
		.arg(Arg::with_name("filename")
			.short("f").long("filename")
			.help("Bit log with one (prn: u8, prompt_i: i16 LE) record per bit")
			.required(true).takes_value(true))
		.arg(Arg::with_name("config")
			.short("c").long("config")
			.help("TOML decoder configuration")
			.takes_value(true))
		.arg(Arg::with_name("decoders")
			.short("d").long("decoders")
			.help("Number of GPS L1 C/A decoders; overrides the config file")
			.takes_value(true))
		.arg(Arg::with_name("log_level")
			.short("l").long("log_level")
			.takes_value(true)
			.possible_values(&["trace", "debug", "info", "warn", "error"]))
		.get_matches();

	if let Err(e) = run(&matches).await {
		eprintln!("{}", format!("Error: {}", e).red());
		std::process::exit(1);
	}
}

async fn run(matches:&clap::ArgMatches<'_>) -> Result<(), Box<dyn Error>> {
	let mut config = match matches.value_of("config") {
		Some(path) => DecoderConfig::load(path)?,
		None       => DecoderConfig::default(),
	};
	if let Some(n) = matches.value_of("decoders") {
		config.gps_l1ca_decoders = n.parse()?;
	}
	if let Some(level) = matches.value_of("log_level") {
		config.log.level = level.to_string();
	}
	config.validate()?;

	// STDOUT is reserved for the JSON output
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.init();

	let fname:&str = matches.value_of("filename").ok_or("missing filename")?;
	let source = BitLogSource::open(fname)?;
	eprintln!("Decoding {} with {} decoders on {} tracking channels", &fname, config.gps_l1ca_decoders, config.tracking_channels);

	let receiver = Receiver::new(&config)?;
	let channels = TrackingChannelTable::new(config.tracking_channels, config.nav_bit_fifo_size);
	let mut task = DecodeTask::spawn(receiver, channels);

	let mut channel_of:HashMap<u8, Option<ChannelId>> = HashMap::new();
	for (record, idx) in source {
		// Channels are handed out in order of first appearance
		let channel = match channel_of.get(&record.prn) {
			Some(channel) => *channel,
			None => {
				let assigned = channel_of.values().filter(|c| c.is_some()).count();
				let channel = if assigned < config.tracking_channels {
					let channel = ChannelId(assigned);
					task.tx_command.send(Command::Start{ channel, sid: SignalId::gps_l1_ca(record.prn as u16) }).await
						.map_err(|_| "decode task stopped")?;
					Some(channel)
				} else {
					eprintln!("{}", format!("  PRN {}: no tracking channel available, skipping", record.prn).red());
					None
				};
				channel_of.insert(record.prn, channel);
				channel
			}
		};

		if let Some(channel) = channel {
			task.tx_command.send(Command::NavBit{ channel, soft_bit: record.soft_bit }).await
				.map_err(|_| "decode task stopped")?;
		}

		if idx % config.tick_interval_bits == config.tick_interval_bits - 1 {
			task.tx_command.send(Command::Tick).await.map_err(|_| "decode task stopped")?;
			while let Ok(report) = task.rx_report.try_recv() {
				print_report(&report);
			}
		}
	}
	task.tx_command.send(Command::Tick).await.map_err(|_| "decode task stopped")?;

	let Shutdown{ receiver, channels, reports } = task.shutdown().await?;
	for report in &reports {
		print_report(report);
	}
	for prn_channel in channel_of.values().filter_map(|c| *c) {
		let dropped = channels.dropped_bits(prn_channel);
		if dropped > 0 {
			eprintln!("{}", format!("  {}: {} nav bits dropped", prn_channel, dropped).red());
		}
	}

	// This is the only output to STDOUT so the results can be piped to a JSON file
	println!("{}", serde_json::to_string_pretty(&receiver.ephemerides().snapshot())?);
	Ok(())
}
