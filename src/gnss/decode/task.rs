
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::gnss::SignalId;
use crate::gnss::gps_l1_ca::ephemeris::Ephemeris;
use crate::gnss::receiver::Receiver;
use crate::gnss::tracking::{ChannelId, RuntimeState, TrackingChannelTable};

use super::{ChannelInfo, DecoderError};

pub const COMMAND_QUEUE_SIZE:usize = 256;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Command {
	/// Start a tracking channel on `sid` and bind a decoder to it
	Start{ channel:ChannelId, sid:SignalId },
	Stop(ChannelId),
	NavBit{ channel:ChannelId, soft_bit:i8 },
	SetRuntimeState{ channel:ChannelId, state:RuntimeState },
	/// Run one decode pass
	Tick,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Report {
	Enabled{ channel:ChannelId, sid:SignalId, slot:usize },
	EnableFailed{ channel:ChannelId, sid:SignalId, error:DecoderError },
	Ephemeris(Ephemeris),
	L2cCapability(u32),
}

/// Owns the receiver and the tracking table on a single task, so enables,
/// disables and decode passes are applied strictly in command order.
pub struct DecodeTask {
	pub tx_command:mpsc::Sender<Command>,
	pub rx_report: mpsc::UnboundedReceiver<Report>,
	handle:JoinHandle<(Receiver, TrackingChannelTable)>,
}

pub struct Shutdown {
	pub receiver:Receiver,
	pub channels:TrackingChannelTable,
	/// Reports not yet read when the task was shut down
	pub reports:Vec<Report>,
}

impl DecodeTask {

	pub fn spawn(receiver:Receiver, channels:TrackingChannelTable) -> Self {
		let (tx_command, mut rx_command) = mpsc::channel::<Command>(COMMAND_QUEUE_SIZE);
		let (tx_report, rx_report) = mpsc::unbounded_channel::<Report>();

		let handle = tokio::spawn(async move {
			let mut receiver = receiver;
			let mut channels = channels;
			let mut revision = receiver.ephemerides().revision();
			let mut mask = receiver.l2c_capability().mask();

			// Reports are best effort; nobody listening is not an error
			while let Some(command) = rx_command.recv().await {
				match command {
					Command::Start{ channel, sid } => {
						if !channels.start(channel, sid) {
							warn!(channel = channel.0, sid = %sid, "tracking channel unavailable");
							continue;
						}
						let _ = match receiver.enable(ChannelInfo{ tracking_channel: channel, sid }) {
							Ok(slot)   => tx_report.send(Report::Enabled{ channel, sid, slot }),
							Err(error) => tx_report.send(Report::EnableFailed{ channel, sid, error }),
						};
					},
					Command::Stop(channel) => {
						receiver.disable(channel);
						channels.stop(channel);
					},
					Command::NavBit{ channel, soft_bit } => {
						channels.push_nav_bit(channel, soft_bit);
					},
					Command::SetRuntimeState{ channel, state } => {
						if !channels.set_runtime_state(channel, state) {
							debug!(channel = channel.0, state = ?state, "runtime state not applied");
						}
					},
					Command::Tick => {
						receiver.tick(&mut channels);

						for eph in receiver.ephemerides().updated_since(revision) {
							let _ = tx_report.send(Report::Ephemeris(eph));
						}
						revision = receiver.ephemerides().revision();

						let new_mask = receiver.l2c_capability().mask();
						if new_mask != mask {
							mask = new_mask;
							let _ = tx_report.send(Report::L2cCapability(mask));
						}
					},
				}
			}

			(receiver, channels)
		});

		Self{ tx_command, rx_report, handle }
	}

	/// Closes the command queue, waits for every queued command to be applied
	/// and hands back what the task owned
	pub async fn shutdown(self) -> Result<Shutdown, JoinError> {
		let DecodeTask{ tx_command, mut rx_report, handle } = self;
		drop(tx_command);

		let (receiver, channels) = handle.await?;

		let mut reports = vec![];
		while let Ok(report) = rx_report.try_recv() {
			reports.push(report);
		}

		Ok(Shutdown{ receiver, channels, reports })
	}

}
