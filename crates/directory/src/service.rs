//! Directory actor.
//!
//! One task owns the [`SyncState`]. Transport frames, selection changes, and
//! view reads all arrive as commands on a bounded channel, so each message is
//! applied to completion before the next one is looked at.

use parkwatch_proto::{LotId, LotMessage};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::error::{ServiceError, SyncError};
use crate::projection::{Dirty, ViewFrame};
use crate::sync::{Applied, SyncState};

/// Capacity of the command channel.
const COMMAND_QUEUE: usize = 256;

/// Commands for the directory service actor.
#[derive(Debug)]
pub enum DirectoryCmd {
	/// A raw envelope from the transport.
	Frame {
		/// Encoded dictionary.
		bytes: Vec<u8>,
	},
	/// An already decoded message, e.g. from a built-in seed.
	Message {
		/// The message to apply.
		msg: LotMessage,
	},
	/// Change the detail selection.
	Select {
		/// Lot to show, or `None` to close the card.
		id: Option<LotId>,
	},
	/// Read the view only if it changed since the last poll.
	PollView {
		/// Reply channel for the frame and what changed.
		reply: oneshot::Sender<Option<(ViewFrame, Dirty)>>,
	},
	/// Read the view unconditionally, leaving the dirty state alone.
	View {
		/// Reply channel for the frame.
		reply: oneshot::Sender<ViewFrame>,
	},
	/// Read run counters.
	Stats {
		/// Reply channel for the counters.
		reply: oneshot::Sender<DirectoryStats>,
	},
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
	/// Messages that changed or confirmed state.
	pub accepted: u64,
	/// Messages skipped as ordering or redelivery noise.
	pub ignored: u64,
	/// Messages dropped with an error.
	pub dropped: u64,
	/// Metadata requests handed to the outbox.
	pub requests_sent: u64,
	/// Requests that could not be encoded or delivered.
	pub requests_failed: u64,
	/// Directory size.
	pub len: usize,
	/// Populated lots.
	pub populated: usize,
}

/// Handle for communicating with the [`DirectoryService`].
#[derive(Clone, Debug)]
pub struct DirectoryHandle {
	tx: mpsc::Sender<DirectoryCmd>,
}

impl DirectoryHandle {
	/// Wraps a command sender in a typed handle.
	pub fn new(tx: mpsc::Sender<DirectoryCmd>) -> Self {
		Self { tx }
	}

	/// Delivers a raw frame from the transport.
	pub async fn deliver_frame(&self, bytes: Vec<u8>) -> Result<(), ServiceError> {
		self.send(DirectoryCmd::Frame { bytes }).await
	}

	/// Delivers a decoded message.
	pub async fn deliver(&self, msg: LotMessage) -> Result<(), ServiceError> {
		self.send(DirectoryCmd::Message { msg }).await
	}

	/// Changes the detail selection.
	pub async fn select(&self, id: Option<LotId>) -> Result<(), ServiceError> {
		self.send(DirectoryCmd::Select { id }).await
	}

	/// Returns a frame if anything changed since the last poll, clearing the
	/// dirty state.
	pub async fn poll_view(&self) -> Result<Option<(ViewFrame, Dirty)>, ServiceError> {
		let (reply, rx) = oneshot::channel();
		self.send(DirectoryCmd::PollView { reply }).await?;
		rx.await.map_err(|_| ServiceError::Closed)
	}

	/// Returns the current frame.
	pub async fn view(&self) -> Result<ViewFrame, ServiceError> {
		let (reply, rx) = oneshot::channel();
		self.send(DirectoryCmd::View { reply }).await?;
		rx.await.map_err(|_| ServiceError::Closed)
	}

	/// Returns run counters.
	pub async fn stats(&self) -> Result<DirectoryStats, ServiceError> {
		let (reply, rx) = oneshot::channel();
		self.send(DirectoryCmd::Stats { reply }).await?;
		rx.await.map_err(|_| ServiceError::Closed)
	}

	async fn send(&self, cmd: DirectoryCmd) -> Result<(), ServiceError> {
		self.tx.send(cmd).await.map_err(|_| ServiceError::Closed)
	}
}

/// Actor owning the directory state.
///
/// Outgoing metadata requests are encoded against the configured outbound
/// limit and pushed to the outbox. A request the outbox refuses is handed
/// back to the state, so the lot's next status asks again.
pub struct DirectoryService {
	rx: mpsc::Receiver<DirectoryCmd>,
	state: SyncState,
	outbox: mpsc::Sender<Vec<u8>>,
	stats: DirectoryStats,
}

impl DirectoryService {
	/// Spawns the service actor on the current runtime.
	///
	/// The task ends when every handle is dropped or `shutdown` fires.
	pub fn start(
		config: SyncConfig,
		outbox: mpsc::Sender<Vec<u8>>,
		shutdown: CancellationToken,
	) -> (DirectoryHandle, JoinHandle<DirectoryStats>) {
		let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
		let service = Self {
			rx,
			state: SyncState::new(config),
			outbox,
			stats: DirectoryStats::default(),
		};
		let task = tokio::spawn(service.run(shutdown));
		(DirectoryHandle::new(tx), task)
	}

	async fn run(mut self, shutdown: CancellationToken) -> DirectoryStats {
		loop {
			tokio::select! {
				_ = shutdown.cancelled() => break,
				cmd = self.rx.recv() => {
					let Some(cmd) = cmd else {
						break;
					};
					self.handle(cmd);
				}
			}
		}
		tracing::debug!(stats = ?self.stats(), "directory service stopped");
		self.stats()
	}

	fn handle(&mut self, cmd: DirectoryCmd) {
		match cmd {
			DirectoryCmd::Frame { bytes } => {
				let result = self.state.apply_frame(&bytes);
				self.record(result);
			}
			DirectoryCmd::Message { msg } => {
				let result = self.state.apply(msg);
				self.record(result);
			}
			DirectoryCmd::Select { id } => self.state.select(id),
			DirectoryCmd::PollView { reply } => {
				let frame = self
					.state
					.projection()
					.is_dirty()
					.then(|| (self.state.projection().frame(), self.state.clear_dirty()));
				let _ = reply.send(frame);
			}
			DirectoryCmd::View { reply } => {
				let _ = reply.send(self.state.projection().frame());
			}
			DirectoryCmd::Stats { reply } => {
				let _ = reply.send(self.stats());
			}
		}
	}

	fn record(&mut self, result: Result<Applied, SyncError>) {
		match result {
			Ok(applied) => {
				self.stats.accepted += 1;
				tracing::trace!(?applied, "message applied");
			}
			Err(err) if err.is_benign() => {
				self.stats.ignored += 1;
				tracing::debug!(error = %err, "message ignored");
			}
			Err(err) => {
				self.stats.dropped += 1;
				tracing::warn!(error = %err, "message dropped");
			}
		}
		self.flush_outgoing();
	}

	fn flush_outgoing(&mut self) {
		let limit = self.state.config().envelope.outbound_limit;
		for msg in self.state.take_outgoing() {
			let frame = match msg.encode_frame(limit) {
				Ok(frame) => frame,
				Err(err) => {
					self.stats.requests_failed += 1;
					tracing::warn!(error = %err, id = ?msg.id(), "outgoing request not encodable");
					continue;
				}
			};
			match self.outbox.try_send(frame) {
				Ok(()) => self.stats.requests_sent += 1,
				Err(err) => {
					self.stats.requests_failed += 1;
					tracing::warn!(error = %err, id = ?msg.id(), "outgoing request not delivered");
					if let Some(id) = msg.id() {
						self.state.request_failed(id);
					}
				}
			}
		}
	}

	fn stats(&self) -> DirectoryStats {
		DirectoryStats {
			len: self.state.registry().len(),
			populated: self.state.registry().populated(),
			..self.stats
		}
	}
}
