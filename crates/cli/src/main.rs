//! Parking lot directory client.
//!
//! Reads companion messages as JSON objects, one per line, from stdin. Each
//! line is packed into the binary envelope and handed to the directory
//! service, exactly as a frame from the real channel would be. Metadata
//! requests come back out on stdout as JSON lines; the list and detail card
//! are drawn on stderr whenever they change.

mod paths;
mod surface;

use std::path::PathBuf;

use clap::Parser;
use parkwatch_directory::{DirectoryHandle, DirectoryService, SyncConfig, builtin};
use parkwatch_proto::{Dictionary, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::surface::TextSurface;

/// Requests buffered between the service and the stdout writer.
const OUTBOX_QUEUE: usize = 64;

/// Client command line arguments.
#[derive(Parser, Debug)]
#[command(name = "parkwatch")]
#[command(about = "Parking lot occupancy client for a JSON-lines companion feed")]
struct Args {
	/// Sync policy file (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Start from the built-in Amsterdam lot table
	#[arg(long)]
	seed_builtin: bool,

	/// Lot shown in the detail card
	#[arg(short, long, value_name = "ID")]
	detail: Option<u8>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match args.config.or_else(paths::default_config_path) {
		Some(path) => {
			info!(path = %path.display(), "loading sync config");
			SyncConfig::load(&path)?
		}
		None => SyncConfig::default(),
	};
	let inbound_limit = config.envelope.inbound_limit;

	let shutdown = CancellationToken::new();
	let (outbox, requests) = mpsc::channel(OUTBOX_QUEUE);
	let (handle, service) = DirectoryService::start(config, outbox, shutdown.clone());
	let writer = tokio::spawn(write_requests(requests));

	if args.seed_builtin {
		for msg in builtin::seed_messages() {
			handle.deliver(msg).await?;
		}
	}
	handle.select(args.detail).await?;

	let mut surface = TextSurface::new(std::io::stderr());
	redraw(&handle, &mut surface).await?;

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await? {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}
		match pack(line, inbound_limit) {
			Ok(frame) => handle.deliver_frame(frame).await?,
			Err(err) => tracing::warn!(error = %err, "companion line rejected"),
		}
		redraw(&handle, &mut surface).await?;
	}

	info!("companion feed closed");
	shutdown.cancel();
	let stats = service.await?;
	info!(
		accepted = stats.accepted,
		ignored = stats.ignored,
		dropped = stats.dropped,
		requests = stats.requests_sent,
		populated = stats.populated,
		len = stats.len,
		"directory session finished"
	);
	writer.await??;

	Ok(())
}

/// Converts one companion line into an envelope.
fn pack(line: &str, limit: usize) -> parkwatch_proto::Result<Vec<u8>> {
	let dict = json::from_json_str(line)?;
	Ok(dict.to_bytes(limit)?)
}

async fn redraw(handle: &DirectoryHandle, surface: &mut TextSurface<std::io::Stderr>) -> std::io::Result<()> {
	// A closed service means shutdown is underway; nothing left to draw.
	if let Ok(Some((frame, dirty))) = handle.poll_view().await {
		surface.draw(&frame, &dirty)?;
	}
	Ok(())
}

async fn write_requests(mut requests: mpsc::Receiver<Vec<u8>>) -> std::io::Result<()> {
	let mut stdout = tokio::io::stdout();
	while let Some(frame) = requests.recv().await {
		// Frames were produced by our own encoder; a parse failure is a bug.
		let dict = match Dictionary::from_bytes(&frame, usize::MAX) {
			Ok(dict) => dict,
			Err(err) => {
				tracing::error!(error = %err, "outgoing frame unreadable");
				continue;
			}
		};
		let mut line = json::to_json(&dict).to_string();
		line.push('\n');
		stdout.write_all(line.as_bytes()).await?;
		stdout.flush().await?;
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let default_filter = if verbose {
		"parkwatch=debug,parkwatch_directory=debug,info"
	} else {
		"parkwatch=info,parkwatch_directory=info,warn"
	};

	// PARKWATCH_LOG_DIR keeps stderr free for the surface.
	if let Some(log_dir) = std::env::var("PARKWATCH_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("parkwatch.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry().with(filter).with(file_layer).init();

			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
		.with_writer(std::io::stderr)
		.init();
}
