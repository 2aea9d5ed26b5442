use parkwatch_proto::CodecError;
use pretty_assertions::assert_eq;

use super::*;
use crate::config::RefetchPolicy;
use crate::projection::{Invalidation, RowSummary};

fn init(id: LotId, name: &str, capacity: &str) -> LotMessage {
	LotMessage::Init {
		id,
		name: LotName::truncating(name),
		capacity: Count::from_text(capacity),
	}
}

fn status(id: LotId, free: &str) -> LotMessage {
	LotMessage::Status {
		id,
		free: Count::from_text(free),
	}
}

fn sized(len: u8) -> SyncState {
	let mut state = SyncState::default();
	state.apply(LotMessage::Allocate { total_count: len }).unwrap();
	state.clear_dirty();
	state
}

fn with_config(config: SyncConfig, len: u8) -> SyncState {
	let mut state = SyncState::new(config);
	state.apply(LotMessage::Allocate { total_count: len }).unwrap();
	state
}

#[test]
fn test_messages_before_allocation_are_dropped() {
	let mut state = SyncState::default();
	assert_eq!(state.apply(status(0, "3")), Err(SyncError::NotReady { id: 0 }));
	assert_eq!(
		state.apply(init(0, "A", "10")),
		Err(SyncError::NotReady { id: 0 })
	);
	assert_eq!(state.projection().row_count(), 0);
	assert!(state.take_outgoing().is_empty());
	assert!(!state.projection().is_dirty());
}

#[test]
fn test_allocation_sizes_once() {
	let mut state = SyncState::default();
	assert_eq!(
		state.apply(LotMessage::Allocate { total_count: 3 }),
		Ok(Applied::Sized { len: 3 })
	);
	assert_eq!(state.clear_dirty().flags, Invalidation::ROW_COUNT);

	assert_eq!(
		state.apply(LotMessage::Allocate { total_count: 10 }),
		Err(SyncError::AlreadyAllocated { len: 3, requested: 10 })
	);
	assert_eq!(state.projection().row_count(), 3);
	assert!(!state.projection().is_dirty());
}

#[test]
fn test_status_for_absent_lot_requests_metadata_once() {
	let mut state = sized(4);

	assert_eq!(state.apply(status(1, "9")), Ok(Applied::FetchRequested { id: 1 }));
	assert_eq!(state.phase(1), Some(LotPhase::FetchRequested));
	assert_eq!(state.registry().get(1), None);

	assert_eq!(state.apply(status(1, "8")), Ok(Applied::AwaitingInit { id: 1 }));
	assert_eq!(state.take_outgoing(), vec![LotMessage::RequestInit { id: 1 }]);
	assert_eq!(state.registry().get(1), None);
	assert!(!state.projection().is_dirty());
}

#[test]
fn test_init_for_absent_lot_populates_directly() {
	let mut state = sized(2);
	assert_eq!(
		state.apply(init(0, "Lot A", "1500")),
		Ok(Applied::Populated {
			id: 0,
			with_buffered_status: false,
		})
	);
	assert_eq!(state.phase(0), Some(LotPhase::Populated));
	assert!(state.registry().get(0).unwrap().free().is_zero());
	assert!(state.take_outgoing().is_empty());
	assert_eq!(state.clear_dirty().rows, vec![0]);
}

#[test]
fn test_init_answers_pending_fetch() {
	let mut state = sized(2);
	state.apply(status(1, "40")).unwrap();
	state.apply(init(1, "Lot B", "300")).unwrap();

	assert_eq!(state.phase(1), Some(LotPhase::Populated));
	assert!(state.pending_ids().is_empty());
	// Default policy drops the early reading.
	assert_eq!(state.registry().get(1).unwrap().free().as_str(), "0");
}

#[test]
fn test_populated_metadata_is_immutable() {
	let mut state = sized(1);
	state.apply(init(0, "Original", "100")).unwrap();
	state.clear_dirty();

	assert_eq!(state.apply(init(0, "Impostor", "5")), Ok(Applied::Duplicate { id: 0 }));
	let record = state.registry().get(0).unwrap();
	assert_eq!(record.name().as_str(), "Original");
	assert_eq!(record.capacity().as_str(), "100");
	assert!(!state.projection().is_dirty());
}

#[test]
fn test_status_updates_populated_lot() {
	let mut state = sized(1);
	state.apply(init(0, "Lot A", "1500")).unwrap();
	state.clear_dirty();

	assert_eq!(state.apply(status(0, "0")), Ok(Applied::Updated { id: 0 }));
	assert_eq!(state.projection().detail(0).unwrap().free_display, "Full");
	assert!(state.projection().is_dirty());

	state.apply(status(0, "37")).unwrap();
	assert_eq!(state.projection().detail(0).unwrap().free_display, "37");
}

#[test]
fn test_boundary_id_is_out_of_range() {
	let mut state = sized(3);
	assert_eq!(
		state.apply(status(3, "1")),
		Err(SyncError::OutOfRange { id: 3, len: 3 })
	);
	assert_eq!(
		state.apply(init(3, "X", "1")),
		Err(SyncError::OutOfRange { id: 3, len: 3 })
	);
	assert_eq!(state.registry().populated(), 0);
	assert!(state.take_outgoing().is_empty());
	assert_eq!(state.phase(3), None);
}

#[test]
fn test_echoed_request_is_rejected() {
	let mut state = sized(3);
	assert_eq!(
		state.apply(LotMessage::RequestInit { id: 1 }),
		Err(SyncError::UnexpectedRequest { id: 1 })
	);
	assert_eq!(state.phase(1), Some(LotPhase::Absent));
}

#[test]
fn test_malformed_frame_is_dropped() {
	let mut state = sized(3);
	assert!(matches!(
		state.apply_frame(&[1, 0, 0]),
		Err(SyncError::MalformedMessage(CodecError::Envelope(_)))
	));
	assert_eq!(state.registry().populated(), 0);
}

#[test]
fn test_frame_path_applies_status() {
	let mut state = sized(3);
	state.apply(init(2, "Lot C", "50")).unwrap();
	let frame = status(2, "12").encode_frame(80).unwrap();
	assert_eq!(state.apply_frame(&frame), Ok(Applied::Updated { id: 2 }));
	assert_eq!(
		state.projection().row_summary(2),
		Some(RowSummary {
			name: "Lot C".into(),
			free_over_capacity: "12/50".into(),
		})
	);
}

#[test]
fn test_buffer_latest_applies_last_pending_status() {
	let config = SyncConfig {
		pending_status: PendingStatusPolicy::BufferLatest,
		..SyncConfig::default()
	};
	let mut state = with_config(config, 2);
	state.apply(status(1, "10")).unwrap();
	state.apply(status(1, "11")).unwrap();

	assert_eq!(
		state.apply(init(1, "Lot B", "20")),
		Ok(Applied::Populated {
			id: 1,
			with_buffered_status: true,
		})
	);
	assert_eq!(state.registry().get(1).unwrap().free().as_str(), "11");
	assert_eq!(state.take_outgoing().len(), 1);
}

#[test]
fn test_refetch_after_stale_updates_is_bounded() {
	let config = SyncConfig {
		refetch: RefetchPolicy {
			after_stale_status: 2,
			max_requests: 2,
		},
		..SyncConfig::default()
	};
	let mut state = with_config(config, 1);

	assert_eq!(state.apply(status(0, "1")), Ok(Applied::FetchRequested { id: 0 }));
	assert_eq!(state.apply(status(0, "1")), Ok(Applied::AwaitingInit { id: 0 }));
	assert_eq!(
		state.apply(status(0, "1")),
		Ok(Applied::Refetched { id: 0, attempt: 2 })
	);
	for _ in 0..6 {
		assert_eq!(state.apply(status(0, "1")), Ok(Applied::AwaitingInit { id: 0 }));
	}
	assert_eq!(
		state.take_outgoing(),
		vec![LotMessage::RequestInit { id: 0 }, LotMessage::RequestInit { id: 0 }]
	);
}

#[test]
fn test_undelivered_request_is_asked_again() {
	let mut state = sized(2);
	assert_eq!(state.apply(status(1, "4")), Ok(Applied::FetchRequested { id: 1 }));
	assert_eq!(state.take_outgoing(), vec![LotMessage::RequestInit { id: 1 }]);

	state.request_failed(1);
	assert_eq!(state.phase(1), Some(LotPhase::Absent));
	assert_eq!(state.apply(status(1, "4")), Ok(Applied::FetchRequested { id: 1 }));
	assert_eq!(state.take_outgoing(), vec![LotMessage::RequestInit { id: 1 }]);

	state.apply(init(1, "Lot B", "100")).unwrap();
	state.request_failed(1);
	assert_eq!(state.phase(1), Some(LotPhase::Populated));
}

#[test]
fn test_undelivered_refetch_gives_back_attempt() {
	let config = SyncConfig {
		refetch: RefetchPolicy {
			after_stale_status: 2,
			max_requests: 2,
		},
		..SyncConfig::default()
	};
	let mut state = with_config(config, 1);
	state.apply(status(0, "1")).unwrap();
	state.apply(status(0, "1")).unwrap();
	assert_eq!(
		state.apply(status(0, "1")),
		Ok(Applied::Refetched { id: 0, attempt: 2 })
	);

	state.request_failed(0);
	assert_eq!(state.phase(0), Some(LotPhase::FetchRequested));
	assert_eq!(state.apply(status(0, "1")), Ok(Applied::AwaitingInit { id: 0 }));
	assert_eq!(
		state.apply(status(0, "1")),
		Ok(Applied::Refetched { id: 0, attempt: 2 })
	);
}

#[test]
fn test_selected_lot_update_dirties_detail() {
	let mut state = sized(2);
	state.apply(init(1, "Lot B", "20")).unwrap();
	state.select(Some(1));
	state.clear_dirty();

	state.apply(status(0, "3")).unwrap();
	assert!(!state.projection().is_dirty());

	state.apply(status(1, "3")).unwrap();
	let dirty = state.clear_dirty();
	assert_eq!(dirty.flags, Invalidation::ROWS | Invalidation::DETAIL);
	assert_eq!(dirty.rows, vec![1]);
	assert_eq!(state.projection().selected_detail().unwrap().free_display, "3");
}
