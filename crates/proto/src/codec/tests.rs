use pretty_assertions::assert_eq;

use super::*;
use crate::{DEFAULT_INBOUND_LIMIT, DEFAULT_OUTBOUND_LIMIT};

fn kind(kind: MessageKind) -> Dictionary {
	Dictionary::new().with(MessageKey::Kind, kind.raw())
}

#[test]
fn test_decode_allocate() {
	let dict = kind(MessageKind::Allocate).with(MessageKey::Count, 36u8);
	assert_eq!(LotMessage::decode(&dict), Ok(LotMessage::Allocate { total_count: 36 }));
}

#[test]
fn test_decode_init_accepts_integer_capacity() {
	let dict = kind(MessageKind::Init)
		.with(MessageKey::Id, 2u8)
		.with(MessageKey::Name, "ZO-P05 Villa ArenA")
		.with(MessageKey::Total, 1500u32);
	assert_eq!(
		LotMessage::decode(&dict),
		Ok(LotMessage::Init {
			id: 2,
			name: LotName::truncating("ZO-P05 Villa ArenA"),
			capacity: Count::from_text("1500"),
		})
	);
}

#[test]
fn test_decode_status_accepts_string_or_signed_free() {
	let dict = kind(MessageKind::Status).with(MessageKey::Id, 4u8).with(MessageKey::Free, "37");
	assert_eq!(
		LotMessage::decode(&dict),
		Ok(LotMessage::Status {
			id: 4,
			free: Count::from_text("37"),
		})
	);

	let dict = kind(MessageKind::Status).with(MessageKey::Id, 4u8).with(MessageKey::Free, -3i32);
	assert_eq!(
		LotMessage::decode(&dict),
		Ok(LotMessage::Status {
			id: 4,
			free: Count::from_text("-3"),
		})
	);
}

#[test]
fn test_long_name_is_truncated_not_rejected() {
	let long = "CE-P10 Stadhuis Muziektheater en nog veel meer tekst";
	let dict = kind(MessageKind::Init)
		.with(MessageKey::Id, 1u8)
		.with(MessageKey::Name, long)
		.with(MessageKey::Total, "900");
	let Ok(LotMessage::Init { name, .. }) = LotMessage::decode(&dict) else {
		panic!("expected init");
	};
	assert_eq!(name.len(), crate::text::NAME_CAPACITY);
	assert!(long.starts_with(name.as_str()));
}

#[test]
fn test_missing_kind() {
	let dict = Dictionary::new().with(MessageKey::Id, 1u8).with(MessageKey::Free, "3");
	assert_eq!(LotMessage::decode(&dict), Err(CodecError::MissingKind));
}

#[test]
fn test_unknown_kind() {
	let dict = Dictionary::new().with(MessageKey::Kind, 17u8);
	assert_eq!(LotMessage::decode(&dict), Err(CodecError::UnknownKind(17)));

	let dict = Dictionary::new().with(MessageKey::Kind, -2i32);
	let err = LotMessage::decode(&dict).unwrap_err();
	assert_eq!(err, CodecError::UnknownKind(-2));
	assert_eq!(err.to_string(), "unrecognized message kind -2");
}

#[test]
fn test_large_counts_kept_whole() {
	let dict = kind(MessageKind::Status).with(MessageKey::Id, 0u8).with(MessageKey::Free, 12_345_678u32);
	assert_eq!(
		LotMessage::decode(&dict),
		Ok(LotMessage::Status {
			id: 0,
			free: Count::from_text("12345678"),
		})
	);

	let dict = kind(MessageKind::Init)
		.with(MessageKey::Id, 0u8)
		.with(MessageKey::Name, "P1")
		.with(MessageKey::Total, "99999999");
	let Ok(LotMessage::Init { capacity, .. }) = LotMessage::decode(&dict) else {
		panic!("expected init");
	};
	assert_eq!(capacity.as_str(), "99999999");
}

#[test]
fn test_overlong_count_text_is_rejected() {
	let text = "1".repeat(COUNT_CAPACITY + 1);
	let dict = kind(MessageKind::Status).with(MessageKey::Id, 0u8).with(MessageKey::Free, text.as_str());
	assert_eq!(
		LotMessage::decode(&dict),
		Err(CodecError::CountTooLong {
			key: MessageKey::Free,
			len: COUNT_CAPACITY + 1,
			capacity: COUNT_CAPACITY,
		})
	);
}

#[test]
fn test_kind_must_be_numeric() {
	let dict = Dictionary::new().with(MessageKey::Kind, "status");
	assert!(matches!(
		LotMessage::decode(&dict),
		Err(CodecError::WrongType {
			key: MessageKey::Kind,
			..
		})
	));
}

#[test]
fn test_missing_required_key() {
	let dict = kind(MessageKind::Init).with(MessageKey::Id, 1u8).with(MessageKey::Name, "P1");
	assert_eq!(
		LotMessage::decode(&dict),
		Err(CodecError::MissingKey {
			kind: MessageKind::Init,
			key: MessageKey::Total,
		})
	);

	let dict = kind(MessageKind::Status).with(MessageKey::Free, "1");
	assert_eq!(
		LotMessage::decode(&dict),
		Err(CodecError::MissingKey {
			kind: MessageKind::Status,
			key: MessageKey::Id,
		})
	);
}

#[test]
fn test_id_must_fit_index_type() {
	let dict = kind(MessageKind::Status).with(MessageKey::Id, 256u32).with(MessageKey::Free, "1");
	assert_eq!(
		LotMessage::decode(&dict),
		Err(CodecError::NotRepresentable {
			key: MessageKey::Id,
			value: 256,
		})
	);

	let dict = kind(MessageKind::Status).with(MessageKey::Id, -1i32).with(MessageKey::Free, "1");
	assert_eq!(
		LotMessage::decode(&dict),
		Err(CodecError::NotRepresentable {
			key: MessageKey::Id,
			value: -1,
		})
	);
}

#[test]
fn test_name_must_be_text() {
	let dict = kind(MessageKind::Init)
		.with(MessageKey::Id, 1u8)
		.with(MessageKey::Name, 5u8)
		.with(MessageKey::Total, "10");
	assert!(matches!(
		LotMessage::decode(&dict),
		Err(CodecError::WrongType {
			key: MessageKey::Name,
			..
		})
	));
}

#[test]
fn test_request_init_frame_carries_only_the_id() {
	let frame = LotMessage::RequestInit { id: 5 }.encode_frame(DEFAULT_OUTBOUND_LIMIT).unwrap();
	let dict = Dictionary::from_bytes(&frame, DEFAULT_INBOUND_LIMIT).unwrap();
	assert_eq!(dict.len(), 2);
	assert_eq!(dict.get(MessageKey::Id), Some(&TupleValue::UInt(5)));
	assert_eq!(
		LotMessage::decode_frame(&frame, DEFAULT_INBOUND_LIMIT),
		Ok(LotMessage::RequestInit { id: 5 })
	);
}

#[test]
fn test_request_is_never_read_as_init() {
	let frame = LotMessage::RequestInit { id: 9 }.encode_frame(DEFAULT_OUTBOUND_LIMIT).unwrap();
	let decoded = LotMessage::decode_frame(&frame, DEFAULT_INBOUND_LIMIT).unwrap();
	assert_eq!(decoded.kind(), MessageKind::InitRequest);
}

#[test]
fn test_longest_builtin_init_fits_inbound_limit() {
	let msg = LotMessage::Init {
		id: 35,
		name: LotName::truncating("CE-P02 P+R Olympisch stadion"),
		capacity: Count::from_text("1500"),
	};
	assert!(msg.encode_frame(DEFAULT_INBOUND_LIMIT).is_ok());
}

#[test]
fn test_envelope_errors_surface_through_codec() {
	assert!(matches!(
		LotMessage::decode_frame(&[3], DEFAULT_INBOUND_LIMIT),
		Err(CodecError::Envelope(_))
	));
}
