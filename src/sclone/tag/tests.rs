mod classify {
	use crate::sclone::tag::{self, Scope, Tag, TypedArrayKind, Word};

	#[test]
	fn tags_below_float_max_are_doubles() {
		assert_eq!(Tag::classify(0), Tag::Float);
		assert_eq!(Tag::classify(0x4009_21FB), Tag::Float);
		assert_eq!(Tag::classify(tag::FLOAT_MAX - 1), Tag::Float);
		assert_ne!(Tag::classify(tag::FLOAT_MAX), Tag::Float);
	}

	#[test]
	fn dictionary_tags_classify() {
		assert_eq!(Tag::classify(tag::HEADER), Tag::Header);
		assert_eq!(Tag::classify(tag::NULL), Tag::Null);
		assert_eq!(Tag::classify(tag::STRING), Tag::String);
		assert_eq!(Tag::classify(tag::END_OF_KEYS), Tag::EndOfKeys);
		assert_eq!(Tag::classify(tag::BIGINT_OBJECT), Tag::BigIntObject);
		assert_eq!(Tag::classify(tag::TRANSFER_MAP_HEADER), Tag::TransferMapHeader);
	}

	#[test]
	fn legacy_typed_array_range_carries_element_type() {
		assert_eq!(Tag::classify(tag::TYPED_ARRAY_V1_MIN), Tag::TypedArrayV1(TypedArrayKind::Int8));
		assert_eq!(Tag::classify(tag::TYPED_ARRAY_V1_MAX), Tag::TypedArrayV1(TypedArrayKind::Uint8Clamped));
		assert_eq!(Tag::classify(tag::TYPED_ARRAY_V1_MAX + 1), Tag::Unknown(tag::TYPED_ARRAY_V1_MAX + 1));
	}

	#[test]
	fn gaps_in_the_dictionary_are_unknown() {
		assert_eq!(Tag::classify(0xFFFF_000E), Tag::Unknown(0xFFFF_000E));
		assert_eq!(Tag::classify(0xFFFF_0014), Tag::Unknown(0xFFFF_0014));
		assert_eq!(Tag::classify(0xFFF2_0000), Tag::Unknown(0xFFF2_0000));
	}

	#[test]
	fn word_splits_and_reassembles() {
		let word = Word::from_u64(0xFFFF_0003_FFFF_FFFF);
		assert_eq!(word.tag, tag::INT32);
		assert_eq!(word.data, u32::MAX);
		assert_eq!(word.to_u64(), 0xFFFF_0003_FFFF_FFFF);
		assert_eq!(Word::from_u64(1.5_f64.to_bits()).as_f64(), 1.5);
	}

	#[test]
	fn scope_ids_map_and_gate_persistence() {
		assert_eq!(Scope::from_raw(0), Some(Scope::SameProcess));
		assert_eq!(Scope::from_raw(1), Some(Scope::SameProcess));
		assert_eq!(Scope::from_raw(3), Some(Scope::DifferentProcessForIndexedDb));
		assert_eq!(Scope::from_raw(6), None);

		assert!(Scope::DifferentProcess.is_persistable());
		assert!(Scope::DifferentProcessForIndexedDb.is_persistable());
		assert!(!Scope::SameProcess.is_persistable());
		assert!(!Scope::Unassigned.is_persistable());
		assert!(!Scope::UnknownDestination.is_persistable());
	}
}
