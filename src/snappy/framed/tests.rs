mod chunks {
	use std::io::Cursor;

	use clonedoc_testkit::FrameBuilder;

	use crate::snappy::{FrameDecoder, FrameError, FrameErrorClass, FrameStats, MAX_BLOCK_SIZE};

	fn unframe(bytes: &[u8]) -> crate::snappy::Result<Vec<u8>> {
		FrameDecoder::new(bytes).read_all()
	}

	#[test]
	fn identifier_only_is_empty() {
		let bytes = FrameBuilder::with_identifier().finish();
		assert_eq!(unframe(&bytes).expect("identifier-only stream"), Vec::<u8>::new());
	}

	#[test]
	fn empty_source_is_empty() {
		assert_eq!(unframe(&[]).expect("empty stream"), Vec::<u8>::new());
	}

	#[test]
	fn uncompressed_chunks_concatenate() {
		let bytes = FrameBuilder::with_identifier().uncompressed(b"hello ").uncompressed(b"world").finish();
		assert_eq!(unframe(&bytes).expect("stream decodes"), b"hello world");
	}

	#[test]
	fn compressed_chunk_round_trips() {
		let data: Vec<u8> = (0..20_000_u32).map(|i| (i % 7) as u8).collect();
		let bytes = FrameBuilder::with_identifier().compressed(&data).finish();
		assert!(bytes.len() < data.len());
		assert_eq!(unframe(&bytes).expect("stream decodes"), data);
	}

	#[test]
	fn identifier_may_repeat_and_is_optional() {
		let bytes = FrameBuilder::new().uncompressed(b"a").identifier().uncompressed(b"b").finish();
		let mut decoder = FrameDecoder::new(bytes.as_slice());

		assert_eq!(decoder.read_all().expect("stream decodes"), b"ab");
		assert_eq!(decoder.stats().identifier_chunks, 1);
	}

	#[test]
	fn uncompressed_block_limit() {
		let full = vec![7_u8; MAX_BLOCK_SIZE];
		let bytes = FrameBuilder::with_identifier().uncompressed(&full).finish();
		assert_eq!(unframe(&bytes).expect("full block decodes").len(), MAX_BLOCK_SIZE);

		let over = vec![7_u8; MAX_BLOCK_SIZE + 1];
		let bytes = FrameBuilder::with_identifier().uncompressed(&over).finish();
		let err = unframe(&bytes).expect_err("oversized block fails");
		assert!(matches!(
			err,
			FrameError::ChunkTooLarge {
				chunk_type: 0x01,
				len: 65537,
				max: 65536,
				at: 10
			}
		));
	}

	#[test]
	fn data_chunk_shorter_than_checksum_fails() {
		let bytes = FrameBuilder::with_identifier().chunk(0x01, &[1, 2, 3]).finish();
		let err = unframe(&bytes).expect_err("short chunk fails");
		assert!(matches!(err, FrameError::ChunkTooShort { chunk_type: 0x01, len: 3, at: 10 }));
		assert_eq!(err.class(), FrameErrorClass::Format);
	}

	#[test]
	fn skippable_chunks_are_counted() {
		let bytes = FrameBuilder::with_identifier()
			.skippable(0xAA, 5)
			.uncompressed(b"x")
			.skippable(0xFE, 0)
			.finish();
		let mut decoder = FrameDecoder::new(bytes.as_slice());

		assert_eq!(decoder.read_all().expect("stream decodes"), b"x");
		assert_eq!(
			decoder.stats(),
			FrameStats {
				identifier_chunks: 1,
				compressed_chunks: 0,
				uncompressed_chunks: 1,
				skipped_chunks: 2,
				skipped_bytes: 5,
				bytes_out: 1,
				last_checksum: Some(0),
			}
		);
	}

	#[test]
	fn seekable_source_skips_by_seeking() {
		let bytes = FrameBuilder::with_identifier()
			.skippable(0x80, 40_000)
			.checksum(0xDEAD_BEEF)
			.uncompressed(b"after padding")
			.finish();
		let mut decoder = FrameDecoder::new_seekable(Cursor::new(bytes));

		assert_eq!(decoder.read_all().expect("stream decodes"), b"after padding");
		assert_eq!(decoder.stats().skipped_bytes, 40_000);
		assert_eq!(decoder.stats().last_checksum, Some(0xDEAD_BEEF));
	}

	#[test]
	fn truncated_skippable_chunk_fails_without_seek() {
		let mut bytes = FrameBuilder::with_identifier().skippable(0x90, 100).finish();
		bytes.truncate(bytes.len() - 40);
		let err = unframe(&bytes).expect_err("short skippable fails");
		assert!(matches!(err, FrameError::TruncatedStream { need: 100, got: 60, .. }));
	}

	#[test]
	fn reserved_unskippable_types_fail() {
		for chunk_type in [0x02, 0x7F] {
			let bytes = FrameBuilder::with_identifier().chunk(chunk_type, b"??").finish();
			let err = unframe(&bytes).expect_err("reserved chunk fails");
			assert!(matches!(err, FrameError::UnsupportedChunkType { chunk_type: got, at: 10 } if got == chunk_type));
			assert_eq!(err.class(), FrameErrorClass::UnsupportedChunkType);
		}
	}

	#[test]
	fn bad_identifier_fails() {
		let bytes = FrameBuilder::new().chunk(0xFF, b"sNaPpX").finish();
		let err = unframe(&bytes).expect_err("wrong identifier fails");
		assert!(matches!(err, FrameError::BadIdentifier { at: 0 }));

		let bytes = FrameBuilder::new().chunk(0xFF, b"sNaPpYY").finish();
		let err = unframe(&bytes).expect_err("wrong identifier length fails");
		assert!(matches!(err, FrameError::BadIdentifier { at: 0 }));
	}

	#[test]
	fn truncated_header_and_payload_fail() {
		let bytes = [0xFF, 0x06];
		let err = unframe(&bytes).expect_err("partial header fails");
		assert!(matches!(err, FrameError::TruncatedStream { what: "chunk header", need: 4, got: 2, .. }));

		let mut bytes = FrameBuilder::with_identifier().uncompressed(b"abcdef").finish();
		bytes.truncate(bytes.len() - 2);
		let err = unframe(&bytes).expect_err("partial payload fails");
		assert!(matches!(err, FrameError::TruncatedStream { need: 6, got: 4, .. }));
		assert_eq!(err.class(), FrameErrorClass::TruncatedStream);
	}

	#[test]
	fn corrupt_compressed_block_fails() {
		let bytes = FrameBuilder::with_identifier().chunk(0x00, &[0, 0, 0, 0, 0x0A, 0xFF, 0xFF]).finish();
		let err = unframe(&bytes).expect_err("corrupt block fails");
		assert_eq!(err.class(), FrameErrorClass::Decompress);
	}

	#[test]
	fn verbose_compressed_block_is_accepted() {
		// One-byte literal elements only: valid, but larger than any encoder would emit.
		let data: Vec<u8> = (0..50_000_u32).map(|i| (i % 251) as u8).collect();
		let mut block = Vec::new();
		let mut n = data.len();
		while n >= 0x80 {
			block.push((n as u8) | 0x80);
			n >>= 7;
		}
		block.push(n as u8);
		for &byte in &data {
			block.extend_from_slice(&[0x00, byte]);
		}
		assert!(block.len() > snap::raw::max_compress_len(MAX_BLOCK_SIZE));

		let mut payload = vec![0_u8; 4];
		payload.extend_from_slice(&block);
		let bytes = FrameBuilder::with_identifier().chunk(0x00, &payload).finish();
		let mut decoder = FrameDecoder::new(bytes.as_slice());

		assert_eq!(decoder.read_all().expect("verbose block decodes"), data);
		assert_eq!(decoder.stats().compressed_chunks, 1);
	}

	#[test]
	fn compressed_block_over_limit_fails() {
		let data = vec![0_u8; MAX_BLOCK_SIZE + 1];
		let block = snap::raw::Encoder::new().compress_vec(&data).expect("compression succeeds");
		let mut payload = vec![0_u8; 4];
		payload.extend_from_slice(&block);
		let bytes = FrameBuilder::with_identifier().chunk(0x00, &payload).finish();

		let err = unframe(&bytes).expect_err("oversized decompressed block fails");
		assert!(matches!(err, FrameError::ChunkTooLarge { chunk_type: 0x00, len: 65537, .. }));
	}
}

mod reads {
	use std::io::{BufRead, Cursor, ErrorKind, Read};

	use clonedoc_testkit::FrameBuilder;

	use crate::snappy::FrameDecoder;

	#[test]
	fn read_some_never_exceeds_max() {
		let bytes = FrameBuilder::with_identifier().uncompressed(b"abcdefgh").finish();
		let mut decoder = FrameDecoder::new(bytes.as_slice());

		assert_eq!(decoder.read_some(3).expect("first slice"), b"abc");
		assert_eq!(decoder.read_some(3).expect("second slice"), b"def");
		assert_eq!(decoder.read_some(100).expect("rest of chunk"), b"gh");
		assert!(decoder.read_some(100).expect("end of stream").is_empty());
	}

	#[test]
	fn read_into_spans_chunks() {
		let bytes = FrameBuilder::with_identifier().uncompressed(b"abc").compressed(b"defg").finish();
		let mut decoder = FrameDecoder::new(bytes.as_slice());

		let mut target = [0_u8; 5];
		assert_eq!(decoder.read_into(&mut target).expect("fills target"), 5);
		assert_eq!(&target, b"abcde");

		let mut rest = [0_u8; 8];
		assert_eq!(decoder.read_into(&mut rest).expect("partial fill at end"), 2);
		assert_eq!(&rest[..2], b"fg");
	}

	#[test]
	fn source_is_not_read_ahead() {
		let bytes = FrameBuilder::with_identifier().uncompressed(b"one").uncompressed(b"two").finish();
		let first_chunk_end = 10 + 4 + 4 + 3;
		let mut decoder = FrameDecoder::new(Cursor::new(bytes));

		assert_eq!(decoder.read_some(1).expect("first byte"), b"o");
		assert_eq!(decoder.get_ref().position(), first_chunk_end);
	}

	#[test]
	fn implements_read_and_buf_read() {
		let bytes = FrameBuilder::with_identifier().uncompressed(b"line one\nline two\n").finish();
		let decoder = FrameDecoder::new(bytes.as_slice());

		let lines: Vec<String> = decoder.lines().map(|line| line.expect("line reads")).collect();
		assert_eq!(lines, vec!["line one", "line two"]);

		let bytes = FrameBuilder::with_identifier().compressed(b"via read").finish();
		let mut text = String::new();
		FrameDecoder::new(bytes.as_slice()).read_to_string(&mut text).expect("read succeeds");
		assert_eq!(text, "via read");
	}

	#[test]
	fn read_errors_surface_as_invalid_data() {
		let bytes = FrameBuilder::with_identifier().chunk(0x03, b"").finish();
		let mut out = Vec::new();
		let err = FrameDecoder::new(bytes.as_slice()).read_to_end(&mut out).expect_err("read fails");
		assert_eq!(err.kind(), ErrorKind::InvalidData);
	}

	#[test]
	fn frame_decoder_feeds_clone_decoder() {
		let clone = clonedoc_testkit::CloneBuilder::new().latin1("framed").finish();
		let bytes = FrameBuilder::with_identifier().compressed(&clone).finish();

		let doc = crate::sclone::decode(FrameDecoder::new(bytes.as_slice())).expect("framed clone decodes");
		assert_eq!(doc.root().as_str(), Some("framed"));
	}
}
