//! Tests for the compiled codec

use crate::codec::region::MemoryRegion;
use crate::error::{BoundsError, FormatError};
use crate::schema::compile::compile;
use crate::types::Timestamp;

record! {
    struct ScoredUser {
        age: i32,
        name: Option<String>,
        score: Option<f64>,
        tag: Option<Vec<u8>>,
    }
}

record! {
    struct AllKinds {
        flag: bool,
        tiny: i8,
        small: i16,
        sym: char,
        num: i32,
        big: i64,
        ratio: f32,
        mean: f64,
        opt_flag: Option<bool>,
        opt_tiny: Option<i8>,
        opt_small: Option<i16>,
        opt_sym: Option<char>,
        opt_num: Option<i32>,
        opt_big: Option<i64>,
        opt_ratio: Option<f32>,
        opt_mean: Option<f64>,
        title: Option<String>,
        blob: Option<Vec<u8>>,
        at: Option<Timestamp>,
    }
}

fn sample_user() -> ScoredUser {
    ScoredUser {
        age: 30,
        name: Some("abc".to_string()),
        score: None,
        tag: Some(vec![1, 2, 3]),
    }
}

fn full_value() -> AllKinds {
    AllKinds {
        flag: true,
        tiny: -5,
        small: -1234,
        sym: '🦀',
        num: 567_890,
        big: 123_456_789_012_345,
        ratio: 1.5,
        mean: 2.5,
        opt_flag: Some(false),
        opt_tiny: Some(i8::MIN),
        opt_small: Some(i16::MAX),
        opt_sym: Some('€'),
        opt_num: Some(-42),
        opt_big: Some(i64::MIN),
        opt_ratio: Some(-0.25),
        opt_mean: Some(f64::MAX),
        title: Some("hello".to_string()),
        blob: Some(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        at: Some(Timestamp::new(1_702_300_000, 123_456_789)),
    }
}

#[test]
fn mixed_record_image_matches_expected_bytes() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = sample_user();

    assert_eq!(codec.byte_size(&value), 38);

    let mut buf = vec![0u8; 38];
    codec.write(&value, &mut buf, 0).unwrap();

    #[rustfmt::skip]
    let expected = vec![
        1, 0, 0, 0,                         // version + pad
        5, 0, 0, 0, 0, 0, 0, 0,             // presence: name (bit 0), tag (bit 2)
        3, 0, 0, 0,                         // name length
        3, 0, 0, 0,                         // tag length
        30, 0, 0, 0,                        // age
        0, 0, 0, 0, 0, 0, 0, 0,             // score slot, absent (buffer was zeroed)
        b'a', b'b', b'c',                   // name payload
        1, 2, 3,                            // tag payload
    ];
    assert_eq!(buf, expected);
}

#[test]
fn mixed_record_roundtrip_reproduces_the_instance() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = sample_user();

    let image = codec.encode_to_bytes(&value).unwrap();
    assert_eq!(image.len(), codec.byte_size(&value));

    let decoded = codec.read(&image, 0).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn byte_size_matches_encoded_length_for_varied_values() {
    let codec = compile::<ScoredUser>().unwrap();

    let values = [
        sample_user(),
        ScoredUser::default(),
        ScoredUser {
            age: -1,
            name: Some(String::new()),
            score: Some(0.0),
            tag: None,
        },
        ScoredUser {
            age: i32::MAX,
            name: Some("longer payload with spaces".to_string()),
            score: Some(-1.25),
            tag: Some(vec![0; 300]),
        },
    ];

    for value in &values {
        let image = codec.encode_to_bytes(value).unwrap();
        assert_eq!(image.len(), codec.byte_size(value));
    }
}

#[test]
fn roundtrip_with_every_kind_present() {
    let codec = compile::<AllKinds>().unwrap();
    let value = full_value();

    let image = codec.encode_to_bytes(&value).unwrap();
    let decoded = codec.read(&image, 0).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn roundtrip_with_every_optional_absent() {
    let codec = compile::<AllKinds>().unwrap();
    let value = AllKinds {
        flag: true,
        tiny: 1,
        small: 2,
        sym: 'x',
        num: 3,
        big: 4,
        ratio: 5.0,
        mean: 6.0,
        ..AllKinds::default()
    };

    let image = codec.encode_to_bytes(&value).unwrap();
    let decoded = codec.read(&image, 0).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(decoded.title, None);
    assert_eq!(decoded.blob, None);
    assert_eq!(decoded.at, None);
}

#[test]
fn absent_fields_do_not_disturb_their_neighbors() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = ScoredUser {
        age: 99,
        name: None,
        score: Some(3.5),
        tag: None,
    };

    let image = codec.encode_to_bytes(&value).unwrap();
    let decoded = codec.read(&image, 0).unwrap();

    assert_eq!(decoded.age, 99);
    assert_eq!(decoded.name, None);
    assert_eq!(decoded.score, Some(3.5));
    assert_eq!(decoded.tag, None);
}

#[test]
fn negative_i16_survives_the_wire_widening() {
    let codec = compile::<AllKinds>().unwrap();
    let value = AllKinds {
        small: i16::MIN,
        opt_small: Some(-1),
        ..full_value()
    };

    let image = codec.encode_to_bytes(&value).unwrap();
    let decoded = codec.read(&image, 0).unwrap();
    assert_eq!(decoded.small, i16::MIN);
    assert_eq!(decoded.opt_small, Some(-1));
}

#[test]
fn float_bit_patterns_are_preserved_exactly() {
    let codec = compile::<AllKinds>().unwrap();
    let value = AllKinds {
        ratio: f32::from_bits(0x7F80_0001), // signaling NaN payload
        mean: f64::NEG_INFINITY,
        opt_mean: Some(f64::from_bits(0x7FF0_0000_0000_0001)),
        ..full_value()
    };

    let image = codec.encode_to_bytes(&value).unwrap();
    let decoded = codec.read(&image, 0).unwrap();

    assert_eq!(decoded.ratio.to_bits(), 0x7F80_0001);
    assert_eq!(decoded.mean, f64::NEG_INFINITY);
    assert_eq!(decoded.opt_mean.map(f64::to_bits), Some(0x7FF0_0000_0000_0001));
}

#[test]
fn empty_string_present_is_distinct_from_absent() {
    let codec = compile::<ScoredUser>().unwrap();

    let present = ScoredUser {
        name: Some(String::new()),
        ..ScoredUser::default()
    };
    let absent = ScoredUser::default();

    assert_eq!(codec.byte_size(&present), codec.byte_size(&absent));

    let decoded_present = codec.read(&codec.encode_to_bytes(&present).unwrap(), 0).unwrap();
    let decoded_absent = codec.read(&codec.encode_to_bytes(&absent).unwrap(), 0).unwrap();

    assert_eq!(decoded_present.name, Some(String::new()));
    assert_eq!(decoded_absent.name, None);
}

#[test]
fn any_nonzero_byte_decodes_as_true() {
    record! {
        struct Flagged {
            on: bool,
        }
    }

    let codec = compile::<Flagged>().unwrap();
    let mut image = codec.encode_to_bytes(&Flagged { on: false }).unwrap();

    // bool slot sits at the start of the fixed region
    image[codec.layout().header_size()] = 0x7F;
    assert!(codec.read(&image, 0).unwrap().on);
}

#[test]
fn timestamp_wire_format_is_seconds_then_nanos() {
    record! {
        struct Stamped {
            at: Option<Timestamp>,
        }
    }

    let codec = compile::<Stamped>().unwrap();
    let value = Stamped {
        at: Some(Timestamp::new(-2, 999_999_999)),
    };

    let image = codec.encode_to_bytes(&value).unwrap();
    let fixed = codec.layout().header_size();

    assert_eq!(image[fixed..fixed + 8], (-2i64).to_le_bytes());
    assert_eq!(image[fixed + 8..fixed + 12], 999_999_999u32.to_le_bytes());

    let decoded = codec.read(&image, 0).unwrap();
    assert_eq!(decoded.at, Some(Timestamp::new(-2, 999_999_999)));
}

#[test]
fn write_is_safe_on_a_dirty_buffer() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = ScoredUser {
        age: 12,
        name: None,
        score: None,
        tag: None,
    };

    let mut buf = vec![0xFFu8; codec.byte_size(&value) + 16];
    codec.write(&value, &mut buf, 0).unwrap();

    let decoded = codec.read(&buf, 0).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn overwriting_a_larger_encoding_with_a_smaller_one_reads_back_exactly() {
    let codec = compile::<ScoredUser>().unwrap();

    let large = ScoredUser {
        age: 1,
        name: Some("a long name that fills plenty of tail".to_string()),
        score: Some(9.0),
        tag: Some(vec![7; 64]),
    };
    let small = ScoredUser {
        age: 2,
        name: Some("x".to_string()),
        score: None,
        tag: None,
    };

    let mut buf = vec![0u8; codec.byte_size(&large)];
    codec.write(&large, &mut buf, 0).unwrap();
    codec.write(&small, &mut buf, 0).unwrap();

    let decoded = codec.read(&buf[..codec.byte_size(&small)], 0).unwrap();
    assert_eq!(decoded, small);
}

#[test]
fn write_and_read_at_a_nonzero_offset() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = sample_user();

    let mut buf = vec![0xAAu8; 7 + codec.byte_size(&value)];
    codec.write(&value, &mut buf, 7).unwrap();

    let decoded = codec.read(&buf, 7).unwrap();
    assert_eq!(decoded, value);

    // bytes before the offset are untouched
    assert!(buf[..7].iter().all(|&b| b == 0xAA));
}

#[test]
fn write_rejects_a_destination_smaller_than_byte_size() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = sample_user();

    let mut buf = vec![0u8; codec.byte_size(&value) - 1];
    let err = codec.write(&value, &mut buf, 0).unwrap_err();

    match err.downcast_ref::<BoundsError>() {
        Some(BoundsError { needed, available }) => {
            assert_eq!(*needed, 38);
            assert_eq!(*available, 37);
        }
        None => panic!("expected BoundsError, got {err:?}"),
    }
}

#[test]
fn write_accounts_for_the_offset_in_bounds_checks() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = sample_user();

    let mut buf = vec![0u8; codec.byte_size(&value)];
    assert!(codec.write(&value, &mut buf, 1).is_err());
}

#[test]
fn corrupted_version_byte_fails_with_a_format_error() {
    let codec = compile::<ScoredUser>().unwrap();
    let mut image = codec.encode_to_bytes(&sample_user()).unwrap();

    image[0] = 9;
    let err = codec.read(&image, 0).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FormatError>(),
        Some(FormatError::VersionMismatch { found: 9, expected: 1 })
    ));
}

#[test]
fn truncated_source_fails_with_a_format_error() {
    let codec = compile::<ScoredUser>().unwrap();
    let image = codec.encode_to_bytes(&sample_user()).unwrap();

    // cut into the tail
    let err = codec.read(&image[..image.len() - 2], 0).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FormatError>(),
        Some(FormatError::Truncated { .. })
    ));

    // cut into the header
    let err = codec.read(&image[..6], 0).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FormatError>(),
        Some(FormatError::Truncated { .. })
    ));
}

#[test]
fn declared_length_beyond_the_source_fails_with_a_format_error() {
    let codec = compile::<ScoredUser>().unwrap();
    let mut image = codec.encode_to_bytes(&sample_user()).unwrap();

    // inflate the name length slot past the end of the image
    image[12..16].copy_from_slice(&1000u32.to_le_bytes());
    let err = codec.read(&image, 0).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FormatError>(),
        Some(FormatError::Truncated { .. })
    ));
}

#[test]
fn invalid_utf8_in_a_string_payload_fails_with_a_format_error() {
    let codec = compile::<ScoredUser>().unwrap();
    let mut image = codec.encode_to_bytes(&sample_user()).unwrap();

    let tail = codec.layout().tail_base();
    image[tail..tail + 3].copy_from_slice(&[0xFF, 0xFF, 0xFF]);
    let err = codec.read(&image, 0).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FormatError>(),
        Some(FormatError::InvalidUtf8 { field: "name" })
    ));
}

#[test]
fn invalid_char_code_point_fails_with_a_format_error() {
    record! {
        struct Symbolic {
            sym: char,
        }
    }

    let codec = compile::<Symbolic>().unwrap();
    let mut image = codec.encode_to_bytes(&Symbolic { sym: 'a' }).unwrap();

    let fixed = codec.layout().header_size();
    image[fixed..fixed + 4].copy_from_slice(&0xD800u32.to_le_bytes());
    let err = codec.read(&image, 0).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FormatError>(),
        Some(FormatError::InvalidChar { field: "sym", value: 0xD800 })
    ));
}

#[test]
fn reading_past_the_end_of_the_source_fails() {
    let codec = compile::<ScoredUser>().unwrap();
    let image = codec.encode_to_bytes(&sample_user()).unwrap();
    assert!(codec.read(&image, image.len() + 1).is_err());
}

#[test]
fn region_backend_produces_byte_identical_images() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = sample_user();

    let bytes = codec.encode_to_bytes(&value).unwrap();
    let region = codec.encode_to_region(&value).unwrap();

    assert_eq!(region.as_slice(), bytes.as_slice());
}

#[test]
fn region_roundtrip_reproduces_the_instance() {
    let codec = compile::<AllKinds>().unwrap();
    let value = full_value();

    let mut region = MemoryRegion::anonymous(codec.byte_size(&value)).unwrap();
    codec.write_region(&value, &mut region, 0).unwrap();

    let decoded = codec.read_region(&region, 0).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn backends_are_interchangeable_as_source_and_destination() {
    let codec = compile::<ScoredUser>().unwrap();
    let value = sample_user();

    // encode into a region, decode through the slice path
    let region = codec.encode_to_region(&value).unwrap();
    assert_eq!(codec.read(region.as_slice(), 0).unwrap(), value);

    // encode into a vector, copy into a region, decode through the region path
    let bytes = codec.encode_to_bytes(&value).unwrap();
    let mut region = MemoryRegion::anonymous(bytes.len()).unwrap();
    region.as_mut_slice().copy_from_slice(&bytes);
    assert_eq!(codec.read_region(&region, 0).unwrap(), value);
}

#[test]
fn staging_spills_gracefully_past_the_inline_capacity() {
    record! {
        struct ManyStrings {
            s0: Option<String>,
            s1: Option<String>,
            s2: Option<String>,
            s3: Option<String>,
            s4: Option<String>,
            s5: Option<String>,
            s6: Option<String>,
            s7: Option<String>,
            s8: Option<String>,
            s9: Option<String>,
        }
    }

    let codec = compile::<ManyStrings>().unwrap();
    let value = ManyStrings {
        s0: Some("zero".into()),
        s1: None,
        s2: Some("two".into()),
        s3: Some(String::new()),
        s4: Some("four".into()),
        s5: None,
        s6: Some("six".into()),
        s7: Some("seven".into()),
        s8: None,
        s9: Some("nine".into()),
    };

    let image = codec.encode_to_bytes(&value).unwrap();
    assert_eq!(image.len(), codec.byte_size(&value));
    assert_eq!(codec.read(&image, 0).unwrap(), value);
}
