use deltapatch::description::{self, Probe};
use deltapatch::vcdiff::varint;
use deltapatch::vcdiff::{FileHeader, HeaderIndicator};
use proptest::prelude::*;

fn described_patch(description: &str) -> Vec<u8> {
    let hdr = FileHeader {
        indicator: HeaderIndicator::APPHEADER,
        app_header: Some(description::encode_token(description).into_bytes()),
        ..Default::default()
    };
    let mut out = Vec::new();
    hdr.encode(&mut out).unwrap();
    out
}

fn line_soup() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just("\r\n".to_string()),
            Just("\r".to_string()),
            Just("\n".to_string()),
            "[a-zA-Z0-9 äöü]{0,8}",
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_varint_roundtrip(value in any::<u64>()) {
        let mut out = Vec::new();
        varint::write_u64(&mut out, value).unwrap();
        prop_assert_eq!(out.len(), varint::sizeof_u64(value));
        let decoded = varint::stream_read_u64(&mut out.as_slice()).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn prop_normalisation_is_idempotent(text in line_soup()) {
        let once = description::normalize_line_endings(&text).into_owned();
        prop_assert!(!once.contains('\r'));
        let twice = description::normalize_line_endings(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_description_survives_a_patch_header(text in line_soup()) {
        prop_assume!(!text.is_empty());
        let probe = description::probe(&mut described_patch(&text).as_slice()).unwrap();
        let expected = description::normalize_line_endings(&text).into_owned();
        prop_assert_eq!(probe, Probe::Described(expected.clone()));

        // Re-encoding the decoded text is stable.
        let again = description::probe(&mut described_patch(&expected).as_slice()).unwrap();
        prop_assert_eq!(again.description(), Some(expected.as_str()));
    }

    #[test]
    fn prop_arbitrary_bytes_never_error(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        prop_assert!(description::probe(&mut data.as_slice()).is_ok());
    }
}
