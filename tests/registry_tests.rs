use mp4atoms::boxes::FourCC;
use mp4atoms::parser::ParseError;
use mp4atoms::registry::{FieldValue, default_registry};

fn full_atom(typ: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((body.len() + 12) as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&[0, 0, 0, 0]); // version + flags
    v.extend_from_slice(body);
    v
}

fn words(ws: &[u32]) -> Vec<u8> {
    ws.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn mvhd_atom() -> Vec<u8> {
    let mut body = words(&[1, 2, 1000, 5000, 0x0001_0000]);
    body.extend_from_slice(&0x0100u16.to_be_bytes()); // volume
    body.extend_from_slice(&[0u8; 10]); // reserved
    body.extend(words(&[
        1, 2, 3, //
        4, 5, 6, //
        7, 8, 0x4000_0000,
    ]));
    body.extend(words(&[11, 12, 13, 14, 15, 16, 2]));
    full_atom(b"mvhd", &body)
}

#[test]
fn test_mvhd_fixed_layout() {
    let span = mvhd_atom();
    assert_eq!(span.len(), 108);

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"mvhd"), &span).unwrap().unwrap();

    assert_eq!(leaf.typ, FourCC(*b"mvhd"));
    assert_eq!(leaf.size, 108);
    assert_eq!(leaf.version, 0);
    assert_eq!(leaf.flags, 0);

    let u = |name: &str| leaf.get(name).and_then(FieldValue::as_u64).unwrap();
    assert_eq!(u("creation_time"), 1);
    assert_eq!(u("modification_time"), 2);
    assert_eq!(u("timescale"), 1000);
    assert_eq!(u("duration"), 5000);
    assert_eq!(u("preferred_rate"), 0x0001_0000);
    assert_eq!(u("preferred_volume"), 0x0100);
    assert_eq!(leaf.get("reserved").unwrap().as_bytes().unwrap(), &[0u8; 10]);

    match leaf.get("matrix") {
        Some(FieldValue::Matrix(m)) => {
            assert_eq!(m[0], [1, 2, 3]);
            assert_eq!(m[1], [4, 5, 6]);
            assert_eq!(m[2], [7, 8, 0x4000_0000]);
        }
        other => panic!("Expected matrix, got {:?}", other),
    }

    assert_eq!(u("preview_time"), 11);
    assert_eq!(u("preview_duration"), 12);
    assert_eq!(u("poster_time"), 13);
    assert_eq!(u("selection_time"), 14);
    assert_eq!(u("selection_duration"), 15);
    assert_eq!(u("current_time"), 16);
    assert_eq!(u("next_track_id"), 2);
}

#[test]
fn test_mvhd_short_payload_is_truncated() {
    let mut span = mvhd_atom();
    span.truncate(60);

    let registry = default_registry();
    let res = registry.decode(FourCC(*b"mvhd"), &span).unwrap();
    assert!(matches!(res, Err(ParseError::Truncated { .. })));
}

#[test]
fn test_tkhd_fixed_layout() {
    let mut body = words(&[100, 200, 7, 0xdead_beef, 9000]);
    body.extend_from_slice(&[0u8; 60]); // the rest of a real tkhd
    let span = full_atom(b"tkhd", &body);
    assert_eq!(span.len(), 92);

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"tkhd"), &span).unwrap().unwrap();

    assert_eq!(leaf.get("creation_time").unwrap().as_u64(), Some(100));
    assert_eq!(leaf.get("modification_time").unwrap().as_u64(), Some(200));
    assert_eq!(leaf.get("track_id").unwrap().as_u64(), Some(7));
    assert_eq!(
        leaf.get("reserved").unwrap().as_bytes(),
        Some(&[0xde, 0xad, 0xbe, 0xef][..])
    );
    assert_eq!(leaf.get("duration").unwrap().as_u64(), Some(9000));
}

#[test]
fn test_stsz_sample_table() {
    let span = full_atom(b"stsz", &words(&[0, 3, 1000, 2000, 3000]));

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stsz"), &span).unwrap().unwrap();

    assert_eq!(leaf.get("sample_size").unwrap().as_u64(), Some(0));
    assert_eq!(leaf.get("entry_count").unwrap().as_u64(), Some(3));
    assert_eq!(
        leaf.get("sample_sizes").unwrap().as_list(),
        Some(&[1000u64, 2000, 3000][..])
    );
}

#[test]
fn test_stsz_uniform_size_still_reads_table() {
    let span = full_atom(b"stsz", &words(&[512, 2, 1, 2]));

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stsz"), &span).unwrap().unwrap();

    assert_eq!(leaf.get("sample_size").unwrap().as_u64(), Some(512));
    assert_eq!(leaf.get("entry_count").unwrap().as_u64(), Some(2));
    assert_eq!(leaf.get("sample_sizes").unwrap().as_list(), Some(&[1u64, 2][..]));
}

#[test]
fn test_stsz_count_past_end() {
    let span = full_atom(b"stsz", &words(&[0, 1_000_000, 1]));

    let registry = default_registry();
    let res = registry.decode(FourCC(*b"stsz"), &span).unwrap();
    match res {
        Err(ParseError::Truncated { offset, needed, available }) => {
            assert_eq!(offset, 20);
            assert_eq!(needed, 4_000_000);
            assert_eq!(available, 4);
        }
        other => panic!("Expected truncated, got {:?}", other),
    }
}

#[test]
fn test_stsd_generic_header() {
    let mut body = words(&[1, 24]);
    body.extend_from_slice(b"avc1");
    body.extend_from_slice(&[0u8; 6]);
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&[0xaa; 8]); // codec-specific, ignored

    let span = full_atom(b"stsd", &body);
    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stsd"), &span).unwrap().unwrap();

    assert_eq!(leaf.get("entry_count").unwrap().as_u64(), Some(1));
    let entry = leaf.get("table_data").unwrap().as_record().unwrap();
    assert_eq!(entry.get("entry_size").unwrap().as_u64(), Some(24));
    assert_eq!(entry.get("data_format"), Some(&FieldValue::Code(FourCC(*b"avc1"))));
    assert_eq!(entry.get("reserved").unwrap().as_bytes(), Some(&[0u8; 6][..]));
    assert_eq!(entry.get("data_reference_index").unwrap().as_u64(), Some(1));
}

#[test]
fn test_stts_all_rows() {
    let span = full_atom(b"stts", &words(&[2, 100, 1024, 1, 512]));

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stts"), &span).unwrap().unwrap();

    assert_eq!(leaf.get("entry_count").unwrap().as_u64(), Some(2));
    match leaf.get("table_data") {
        Some(FieldValue::Table { columns, rows }) => {
            assert_eq!(columns, &vec!["sample_count", "sample_duration"]);
            assert_eq!(rows, &vec![vec![100, 1024], vec![1, 512]]);
        }
        other => panic!("Expected table, got {:?}", other),
    }
}

#[test]
fn test_stsc_rows() {
    let span = full_atom(b"stsc", &words(&[2, 1, 5, 1, 10, 3, 1]));

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stsc"), &span).unwrap().unwrap();

    assert_eq!(leaf.get("entry_count").unwrap().as_u64(), Some(2));
    assert_eq!(
        leaf.get("table_data").unwrap().as_rows(),
        Some(&[vec![1u64, 5, 1], vec![10, 3, 1]][..])
    );
}

#[test]
fn test_stsc_partial_row() {
    let mut body = words(&[1, 1, 5, 1]);
    body.extend_from_slice(&[0, 0, 0, 2, 0, 0]);
    let span = full_atom(b"stsc", &body);

    let registry = default_registry();
    let res = registry.decode(FourCC(*b"stsc"), &span).unwrap();
    // second row starts at 16 + 12; its second column is cut short
    assert!(matches!(
        res,
        Err(ParseError::Truncated { offset: 32, needed: 4, available: 2 })
    ));
}

#[test]
fn test_stco_offsets() {
    let span = full_atom(b"stco", &words(&[3, 48, 4096, 8192]));

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stco"), &span).unwrap().unwrap();

    assert_eq!(leaf.get("entry_count").unwrap().as_u64(), Some(3));
    assert_eq!(
        leaf.get("table_data").unwrap().as_list(),
        Some(&[48u64, 4096, 8192][..])
    );
}

#[test]
fn test_stco_empty() {
    let span = full_atom(b"stco", &words(&[0]));

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stco"), &span).unwrap().unwrap();

    assert_eq!(leaf.get("entry_count").unwrap().as_u64(), Some(0));
    assert_eq!(leaf.get("table_data").unwrap().as_list(), Some(&[][..]));
}

#[test]
fn test_version_and_flags() {
    let mut span = full_atom(b"stco", &words(&[0]));
    span[8] = 1;
    span[9..12].copy_from_slice(&[0x00, 0x01, 0x02]);

    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stco"), &span).unwrap().unwrap();
    assert_eq!(leaf.version, 1);
    assert_eq!(leaf.flags, 0x000102);
}

#[test]
fn test_no_decoder() {
    let span = full_atom(b"mdhd", &[0u8; 20]);
    let registry = default_registry();
    assert!(!registry.contains(FourCC(*b"mdhd")));
    assert!(registry.decode(FourCC(*b"mdhd"), &span).is_none());
}

#[test]
fn test_decoded_leaf_serializes() {
    let span = full_atom(b"stsc", &words(&[1, 1, 5, 1]));
    let registry = default_registry();
    let leaf = registry.decode(FourCC(*b"stsc"), &span).unwrap().unwrap();

    let v = serde_json::to_value(&leaf).unwrap();
    assert_eq!(v["typ"], "stsc");
    assert_eq!(v["fields"]["entry_count"], 1);
    assert_eq!(v["fields"]["table_data"]["rows"][0][1], 5);
}
