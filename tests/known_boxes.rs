use mp4atoms::boxes::FourCC;
use mp4atoms::known_boxes::{KnownBox, is_header_type, is_leaf, is_unsupported_container};

fn cc(s: &str) -> FourCC {
    FourCC::from_str(s).unwrap()
}

#[test]
fn known_box_from_mvhd() {
    let kb = KnownBox::from(cc("mvhd"));
    assert!(matches!(kb, KnownBox::Mvhd));
    assert_eq!(kb.full_name(), "Movie Header Box");
}

#[test]
fn header_suffix_is_always_leaf() {
    for code in ["mvhd", "tkhd", "mdhd", "vmhd", "smhd", "nmhd", "zzhd"] {
        assert!(is_header_type(cc(code)), "{code}");
        assert!(is_leaf(cc(code)), "{code}");
    }
    assert!(!is_header_type(cc("hdlr")));
}

#[test]
fn listed_leaves() {
    for code in ["stts", "stss", "stsd", "stsz", "stco", "stsc", "elst", "kmat", "crgn", "prfl", "ftyp", "mdat"] {
        assert!(is_leaf(cc(code)), "{code}");
    }
}

#[test]
fn containers() {
    for code in ["moov", "trak", "mdia", "minf", "stbl", "dinf", "edts", "udta", "abcd"] {
        assert!(!is_leaf(cc(code)), "{code}");
        assert!(!is_unsupported_container(cc(code)), "{code}");
    }
    assert!(!is_leaf(cc("dref")));
    assert!(is_unsupported_container(cc("dref")));
}

#[test]
fn unknown_code() {
    let kb = KnownBox::from(cc("abcd"));
    assert_eq!(kb, KnownBox::Unknown(cc("abcd")));
    assert_eq!(kb.full_name(), "Unknown Box");
    assert_eq!(cc("abcd").to_string(), "abcd");
    assert_eq!(FourCC(*b"a\0b\x7f").to_string(), "a.b.");
    assert!(FourCC::from_str("abc").is_none());
}
