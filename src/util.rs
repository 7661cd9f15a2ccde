use crate::boxes::FourCC;
use crate::parser::{ParseError, Result};
use byteorder::{BigEndian, ByteOrder};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bounds-checked sub-slice `data[at..at + len]`.
pub fn read_bytes(data: &[u8], at: usize, len: usize) -> Result<&[u8]> {
    match at.checked_add(len) {
        Some(end) if end <= data.len() => Ok(&data[at..end]),
        _ => Err(ParseError::Truncated {
            offset: at,
            needed: len,
            available: data.len().saturating_sub(at),
        }),
    }
}

pub fn read_u8(data: &[u8], at: usize) -> Result<u8> {
    Ok(read_bytes(data, at, 1)?[0])
}

pub fn read_u16(data: &[u8], at: usize) -> Result<u16> {
    Ok(BigEndian::read_u16(read_bytes(data, at, 2)?))
}

pub fn read_u24(data: &[u8], at: usize) -> Result<u32> {
    Ok(BigEndian::read_u24(read_bytes(data, at, 3)?))
}

pub fn read_u32(data: &[u8], at: usize) -> Result<u32> {
    Ok(BigEndian::read_u32(read_bytes(data, at, 4)?))
}

pub fn read_fourcc(data: &[u8], at: usize) -> Result<FourCC> {
    let b = read_bytes(data, at, 4)?;
    Ok(FourCC([b[0], b[1], b[2], b[3]]))
}

/// Read at most `max_bytes` from the start of the file at `path`.
///
/// Media payloads usually follow the metadata, so a prefix is enough to walk
/// the header atoms of a streamed file without loading the whole thing.
pub fn read_head(path: impl AsRef<Path>, max_bytes: u64) -> std::io::Result<Vec<u8>> {
    let f = File::open(path)?;
    let mut v = Vec::new();
    f.take(max_bytes).read_to_end(&mut v)?;
    Ok(v)
}

pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offs = start_offset + (i as u64) * 16;
        let hexs: String = chunk.iter().map(|b| format!("{:02x} ", b)).collect();
        let ascii: String = chunk.iter().map(|b| {
            let c = *b;
            if (32..=126).contains(&c) { c as char } else { '.' }
        }).collect();
        out.push_str(&format!("{:08x}  {:<48}  |{}|\n", offs, hexs, ascii));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let data = [0x00, 0x01, 0x02, 0x03, 0x04, b'm', b'v', b'h', b'd'];
        assert_eq!(read_u8(&data, 4).unwrap(), 4);
        assert_eq!(read_u16(&data, 1).unwrap(), 0x0102);
        assert_eq!(read_u24(&data, 1).unwrap(), 0x010203);
        assert_eq!(read_u32(&data, 0).unwrap(), 0x00010203);
        assert_eq!(read_fourcc(&data, 5).unwrap(), FourCC(*b"mvhd"));
    }

    #[test]
    fn out_of_range_is_truncated() {
        let data = [0u8; 6];
        match read_u32(&data, 4) {
            Err(ParseError::Truncated { offset, needed, available }) => {
                assert_eq!(offset, 4);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncated, got {:?}", other),
        }
        assert!(read_bytes(&data, usize::MAX, 2).is_err());
        assert!(read_bytes(&data, 6, 0).unwrap().is_empty());
    }

    #[test]
    fn hex_dump_lines() {
        let data = (0u8..20u8).collect::<Vec<_>>();
        let dump = hex_dump(&data, 0x10);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000010  00 01 02"));
        assert!(lines[1].starts_with("00000020  10 11 12 13"));
    }
}
