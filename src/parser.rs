use crate::boxes::{BoxRecord, HEADER_SIZE};
use crate::util::{read_fourcc, read_u32};

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("truncated input: need {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("malformed box size {size} at offset {offset}")]
    MalformedSize { offset: usize, size: u32 },
    #[error("not a four-character code: {0:?}")]
    InvalidFourCC(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    /// Shift a relative offset so it points into the enclosing buffer.
    pub fn at_base(self, base: usize) -> Self {
        match self {
            ParseError::Truncated { offset, needed, available } => ParseError::Truncated {
                offset: offset + base,
                needed,
                available,
            },
            ParseError::MalformedSize { offset, size } => ParseError::MalformedSize {
                offset: offset + base,
                size,
            },
            other => other,
        }
    }
}

/// Split `data[range_start..range_start + range_length]` into sibling atoms.
///
/// Each record starts where the previous one ends and must end inside the
/// range. With `strict` set, the range and every record must also fit inside
/// `data`. Without it, a record that runs past the end of the buffer is still
/// reported when the range reaches the end of the buffer (reading its payload
/// fails later), and scanning stops once no full header is left in the buffer.
pub fn scan(data: &[u8], range_start: usize, range_length: usize, strict: bool) -> Result<Vec<BoxRecord>> {
    let end = range_start
        .checked_add(range_length)
        .ok_or(ParseError::Truncated { offset: range_start, needed: range_length, available: 0 })?;

    if strict && end > data.len() {
        return Err(ParseError::Truncated {
            offset: range_start,
            needed: range_length,
            available: data.len().saturating_sub(range_start),
        });
    }

    let mut kids = Vec::new();
    let mut cursor = range_start;
    while cursor < end {
        if !strict && cursor + HEADER_SIZE > data.len() {
            log::debug!("scan stopped at {cursor:#x}: buffer ends at {:#x}", data.len());
            break;
        }
        if end - cursor < HEADER_SIZE {
            return Err(ParseError::Truncated {
                offset: cursor,
                needed: HEADER_SIZE,
                available: end - cursor,
            });
        }

        let size = read_u32(data, cursor)?;
        let typ = read_fourcc(data, cursor + 4)?;
        if (size as usize) < HEADER_SIZE {
            return Err(ParseError::MalformedSize { offset: cursor, size });
        }

        let rec = BoxRecord { typ, start: cursor, size };
        // only the cut end of a prefix may be overrun
        let cut_prefix = !strict && end == data.len();
        if rec.end() > end && !cut_prefix {
            return Err(ParseError::Truncated {
                offset: cursor,
                needed: size as usize,
                available: end - cursor,
            });
        }

        log::trace!("{typ} @ {cursor:#010x}: {size} bytes");
        kids.push(rec);
        cursor = rec.end();
    }
    Ok(kids)
}
