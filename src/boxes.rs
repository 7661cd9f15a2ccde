use serde::Serialize;
use std::fmt;

/// Size of the `size` + `type` prefix every atom starts with.
pub const HEADER_SIZE: usize = 8;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else { None }
    }
    pub fn as_str_lossy(&self) -> String {
        self.0.iter().map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
    /// True if the last two bytes spell `hd` (mvhd, tkhd, mdhd, ...).
    pub fn ends_with_hd(&self) -> bool {
        &self.0[2..] == b"hd"
    }
}
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

impl Serialize for FourCC {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.as_str_lossy())
    }
}

/// Type of a node: either a real four-character code or the synthetic root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxType {
    Root,
    Code(FourCC),
}

impl BoxType {
    pub fn code(&self) -> Option<FourCC> {
        match self {
            BoxType::Root => None,
            BoxType::Code(cc) => Some(*cc),
        }
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxType::Root => f.write_str("(root)"),
            BoxType::Code(cc) => write!(f, "{cc}"),
        }
    }
}

/// One atom found by the sibling scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoxRecord {
    pub typ: FourCC,
    /// Offset of the size field in the underlying buffer
    pub start: usize,
    /// Declared size, header included
    pub size: u32,
}

impl BoxRecord {
    pub fn end(&self) -> usize {
        self.start + self.size as usize
    }
}
