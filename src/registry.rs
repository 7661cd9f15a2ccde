use crate::boxes::FourCC;
use crate::parser::Result;
use crate::util::{read_bytes, read_fourcc, read_u16, read_u24, read_u32, read_u8};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

/// A single decoded field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Uint(u64),
    #[serde(serialize_with = "as_hex")]
    Bytes(Vec<u8>),
    Code(FourCC),
    /// 3x3 transformation matrix, row-major
    Matrix([[u32; 3]; 3]),
    List(Vec<u64>),
    Table {
        columns: Vec<&'static str>,
        rows: Vec<Vec<u64>>,
    },
    Record(FieldMap),
}

#[allow(clippy::ptr_arg)]
fn as_hex<S: Serializer>(b: &Vec<u8>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(b))
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Uint(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[u64]> {
        match self {
            FieldValue::List(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_rows(&self) -> Option<&[Vec<u64>]> {
        match self {
            FieldValue::Table { rows, .. } => Some(rows),
            _ => None,
        }
    }
    pub fn as_record(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Record(m) => Some(m),
            _ => None,
        }
    }
}

/// Field name to value mapping that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap(Vec<(&'static str, FieldValue)>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing an earlier one with the same name in place.
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.0.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut m = s.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            m.serialize_entry(k, v)?;
        }
        m.end()
    }
}

/// Result of running a registered decoder over a leaf atom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedLeaf {
    pub typ: FourCC,
    pub size: u32,
    pub version: u8,
    pub flags: u32,
    pub fields: FieldMap,
}

impl DecodedLeaf {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// How the registry hands bytes to a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `entry_count` is read from offset 12 and the decoder sees only the
    /// table region that follows it.
    Table,
    /// The decoder sees the whole atom, header included, and reads every
    /// field at its own fixed offset.
    Fixed,
}

/// Trait for leaf decoders.
///
/// The registry has already read the common header (size, type, version,
/// flags) when `decode` runs; decoders add their own fields to `fields`.
pub trait LeafDecoder: Send + Sync {
    fn layout(&self) -> Layout {
        Layout::Table
    }

    fn decode(&self, data: &[u8], fields: &mut FieldMap) -> Result<()>;
}

/// Registry of leaf decoders keyed by four-character code.
///
/// Build it once with [`Registry::with_decoder`] (or start from
/// [`default_registry`]) and hand it to the root node.
pub struct Registry {
    map: HashMap<FourCC, DecoderEntry>,
}

struct DecoderEntry {
    inner: Box<dyn LeafDecoder>,
    name: String,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Return a new registry with the given decoder added.
    ///
    /// `name` is human-readable and used only for logging.
    pub fn with_decoder(mut self, code: FourCC, name: &str, dec: Box<dyn LeafDecoder>) -> Self {
        self.map.insert(
            code,
            DecoderEntry {
                inner: dec,
                name: name.to_string(),
            },
        );
        self
    }

    pub fn contains(&self, code: FourCC) -> bool {
        self.map.contains_key(&code)
    }

    /// Decode a leaf atom. `span` is the whole atom, header included.
    ///
    /// Returns `None` if no decoder exists for `code`. Error offsets are
    /// relative to the start of `span`.
    pub fn decode(&self, code: FourCC, span: &[u8]) -> Option<Result<DecodedLeaf>> {
        self.map.get(&code).map(|d| {
            log::debug!("decoding {code} with {}", d.name);
            decode_with(d.inner.as_ref(), span)
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Size of size + type + version + flags.
const COMMON_HEADER: usize = 12;
const TABLE_START: usize = COMMON_HEADER + 4;

fn decode_with(dec: &dyn LeafDecoder, span: &[u8]) -> Result<DecodedLeaf> {
    let size = read_u32(span, 0)?;
    let typ = read_fourcc(span, 4)?;
    let version = read_u8(span, 8)?;
    let flags = read_u24(span, 9)?;

    let mut fields = FieldMap::new();
    match dec.layout() {
        Layout::Fixed => dec.decode(span, &mut fields)?,
        Layout::Table => {
            fields.insert("entry_count", FieldValue::Uint(read_u32(span, COMMON_HEADER)? as u64));
            let region = read_bytes(span, TABLE_START, span.len().saturating_sub(TABLE_START))?;
            dec.decode(region, &mut fields)
                .map_err(|e| e.at_base(TABLE_START))?;
        }
    }

    Ok(DecodedLeaf { typ, size, version, flags, fields })
}

// ---------- Helpers ----------

fn uint32(data: &[u8], at: usize) -> Result<FieldValue> {
    Ok(FieldValue::Uint(read_u32(data, at)? as u64))
}

/// Read fixed-width rows of u32 columns until `region` is used up.
fn read_rows(region: &[u8], columns: usize) -> Result<Vec<Vec<u64>>> {
    let stride = columns * 4;
    let mut rows = Vec::with_capacity(region.len() / stride);
    let mut c = 0;
    while c < region.len() {
        let mut row = Vec::with_capacity(columns);
        for i in 0..columns {
            row.push(read_u32(region, c + i * 4)? as u64);
        }
        rows.push(row);
        c += stride;
    }
    Ok(rows)
}

// ---------- Decoders ----------

// mvhd: fixed QuickTime layout, version 0
pub struct MvhdDecoder;

const MVHD_TRAILER: [&str; 7] = [
    "preview_time",
    "preview_duration",
    "poster_time",
    "selection_time",
    "selection_duration",
    "current_time",
    "next_track_id",
];

impl LeafDecoder for MvhdDecoder {
    fn layout(&self) -> Layout {
        Layout::Fixed
    }

    fn decode(&self, data: &[u8], fields: &mut FieldMap) -> Result<()> {
        fields.insert("creation_time", uint32(data, 12)?);
        fields.insert("modification_time", uint32(data, 16)?);
        fields.insert("timescale", uint32(data, 20)?);
        fields.insert("duration", uint32(data, 24)?);
        fields.insert("preferred_rate", uint32(data, 28)?);
        fields.insert("preferred_volume", FieldValue::Uint(read_u16(data, 32)? as u64));
        fields.insert("reserved", FieldValue::Bytes(read_bytes(data, 34, 10)?.to_vec()));

        let mut matrix = [[0u32; 3]; 3];
        for (j, row) in matrix.iter_mut().enumerate() {
            for (i, cell) in row.iter_mut().enumerate() {
                *cell = read_u32(data, 44 + (i + j * 3) * 4)?;
            }
        }
        fields.insert("matrix", FieldValue::Matrix(matrix));

        for (i, name) in MVHD_TRAILER.into_iter().enumerate() {
            fields.insert(name, uint32(data, 80 + i * 4)?);
        }
        Ok(())
    }
}

// tkhd: times, track id and duration
pub struct TkhdDecoder;

impl LeafDecoder for TkhdDecoder {
    fn layout(&self) -> Layout {
        Layout::Fixed
    }

    fn decode(&self, data: &[u8], fields: &mut FieldMap) -> Result<()> {
        fields.insert("creation_time", uint32(data, 12)?);
        fields.insert("modification_time", uint32(data, 16)?);
        fields.insert("track_id", uint32(data, 20)?);
        fields.insert("reserved", FieldValue::Bytes(read_bytes(data, 24, 4)?.to_vec()));
        // sum of the track's edit durations, in movie timescale units
        fields.insert("duration", uint32(data, 28)?);
        Ok(())
    }
}

// stsz: sample sizes
pub struct StszDecoder;

impl LeafDecoder for StszDecoder {
    fn layout(&self) -> Layout {
        Layout::Fixed
    }

    fn decode(&self, data: &[u8], fields: &mut FieldMap) -> Result<()> {
        let sample_size = read_u32(data, 12)?;
        let entry_count = read_u32(data, 16)? as usize;

        // The table is read as given even when sample_size is non-zero.
        let table = read_bytes(data, 20, entry_count.saturating_mul(4))?;
        let sizes = table
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]) as u64)
            .collect();

        fields.insert("sample_size", FieldValue::Uint(sample_size as u64));
        fields.insert("entry_count", FieldValue::Uint(entry_count as u64));
        fields.insert("sample_sizes", FieldValue::List(sizes));
        Ok(())
    }
}

// stsd: generic sample description header of the first entry
pub struct StsdDecoder;

impl LeafDecoder for StsdDecoder {
    fn decode(&self, data: &[u8], fields: &mut FieldMap) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        // [4 size][4 format][6 reserved][2 data reference index]
        let mut entry = FieldMap::new();
        entry.insert("entry_size", uint32(data, 0)?);
        entry.insert("data_format", FieldValue::Code(read_fourcc(data, 4)?));
        entry.insert("reserved", FieldValue::Bytes(read_bytes(data, 8, 6)?.to_vec()));
        entry.insert("data_reference_index", FieldValue::Uint(read_u16(data, 14)? as u64));
        fields.insert("table_data", FieldValue::Record(entry));
        Ok(())
    }
}

// stts: time-to-sample
pub struct SttsDecoder;

impl LeafDecoder for SttsDecoder {
    fn decode(&self, data: &[u8], fields: &mut FieldMap) -> Result<()> {
        fields.insert(
            "table_data",
            FieldValue::Table {
                columns: vec!["sample_count", "sample_duration"],
                rows: read_rows(data, 2)?,
            },
        );
        Ok(())
    }
}

// stsc: sample-to-chunk
pub struct StscDecoder;

impl LeafDecoder for StscDecoder {
    fn decode(&self, data: &[u8], fields: &mut FieldMap) -> Result<()> {
        fields.insert(
            "table_data",
            FieldValue::Table {
                columns: vec!["first_chunk", "samples_per_chunk", "sample_description_id"],
                rows: read_rows(data, 3)?,
            },
        );
        Ok(())
    }
}

// stco: 32-bit chunk offsets
pub struct StcoDecoder;

impl LeafDecoder for StcoDecoder {
    fn decode(&self, data: &[u8], fields: &mut FieldMap) -> Result<()> {
        let mut offsets = Vec::with_capacity(data.len() / 4);
        let mut c = 0;
        while c < data.len() {
            offsets.push(read_u32(data, c)? as u64);
            c += 4;
        }
        fields.insert("table_data", FieldValue::List(offsets));
        Ok(())
    }
}

// ---------- Default registry ----------
pub fn default_registry() -> Registry {
    Registry::new()
        .with_decoder(FourCC(*b"mvhd"), "mvhd", Box::new(MvhdDecoder))
        .with_decoder(FourCC(*b"tkhd"), "tkhd", Box::new(TkhdDecoder))
        .with_decoder(FourCC(*b"stsz"), "stsz", Box::new(StszDecoder))
        .with_decoder(FourCC(*b"stsd"), "stsd", Box::new(StsdDecoder))
        .with_decoder(FourCC(*b"stts"), "stts", Box::new(SttsDecoder))
        .with_decoder(FourCC(*b"stsc"), "stsc", Box::new(StscDecoder))
        .with_decoder(FourCC(*b"stco"), "stco", Box::new(StcoDecoder))
}
