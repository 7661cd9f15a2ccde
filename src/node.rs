use crate::boxes::{BoxRecord, BoxType, FourCC, HEADER_SIZE};
use crate::known_boxes::{is_leaf, is_unsupported_container};
use crate::parser::{scan, ParseError, Result};
use crate::registry::{DecodedLeaf, Registry};
use crate::util::{read_bytes, read_fourcc, read_u32};
use std::fmt;
use std::sync::OnceLock;

/// A view of one atom inside a shared, borrowed buffer.
///
/// `offset` is where the atom's content begins (just past its 8-byte header;
/// 0 for the root) and `size` is the declared size including the header.
/// Children are scanned on first use and cached for the node's lifetime.
pub struct BoxNode<'a> {
    data: &'a [u8],
    registry: &'a Registry,
    offset: usize,
    size: usize,
    typ: BoxType,
    is_leaf: bool,
    strict: bool,
    children: OnceLock<Vec<BoxRecord>>,
}

impl fmt::Debug for BoxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxNode")
            .field("typ", &self.typ)
            .field("offset", &self.offset)
            .field("size", &self.size)
            .field("is_leaf", &self.is_leaf)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

/// What a lookup by type code produces for one matching atom.
#[derive(Debug)]
pub enum Child<'a> {
    /// A container, walkable further.
    Node(BoxNode<'a>),
    /// A leaf decoded by a registered decoder, with the record it came from.
    Leaf(BoxRecord, DecodedLeaf),
    /// A leaf with no registered decoder; raw bytes only.
    Opaque(OpaqueLeaf<'a>),
    /// A container we know but cannot walk yet (`dref`).
    Unsupported(OpaqueLeaf<'a>),
}

/// An atom handed back undecoded.
#[derive(Debug, Clone, Copy)]
pub struct OpaqueLeaf<'a> {
    record: BoxRecord,
    data: &'a [u8],
}

impl<'a> OpaqueLeaf<'a> {
    pub fn record(&self) -> BoxRecord {
        self.record
    }

    /// The whole atom, header included.
    pub fn bytes(&self) -> Result<&'a [u8]> {
        read_bytes(self.data, self.record.start, self.record.size as usize)
    }

    /// The atom without its 8-byte header.
    pub fn payload(&self) -> Result<&'a [u8]> {
        let bytes = self.bytes()?;
        bytes.get(HEADER_SIZE..).ok_or(ParseError::Truncated {
            offset: self.record.start,
            needed: HEADER_SIZE,
            available: bytes.len(),
        })
    }
}

impl<'a> BoxNode<'a> {
    /// Root node spanning the whole buffer.
    pub fn root(data: &'a [u8], registry: &'a Registry, strict: bool) -> Self {
        Self::new(data, registry, 0, data.len(), BoxType::Root, strict)
    }

    /// Node for the atom whose header starts at `offset`.
    pub fn parse(data: &'a [u8], registry: &'a Registry, offset: usize, strict: bool) -> Result<Self> {
        let size = read_u32(data, offset)?;
        let typ = read_fourcc(data, offset + 4)?;
        if (size as usize) < HEADER_SIZE {
            return Err(ParseError::MalformedSize { offset, size });
        }
        Ok(Self::new(
            data,
            registry,
            offset + HEADER_SIZE,
            size as usize,
            BoxType::Code(typ),
            strict,
        ))
    }

    pub fn new(
        data: &'a [u8],
        registry: &'a Registry,
        offset: usize,
        size: usize,
        typ: BoxType,
        strict: bool,
    ) -> Self {
        let is_leaf = match typ {
            BoxType::Root => false,
            BoxType::Code(cc) => is_leaf(cc),
        };
        Self {
            data,
            registry,
            offset,
            size,
            typ,
            is_leaf,
            strict,
            children: OnceLock::new(),
        }
    }

    /// Where the atom's header begins; 0 for the root.
    pub fn start(&self) -> usize {
        if self.is_root() {
            self.offset
        } else {
            self.offset.saturating_sub(HEADER_SIZE)
        }
    }

    pub fn box_type(&self) -> BoxType {
        self.typ
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_root(&self) -> bool {
        self.typ == BoxType::Root
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn content_len(&self) -> usize {
        if self.is_root() {
            self.size
        } else {
            self.size.saturating_sub(HEADER_SIZE)
        }
    }

    /// Immediate children of a container; empty for a leaf.
    pub fn children(&self) -> Result<&[BoxRecord]> {
        if self.is_leaf {
            return Ok(&[]);
        }
        if let Some(kids) = self.children.get() {
            return Ok(kids);
        }
        let kids = scan(self.data, self.offset, self.content_len(), self.strict)?;
        Ok(self.children.get_or_init(|| kids))
    }

    /// Every child whose type is `code`, in file order.
    ///
    /// The result is empty when nothing matches. Fails on the first matching
    /// child that cannot be read; the node itself stays usable.
    pub fn child(&self, code: &str) -> Result<Vec<Child<'a>>> {
        let cc = FourCC::from_str(code).ok_or_else(|| ParseError::InvalidFourCC(code.to_string()))?;
        self.children()?
            .iter()
            .filter(|rec| rec.typ == cc)
            .map(|rec| self.expand(*rec))
            .collect()
    }

    /// First child of type `code`, if any.
    pub fn first(&self, code: &str) -> Result<Option<Child<'a>>> {
        Ok(self.child(code)?.into_iter().next())
    }

    /// Turn one of this node's records into a decoded leaf, placeholder or
    /// nested node.
    pub fn expand(&self, rec: BoxRecord) -> Result<Child<'a>> {
        if is_leaf(rec.typ) {
            let span = read_bytes(self.data, rec.start, rec.size as usize)?;
            return match self.registry.decode(rec.typ, span) {
                Some(res) => res.map(|leaf| Child::Leaf(rec, leaf)).map_err(|e| e.at_base(rec.start)),
                None => Ok(Child::Opaque(OpaqueLeaf { record: rec, data: self.data })),
            };
        }

        if is_unsupported_container(rec.typ) {
            log::warn!("no parser for '{}' @ {:#x}; returning it undecoded", rec.typ, rec.start);
            return Ok(Child::Unsupported(OpaqueLeaf { record: rec, data: self.data }));
        }

        log::debug!("expanding {} @ {:#x} ({} bytes)", rec.typ, rec.start, rec.size);
        Ok(Child::Node(BoxNode::new(
            self.data,
            self.registry,
            rec.start + HEADER_SIZE,
            rec.size as usize,
            BoxType::Code(rec.typ),
            self.strict,
        )))
    }
}

impl<'a> Child<'a> {
    pub fn as_node(&self) -> Option<&BoxNode<'a>> {
        match self {
            Child::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<BoxNode<'a>> {
        match self {
            Child::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&DecodedLeaf> {
        match self {
            Child::Leaf(_, l) => Some(l),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&OpaqueLeaf<'a>> {
        match self {
            Child::Opaque(o) | Child::Unsupported(o) => Some(o),
            _ => None,
        }
    }

    pub fn type_code(&self) -> Option<FourCC> {
        match self {
            Child::Node(n) => n.box_type().code(),
            Child::Leaf(_, l) => Some(l.typ),
            Child::Opaque(o) | Child::Unsupported(o) => Some(o.record.typ),
        }
    }

    /// Offset of the atom's header in the buffer.
    pub fn start(&self) -> usize {
        match self {
            Child::Node(n) => n.start(),
            Child::Leaf(rec, _) => rec.start,
            Child::Opaque(o) | Child::Unsupported(o) => o.record.start,
        }
    }
}
