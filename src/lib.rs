pub mod api;
pub mod boxes;
pub mod known_boxes;
pub mod node;
pub mod parser;
pub mod registry;
pub mod render;
pub mod util;

pub use api::{DEFAULT_HEAD_MAX, Mp4Head};
pub use boxes::{BoxRecord, BoxType, FourCC};
pub use node::{BoxNode, Child, OpaqueLeaf};
pub use parser::{ParseError, scan};
pub use registry::{DecodedLeaf, FieldMap, FieldValue, LeafDecoder, Registry, default_registry};
