//! Human-readable summaries of nodes and decoded leaves.

use crate::known_boxes::KnownBox;
use crate::node::{BoxNode, Child, OpaqueLeaf};
use crate::registry::{DecodedLeaf, FieldValue};
use crate::util::hex_dump;
use std::fmt;

/// Lists longer than this are shown as first/last only.
pub const MAX_LIST_PRINT: usize = 10;

/// Bytes of an undecoded atom shown in its hex dump.
pub const OPAQUE_PREVIEW: usize = 64;

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    if items.len() > MAX_LIST_PRINT {
        write!(
            f,
            "(List with {} elements: [{},...,{}])",
            items.len(),
            items[0],
            items[items.len() - 1]
        )
    } else {
        let joined: Vec<String> = items.iter().map(|i| i.to_string()).collect();
        write!(f, "(List with {} elements: [{}])", items.len(), joined.join(","))
    }
}

struct Row<'r>(&'r [u64]);

impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "({})", cells.join(","))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Uint(v) => write!(f, "{v}"),
            FieldValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            FieldValue::Code(cc) => write!(f, "'{cc}'"),
            FieldValue::Matrix(m) => {
                let rows: Vec<String> = m.iter().map(|r| Row(&r.map(u64::from)).to_string()).collect();
                write!(f, "[{}]", rows.join(","))
            }
            FieldValue::List(v) => write_list(f, v),
            FieldValue::Table { columns, rows } => {
                let rows: Vec<Row<'_>> = rows.iter().map(|r| Row(r)).collect();
                write!(f, "{} ", columns.join("|"))?;
                write_list(f, &rows)
            }
            FieldValue::Record(m) => {
                let parts: Vec<String> = m.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl fmt::Display for DecodedLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Leaf Atom ({}) {} bytes [{}]",
            self.typ,
            self.size,
            KnownBox::from(self.typ).full_name()
        )?;
        writeln!(f, "  version : {}", self.version)?;
        writeln!(f, "  flags : 0x{:06x}", self.flags)?;
        for (k, v) in self.fields.iter() {
            writeln!(f, "  {k} : {v}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BoxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.children() {
            Ok(kids) => {
                write!(f, "(Atom of type '{}' with {} children", self.box_type(), kids.len())?;
                for c in kids {
                    write!(f, "\n  {} : (offs: {}, size: {})", c.typ, c.start, c.size)?;
                }
                write!(f, ")")
            }
            Err(e) => write!(f, "(Atom of type '{}' [children unreadable: {e}])", self.box_type()),
        }
    }
}

fn write_opaque(f: &mut fmt::Formatter<'_>, o: &OpaqueLeaf<'_>) -> fmt::Result {
    let rec = o.record();
    writeln!(
        f,
        "Leaf Atom ({}) {} bytes [{}], no decoder",
        rec.typ,
        rec.size,
        KnownBox::from(rec.typ).full_name()
    )?;
    match o.bytes() {
        Ok(b) => {
            let shown = &b[..b.len().min(OPAQUE_PREVIEW)];
            write!(f, "{}", hex_dump(shown, rec.start as u64))
        }
        Err(e) => writeln!(f, "  [unreadable: {e}]"),
    }
}

impl fmt::Display for Child<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Node(n) => write!(f, "{n}"),
            Child::Leaf(_, l) => write!(f, "{l}"),
            Child::Opaque(o) => write_opaque(f, o),
            Child::Unsupported(o) => {
                writeln!(
                    f,
                    "----> WARNING: the parser for '{}' is not implemented; contents are not decoded",
                    o.record().typ
                )?;
                write_opaque(f, o)
            }
        }
    }
}
