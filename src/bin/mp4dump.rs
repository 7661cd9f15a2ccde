use clap::{ArgAction, Parser};
use mp4atoms::{BoxNode, Child, DEFAULT_HEAD_MAX, DecodedLeaf, Mp4Head};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about = "MP4/QuickTime atom tree explorer")]
struct Args {
    /// MP4/QuickTime file path
    path: String,

    /// Read at most this many bytes from the start of the file
    #[arg(long, default_value_t = DEFAULT_HEAD_MAX)]
    max_bytes: u64,

    /// Fail as soon as an atom runs past the loaded bytes
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Only print subtree(s) matching a dotted path (e.g. moov.trak[0].mdia.minf.stbl)
    #[arg(long = "select")]
    select: Option<String>,

    /// Limit recursion depth
    #[arg(long, default_value_t = 64)]
    depth: usize,

    /// Emit JSON instead of human-readable tree
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let head = Mp4Head::from_path(&args.path, args.max_bytes)?.strict(args.strict);
    let root = head.root();

    let targets = match &args.select {
        Some(path) => select_by_path(root, path)?,
        None => vec![Child::Node(root)],
    };

    if args.json {
        let json: Vec<JsonAtom> = targets
            .iter()
            .map(|c| build_json(c, 0, args.depth))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    for t in &targets {
        print_child(t, 0, args.depth);
    }
    Ok(())
}

// ---------- Human-readable tree ----------

fn print_indented(text: &str, depth: usize) {
    let indent = "  ".repeat(depth);
    for line in text.lines() {
        println!("{indent}{line}");
    }
}

fn print_child(c: &Child<'_>, depth: usize, max_depth: usize) {
    match c {
        Child::Node(n) => print_node(n, depth, max_depth),
        other => print_indented(&other.to_string(), depth),
    }
}

fn print_node(n: &BoxNode<'_>, depth: usize, max_depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{indent}{:>8} {:>10} {} (container)",
        format!("{:#x}", n.start()),
        n.size(),
        n.box_type()
    );
    if depth + 1 > max_depth {
        return;
    }

    let kids = match n.children() {
        Ok(kids) => kids,
        Err(e) => {
            println!("{indent}  [children unreadable: {e}]");
            return;
        }
    };
    for rec in kids {
        match n.expand(*rec) {
            Ok(c) => print_child(&c, depth + 1, max_depth),
            Err(e) => println!("{indent}  {} @ {:#x}: [error: {e}]", rec.typ, rec.start),
        }
    }
}

// ---------- Select path: moov.trak[0].mdia.minf.stbl ----------

fn select_by_path<'a>(root: BoxNode<'a>, path: &str) -> anyhow::Result<Vec<Child<'a>>> {
    let mut current = vec![Child::Node(root)];

    for seg in path.split('.') {
        let (name, idx) = parse_segment(seg);
        let mut next = Vec::new();

        for c in &current {
            if let Child::Node(n) = c {
                let mut matches = n.child(name)?;
                match idx {
                    Some(i) if i < matches.len() => next.push(matches.swap_remove(i)),
                    Some(_) => {}
                    None => next.append(&mut matches),
                }
            }
        }

        current = next;
        if current.is_empty() {
            break;
        }
    }

    Ok(current)
}

fn parse_segment(seg: &str) -> (&str, Option<usize>) {
    if let Some(l) = seg.find('[') {
        let name = &seg[..l];
        if let Some(r) = seg[l + 1..].find(']') {
            let idx_str = &seg[l + 1..l + 1 + r];
            let idx = idx_str.parse::<usize>().ok();
            return (name, idx);
        }
        (name, None)
    } else {
        (seg, None)
    }
}

// ---------- JSON representation ----------

#[derive(Serialize)]
struct JsonAtom {
    typ: String,
    offset: usize,
    size: usize,
    kind: &'static str,
    decoded: Option<DecodedLeaf>,
    error: Option<String>,
    children: Option<Vec<JsonAtom>>,
}

fn build_json(c: &Child<'_>, depth: usize, max_depth: usize) -> JsonAtom {
    match c {
        Child::Node(n) => {
            let mut error = None;
            let children = if depth + 1 > max_depth {
                None
            } else {
                match n.children() {
                    Ok(kids) => Some(
                        kids.iter()
                            .map(|rec| match n.expand(*rec) {
                                Ok(c) => build_json(&c, depth + 1, max_depth),
                                Err(e) => JsonAtom {
                                    typ: rec.typ.to_string(),
                                    offset: rec.start,
                                    size: rec.size as usize,
                                    kind: "error",
                                    decoded: None,
                                    error: Some(e.to_string()),
                                    children: None,
                                },
                            })
                            .collect(),
                    ),
                    Err(e) => {
                        error = Some(e.to_string());
                        None
                    }
                }
            };
            JsonAtom {
                typ: n.box_type().to_string(),
                offset: n.start(),
                size: n.size(),
                kind: "container",
                decoded: None,
                error,
                children,
            }
        }
        Child::Leaf(rec, l) => JsonAtom {
            typ: l.typ.to_string(),
            offset: rec.start,
            size: l.size as usize,
            kind: "leaf",
            decoded: Some(l.clone()),
            error: None,
            children: None,
        },
        Child::Opaque(o) | Child::Unsupported(o) => JsonAtom {
            typ: o.record().typ.to_string(),
            offset: o.record().start,
            size: o.record().size as usize,
            kind: if matches!(c, Child::Opaque(_)) { "opaque" } else { "unsupported" },
            decoded: None,
            error: None,
            children: None,
        },
    }
}
