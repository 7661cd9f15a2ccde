use crate::boxes::FourCC;

/// Typed view over the atoms this crate knows something about.
///
/// Anything not in this list becomes `KnownBox::Unknown(fourcc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // File-level
    Ftyp,
    Moov,
    Mdat,
    Free,
    Skip,
    Wide,

    // moov / trak
    Mvhd,
    Trak,
    Tkhd,
    Edts,
    Elst,
    Mdia,
    Udta,

    // mdia / minf
    Mdhd,
    Hdlr,
    Minf,
    Vmhd,
    Smhd,
    Dinf,
    Dref,
    Stbl,

    // stbl
    Stsd,
    Stts,
    Ctts,
    Stss,
    Stsc,
    Stsz,
    Stco,
    Co64,

    // QuickTime extras
    Prfl,
    Crgn,
    Kmat,

    Unknown(FourCC),
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"ftyp" => KnownBox::Ftyp,
            b"moov" => KnownBox::Moov,
            b"mdat" => KnownBox::Mdat,
            b"free" => KnownBox::Free,
            b"skip" => KnownBox::Skip,
            b"wide" => KnownBox::Wide,
            b"mvhd" => KnownBox::Mvhd,
            b"trak" => KnownBox::Trak,
            b"tkhd" => KnownBox::Tkhd,
            b"edts" => KnownBox::Edts,
            b"elst" => KnownBox::Elst,
            b"mdia" => KnownBox::Mdia,
            b"udta" => KnownBox::Udta,
            b"mdhd" => KnownBox::Mdhd,
            b"hdlr" => KnownBox::Hdlr,
            b"minf" => KnownBox::Minf,
            b"vmhd" => KnownBox::Vmhd,
            b"smhd" => KnownBox::Smhd,
            b"dinf" => KnownBox::Dinf,
            b"dref" => KnownBox::Dref,
            b"stbl" => KnownBox::Stbl,
            b"stsd" => KnownBox::Stsd,
            b"stts" => KnownBox::Stts,
            b"ctts" => KnownBox::Ctts,
            b"stss" => KnownBox::Stss,
            b"stsc" => KnownBox::Stsc,
            b"stsz" => KnownBox::Stsz,
            b"stco" => KnownBox::Stco,
            b"co64" => KnownBox::Co64,
            b"prfl" => KnownBox::Prfl,
            b"crgn" => KnownBox::Crgn,
            b"kmat" => KnownBox::Kmat,
            _ => KnownBox::Unknown(cc),
        }
    }
}

impl KnownBox {
    /// Atoms whose payload is raw data rather than further atoms, apart from
    /// the `..hd` header atoms which are always leaves.
    pub fn is_listed_leaf(&self) -> bool {
        use KnownBox::*;
        matches!(
            self,
            Ftyp | Mdat | Free | Skip | Wide | Hdlr | Prfl | Crgn | Kmat | Tkhd | Elst | Stts
                | Ctts | Stss | Stsd | Stsz | Stco | Co64 | Stsc
        )
    }

    /// Containers we recognise but cannot walk generically.
    pub fn is_unsupported_container(&self) -> bool {
        matches!(self, KnownBox::Dref)
    }

    pub fn full_name(&self) -> &'static str {
        use KnownBox::*;
        match self {
            Ftyp => "File Type Box",
            Moov => "Movie Box",
            Mdat => "Media Data Box",
            Free => "Free Space Box",
            Skip => "Skip Box",
            Wide => "Wide Box",
            Mvhd => "Movie Header Box",
            Trak => "Track Box",
            Tkhd => "Track Header Box",
            Edts => "Edit Box",
            Elst => "Edit List Box",
            Mdia => "Media Box",
            Udta => "User Data Box",
            Mdhd => "Media Header Box",
            Hdlr => "Handler Reference Box",
            Minf => "Media Information Box",
            Vmhd => "Video Media Header Box",
            Smhd => "Sound Media Header Box",
            Dinf => "Data Information Box",
            Dref => "Data Reference Box",
            Stbl => "Sample Table Box",
            Stsd => "Sample Description Box",
            Stts => "Decoding Time to Sample Box",
            Ctts => "Composition Time to Sample Box",
            Stss => "Sync Sample Box",
            Stsc => "Sample To Chunk Box",
            Stsz => "Sample Size Box",
            Stco => "Chunk Offset Box",
            Co64 => "64-bit Chunk Offset Box",
            Prfl => "Profile Atom",
            Crgn => "Clipping Region Atom",
            Kmat => "Compressed Matte Atom",
            Unknown(_) => "Unknown Box",
        }
    }
}

/// `true` for header atoms, recognised by their `hd` suffix.
pub fn is_header_type(cc: FourCC) -> bool {
    cc.ends_with_hd()
}

/// Leaf/container classification used by the node walker.
pub fn is_leaf(cc: FourCC) -> bool {
    is_header_type(cc) || KnownBox::from(cc).is_listed_leaf()
}

pub fn is_unsupported_container(cc: FourCC) -> bool {
    KnownBox::from(cc).is_unsupported_container()
}
