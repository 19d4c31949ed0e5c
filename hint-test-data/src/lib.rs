//! test data shared by the autohint tests and benches.

/// Glyphs in the bez text format.
///
/// Files of uppercase glyphs carry a trailing underscore, as in UFO, so
/// that `O` and `o` can live side by side on case insensitive file systems.
///
/// The fixtures form a small sans design on a 1000 unit em: stems are 80
/// units wide (90 for `O`), bars 60 units, the baseline is at 0, the
/// x-height at 500 and the cap height at 700 with 12 units of overshoot.
pub mod bez {
    pub static H: &str = include_str!("../test_data/bez/H_.bez");

    pub static I: &str = include_str!("../test_data/bez/I_.bez");

    pub static O: &str = include_str!("../test_data/bez/O_.bez");

    pub static M_LOWER: &str = include_str!("../test_data/bez/m.bez");

    pub static N_LOWER: &str = include_str!("../test_data/bez/n.bez");

    pub static O_LOWER: &str = include_str!("../test_data/bez/o.bez");

    pub static X_LOWER: &str = include_str!("../test_data/bez/x.bez");

    /// A bar with a shallow two curve dip along its bottom edge.
    pub static FLEX: &str = include_str!("../test_data/bez/flex.bez");

    /// A glyph whose only contour is never closed.
    pub static MALFORMED: &str = include_str!("../test_data/bez/malformed.bez");

    include!(concat!(env!("OUT_DIR"), "/bez_glyphs.rs"));
}

/// Font wide alignment and stem data in the fontinfo keyword format.
pub mod fontinfo {
    /// Metrics matching the glyphs in [`bez`](super::bez).
    pub static SANS: &str = include_str!("../test_data/fontinfo/sans.fontinfo");

    /// Arrays and strings spanning several lines, comments and an unknown
    /// keyword.
    pub static MULTILINE: &str = include_str!("../test_data/fontinfo/multiline.fontinfo");
}
