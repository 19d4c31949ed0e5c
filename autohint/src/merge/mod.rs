//! Cross-glyph reconciliation of hints.
//!
//! The [`Merger`] owns every glyph of a font run and moves through a fixed
//! sequence of states:
//!
//! 1. [`MergerState::Uninitialized`]: glyphs are added with
//!    [`Merger::add_glyph`].
//! 2. [`MergerState::ZonesCollected`]: [`Merger::collect_zones`] has built
//!    the font wide zone set from the anchors of all glyphs.
//! 3. [`MergerState::GlyphsSnapped`]: [`Merger::snap_glyphs`] has aligned
//!    the hints of every glyph to the zones.
//! 4. [`MergerState::Finalized`]: [`Merger::finalize`] has computed the
//!    dominant stems and the hint programs that the writers consume.
//!
//! Calling an operation in any other state fails with a
//! [`MergerStateError`].

mod snap;
mod stems;
mod zones;

use font_types::Fixed;

pub use stems::{DominantStems, StemSnaps, MAX_STEM_SNAPS};
pub use zones::{MAX_BOTTOM_ZONES, MAX_TOP_ZONES};

use crate::{
    config::HintConfig,
    error::MergerStateError,
    fontinfo::FontMetrics,
    hint::Hint,
    outline::GlyphOutline,
    synth::{GlyphHints, ZoneAnchor},
    zone::{ZoneId, ZoneSet},
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Lifecycle of a [`Merger`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum MergerState {
    Uninitialized,
    ZonesCollected,
    GlyphsSnapped,
    Finalized,
}

/// Final hints of a glyph, ready to be encoded.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintProgram {
    pub name: String,
    pub advance_width: Fixed,
    /// Hints in canonical order.
    pub hints: Vec<Hint>,
    /// Zones referenced by the hints, sorted.
    pub zones: Vec<ZoneId>,
}

#[derive(Clone, Debug)]
struct GlyphEntry {
    outline: GlyphOutline,
    hints: Vec<Hint>,
    anchors: Vec<ZoneAnchor>,
}

/// Reconciles the hints of all glyphs in a font.
#[derive(Clone, Debug)]
pub struct Merger {
    config: HintConfig,
    metrics: FontMetrics,
    state: MergerState,
    glyphs: Vec<GlyphEntry>,
    zones: ZoneSet,
    stem_snaps: StemSnaps,
    programs: Vec<HintProgram>,
}

impl Merger {
    pub fn new(config: HintConfig, metrics: FontMetrics) -> Self {
        Self {
            config,
            metrics,
            state: MergerState::Uninitialized,
            glyphs: Vec::new(),
            zones: ZoneSet::default(),
            stem_snaps: StemSnaps::default(),
            programs: Vec::new(),
        }
    }

    pub fn state(&self) -> MergerState {
        self.state
    }

    pub fn config(&self) -> &HintConfig {
        &self.config
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Number of glyphs added to the merger.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    fn require(
        &self,
        operation: &'static str,
        expected: MergerState,
    ) -> Result<(), MergerStateError> {
        if self.state != expected {
            return Err(MergerStateError {
                operation,
                expected,
                found: self.state,
            });
        }
        Ok(())
    }

    /// Adds a glyph with its synthesized hints.
    pub fn add_glyph(
        &mut self,
        outline: GlyphOutline,
        hints: GlyphHints,
    ) -> Result<(), MergerStateError> {
        self.require("add_glyph", MergerState::Uninitialized)?;
        self.glyphs.push(GlyphEntry {
            outline,
            hints: hints.hints,
            anchors: hints.anchors,
        });
        Ok(())
    }

    /// Builds the zone set from the anchors of every glyph.
    pub fn collect_zones(&mut self) -> Result<&ZoneSet, MergerStateError> {
        self.require("collect_zones", MergerState::Uninitialized)?;
        let anchors: Vec<_> = self
            .glyphs
            .iter()
            .enumerate()
            .flat_map(|(glyph, entry)| {
                entry
                    .anchors
                    .iter()
                    .map(move |anchor| zones::SourcedAnchor {
                        glyph,
                        anchor: *anchor,
                    })
            })
            .collect();
        self.zones = zones::collect(&anchors, &self.config, &self.metrics);
        log::debug!(
            "collected {} zones from {} anchors in {} glyphs",
            self.zones.len(),
            anchors.len(),
            self.glyphs.len()
        );
        self.state = MergerState::ZonesCollected;
        Ok(&self.zones)
    }

    /// Snaps the hints of every glyph to the zone set.
    ///
    /// Glyphs are processed in parallel when the `rayon` feature is
    /// enabled.
    pub fn snap_glyphs(&mut self) -> Result<(), MergerStateError> {
        self.require("snap_glyphs", MergerState::ZonesCollected)?;
        let zones = &self.zones;
        let fuzz = Fixed::from_f64(self.config.zone_tolerance);
        let counter_tolerance = self.config.counter_tolerance;
        let snap_entry = |entry: &mut GlyphEntry| {
            let hints = core::mem::take(&mut entry.hints);
            entry.hints =
                snap::snap_and_dedupe(entry.outline.name(), hints, zones, fuzz, counter_tolerance);
        };
        #[cfg(feature = "rayon")]
        self.glyphs.par_iter_mut().for_each(snap_entry);
        #[cfg(not(feature = "rayon"))]
        self.glyphs.iter_mut().for_each(snap_entry);
        self.state = MergerState::GlyphsSnapped;
        Ok(())
    }

    /// Computes the dominant stems and builds the hint programs.
    pub fn finalize(&mut self) -> Result<(), MergerStateError> {
        self.require("finalize", MergerState::GlyphsSnapped)?;
        self.stem_snaps = StemSnaps::compute(
            self.glyphs.iter().flat_map(|entry| entry.hints.iter()),
            &self.metrics,
            self.config.stem_cluster_tolerance,
        );
        log::debug!(
            "dominant stems: horizontal {:?}, vertical {:?}",
            self.stem_snaps.horizontal.standard,
            self.stem_snaps.vertical.standard
        );
        self.programs = self
            .glyphs
            .iter()
            .map(|entry| {
                let mut zones: Vec<_> = entry.hints.iter().filter_map(|h| h.zone).collect();
                zones.sort();
                zones.dedup();
                HintProgram {
                    name: entry.outline.name().to_string(),
                    advance_width: entry.outline.metrics().advance_width,
                    hints: entry.hints.clone(),
                    zones,
                }
            })
            .collect();
        self.state = MergerState::Finalized;
        Ok(())
    }

    /// Returns the zone set. Empty until zones are collected.
    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    /// Returns the current hints of the named glyph.
    pub fn glyph_hints(&self, name: &str) -> Option<&[Hint]> {
        self.glyphs
            .iter()
            .find(|entry| entry.outline.name() == name)
            .map(|entry| entry.hints.as_slice())
    }

    /// Returns the dominant stems of the font.
    pub fn stem_snaps(&self) -> Result<&StemSnaps, MergerStateError> {
        self.require("stem_snaps", MergerState::Finalized)?;
        Ok(&self.stem_snaps)
    }

    /// Returns the hint programs of every glyph in the order they were
    /// added.
    pub fn programs(&self) -> Result<&[HintProgram], MergerStateError> {
        self.require("programs", MergerState::Finalized)?;
        Ok(&self.programs)
    }

    /// Returns the outlines of every glyph in the order they were added.
    pub fn outlines(&self) -> impl Iterator<Item = &GlyphOutline> + '_ {
        self.glyphs.iter().map(|entry| &entry.outline)
    }
}
