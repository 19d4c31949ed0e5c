//! Font wide dominant stem widths.

use font_types::Fixed;

use crate::{
    fontinfo::FontMetrics,
    hint::{Hint, Orientation},
};

/// Maximum number of entries in a `StemSnapH` or `StemSnapV` array.
pub const MAX_STEM_SNAPS: usize = 12;

/// Dominant stems for one orientation.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DominantStems {
    /// The standard stem width (`StdHW` or `StdVW`).
    pub standard: Option<Fixed>,
    /// Widths that stems snap to, sorted (`StemSnapH` or `StemSnapV`).
    pub snaps: Vec<Fixed>,
}

/// Dominant stems of a font for both orientations.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StemSnaps {
    pub horizontal: DominantStems,
    pub vertical: DominantStems,
}

impl StemSnaps {
    pub fn get(&self, orientation: Orientation) -> &DominantStems {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    /// Uses the widths declared by the font where present and computes the
    /// rest from the hints of every glyph.
    pub(crate) fn compute<'a>(
        hints: impl Iterator<Item = &'a Hint> + Clone,
        metrics: &FontMetrics,
        cluster_tolerance: f64,
    ) -> Self {
        let for_orientation = |orientation| {
            declared(metrics, orientation).unwrap_or_else(|| {
                let widths = hints
                    .clone()
                    .filter(|h| h.orientation == orientation && !h.is_flex())
                    .map(|h| h.width);
                dominant(widths, cluster_tolerance)
            })
        };
        Self {
            horizontal: for_orientation(Orientation::Horizontal),
            vertical: for_orientation(Orientation::Vertical),
        }
    }
}

fn declared(metrics: &FontMetrics, orientation: Orientation) -> Option<DominantStems> {
    let snaps = metrics.declared_snaps(orientation);
    if snaps.is_empty() {
        return None;
    }
    let dominant = match orientation {
        Orientation::Horizontal => &metrics.dominant_h,
        Orientation::Vertical => &metrics.dominant_v,
    };
    let standard = dominant.first().or(snaps.first()).copied();
    Some(DominantStems {
        standard,
        snaps: snaps.into_iter().take(MAX_STEM_SNAPS).collect(),
    })
}

/// Groups widths that lie within `tolerance` of the narrowest width of the
/// group and picks the most frequent width of each group.
///
/// The standard width is the representative of the largest group.
pub(crate) fn dominant(widths: impl Iterator<Item = Fixed>, tolerance: f64) -> DominantStems {
    let mut widths: Vec<Fixed> = widths.filter(|w| *w > Fixed::ZERO).collect();
    if widths.is_empty() {
        return DominantStems::default();
    }
    widths.sort();
    // (representative, group size)
    let mut groups: Vec<(Fixed, usize)> = Vec::new();
    let mut start = 0;
    while start < widths.len() {
        let first = widths[start].to_f64();
        let mut end = start;
        while end < widths.len() && widths[end].to_f64() - first <= tolerance {
            end += 1;
        }
        let group = &widths[start..end];
        let mut representative = group[0];
        let mut best_count = 0;
        let mut run_start = 0;
        while run_start < group.len() {
            let width = group[run_start];
            let run = group[run_start..].iter().take_while(|w| **w == width).count();
            if run > best_count {
                best_count = run;
                representative = width;
            }
            run_start += run;
        }
        groups.push((representative, group.len()));
        start = end;
    }
    let standard = groups
        .iter()
        .min_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
        .map(|(width, _)| *width);
    let mut by_size = groups.clone();
    by_size.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut snaps: Vec<Fixed> = by_size
        .into_iter()
        .take(MAX_STEM_SNAPS)
        .map(|(width, _)| width)
        .collect();
    snaps.sort();
    DominantStems { standard, snaps }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(values: &[i32]) -> impl Iterator<Item = Fixed> + '_ {
        values.iter().map(|v| Fixed::from_i32(*v))
    }

    #[test]
    fn most_common_group_is_standard() {
        let stems = dominant(widths(&[80, 82, 80, 80, 120, 121, 30]), 10.0);
        assert_eq!(stems.standard, Some(Fixed::from_i32(80)));
        assert_eq!(
            stems.snaps,
            [30, 80, 120].map(Fixed::from_i32).to_vec()
        );
    }

    #[test]
    fn no_stems() {
        assert_eq!(dominant(widths(&[]), 10.0), DominantStems::default());
    }

    #[test]
    fn declared_widths_win() {
        let metrics = FontMetrics {
            dominant_v: vec![Fixed::from_i32(84)],
            stem_snap_v: vec![Fixed::from_i32(90), Fixed::from_i32(84)],
            ..Default::default()
        };
        let hints = [Hint::new(
            Orientation::Vertical,
            Fixed::ZERO,
            Fixed::from_i32(60),
        )];
        let snaps = StemSnaps::compute(hints.iter(), &metrics, 10.0);
        assert_eq!(snaps.vertical.standard, Some(Fixed::from_i32(84)));
        assert_eq!(
            snaps.vertical.snaps,
            [Fixed::from_i32(84), Fixed::from_i32(90)]
        );
        // nothing declared for horizontal stems and no horizontal hints
        assert_eq!(snaps.horizontal, DominantStems::default());
    }
}
