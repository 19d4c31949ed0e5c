//! Hint representation shared by synthesis, merging and writing.

use core::fmt;

use font_types::Fixed;

use crate::zone::ZoneId;

/// Direction of the stem edges a hint controls.
///
/// A horizontal hint controls a horizontal bar (`hstem`) and its position
/// is a y coordinate. A vertical hint controls a vertical stem (`vstem`) and
/// its position is an x coordinate.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}

/// Index of a hint in its glyph's hint list.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintIndex(pub usize);

/// Two consecutive curves of a contour that form a flex.
///
/// The second curve is the segment following `segment`, wrapping around at
/// the end of the contour.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlexPair {
    pub contour: usize,
    pub segment: usize,
}

/// A hint attached to a glyph.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hint {
    pub orientation: Orientation,
    /// Lower edge of the stem.
    pub position: Fixed,
    /// Distance from the lower edge to the upper edge. Never negative.
    pub width: Fixed,
    /// Counter link to a neighboring stem of the same orientation.
    pub counter: Option<HintIndex>,
    /// Flex curves controlled by this hint.
    pub flex: Vec<FlexPair>,
    /// False for hints that only mark flex curves and are not written as
    /// stems.
    pub stem: bool,
    /// Zone this hint was snapped to.
    pub zone: Option<ZoneId>,
    /// True if either edge came from a curve extremum.
    pub round: bool,
    /// Stability score. Higher is better.
    pub score: f64,
}

impl Hint {
    pub fn new(orientation: Orientation, position: Fixed, width: Fixed) -> Self {
        Self {
            orientation,
            position,
            width,
            counter: None,
            flex: Vec::new(),
            stem: true,
            zone: None,
            round: false,
            score: 0.0,
        }
    }

    /// Creates a hint that marks a flex pair without controlling a stem.
    pub fn flex(orientation: Orientation, position: Fixed, width: Fixed, pair: FlexPair) -> Self {
        Self {
            flex: vec![pair],
            stem: false,
            ..Self::new(orientation, position, width)
        }
    }

    /// Upper edge of the stem.
    pub fn end(&self) -> Fixed {
        self.position + self.width
    }

    /// Returns true for hints that only mark flex curves.
    ///
    /// A stem that absorbed a flex hint of the same geometry carries the
    /// flex pair but is still a stem.
    pub fn is_flex(&self) -> bool {
        !self.stem
    }

    /// Returns true if the two hints control overlapping ranges on the
    /// same axis.
    pub fn overlaps(&self, other: &Hint) -> bool {
        self.orientation == other.orientation
            && self.position <= other.end()
            && other.position <= self.end()
    }

    /// Key used for the canonical order of hints within a glyph.
    pub(crate) fn sort_key(&self) -> (Orientation, Fixed, Fixed) {
        (self.orientation, self.position, self.width)
    }
}

/// Sorts hints into canonical order and rewrites counter links to the new
/// indices.
///
/// Links to hints that are not present are dropped.
pub(crate) fn sort_canonical(hints: Vec<Hint>) -> Vec<Hint> {
    let mut indexed: Vec<(usize, Hint)> = hints.into_iter().enumerate().collect();
    indexed.sort_by(|(a_ix, a), (b_ix, b)| {
        a.sort_key()
            .cmp(&b.sort_key())
            .then_with(|| a.flex.cmp(&b.flex))
            .then(a_ix.cmp(b_ix))
    });
    let mut new_index = vec![None; indexed.len()];
    for (new_ix, (old_ix, _)) in indexed.iter().enumerate() {
        new_index[*old_ix] = Some(HintIndex(new_ix));
    }
    indexed
        .into_iter()
        .map(|(_, mut hint)| {
            hint.counter = hint
                .counter
                .and_then(|link| new_index.get(link.0).copied().flatten());
            hint
        })
        .collect()
}

/// Returns true if every counter link points to a hint that links back.
pub fn counters_are_symmetric(hints: &[Hint]) -> bool {
    hints.iter().enumerate().all(|(ix, hint)| match hint.counter {
        Some(HintIndex(other)) => {
            other != ix && hints.get(other).and_then(|h| h.counter) == Some(HintIndex(ix))
        }
        None => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(orientation: Orientation, position: i32, width: i32) -> Hint {
        Hint::new(
            orientation,
            Fixed::from_i32(position),
            Fixed::from_i32(width),
        )
    }

    #[test]
    fn overlap_requires_same_orientation() {
        let a = hint(Orientation::Vertical, 100, 80);
        let b = hint(Orientation::Vertical, 150, 80);
        let c = hint(Orientation::Horizontal, 150, 80);
        let d = hint(Orientation::Vertical, 181, 20);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn canonical_order() {
        let mut hints = vec![
            hint(Orientation::Vertical, 10, 5),
            hint(Orientation::Horizontal, 50, 5),
            hint(Orientation::Horizontal, 10, 8),
            hint(Orientation::Horizontal, 10, 5),
        ];
        hints.sort_by_key(Hint::sort_key);
        let keys: Vec<_> = hints.iter().map(Hint::sort_key).collect();
        assert_eq!(
            keys,
            [
                (Orientation::Horizontal, Fixed::from_i32(10), Fixed::from_i32(5)),
                (Orientation::Horizontal, Fixed::from_i32(10), Fixed::from_i32(8)),
                (Orientation::Horizontal, Fixed::from_i32(50), Fixed::from_i32(5)),
                (Orientation::Vertical, Fixed::from_i32(10), Fixed::from_i32(5)),
            ]
        );
    }

    #[test]
    fn reindex_counter_links() {
        let mut a = hint(Orientation::Vertical, 300, 80);
        let mut b = hint(Orientation::Vertical, 100, 80);
        let c = hint(Orientation::Horizontal, 0, 50);
        a.counter = Some(HintIndex(1));
        b.counter = Some(HintIndex(0));
        let sorted = sort_canonical(vec![a, b, c]);
        assert_eq!(sorted[0].orientation, Orientation::Horizontal);
        assert_eq!(sorted[1].position, Fixed::from_i32(100));
        assert_eq!(sorted[1].counter, Some(HintIndex(2)));
        assert_eq!(sorted[2].counter, Some(HintIndex(1)));
        assert!(counters_are_symmetric(&sorted));
    }

    #[test]
    fn asymmetric_links_detected() {
        let mut a = hint(Orientation::Vertical, 0, 80);
        let b = hint(Orientation::Vertical, 200, 80);
        a.counter = Some(HintIndex(1));
        assert!(!counters_are_symmetric(&[a.clone(), b]));
        a.counter = Some(HintIndex(0));
        assert!(!counters_are_symmetric(&[a]));
    }
}
