//! Per glyph snapping of hints to alignment zones.

use font_types::Fixed;

use crate::{
    hint::{self, Hint, HintIndex, Orientation},
    synth,
    zone::ZoneSet,
};

/// Snaps horizontal stems into zone bands and tidies the hint list
/// afterward.
///
/// A stem whose bottom edge lies in a bottom zone is moved so that the edge
/// sits on the zone coordinate; otherwise a stem whose top edge lies in a
/// top zone is moved likewise. A stem that already carries a zone is only
/// realigned to that zone. Duplicates created by snapping are merged
/// with the higher scoring hint surviving, overlapping stems are resolved
/// again, counter links between stems whose widths differ by more than the
/// tolerance are removed and the hints are put back in canonical order.
///
/// Applying this twice gives the same result as applying it once.
pub(crate) fn snap_and_dedupe(
    glyph_name: &str,
    mut hints: Vec<Hint>,
    zones: &ZoneSet,
    fuzz: Fixed,
    counter_tolerance: f64,
) -> Vec<Hint> {
    for hint in hints.iter_mut() {
        if hint.orientation == Orientation::Horizontal && !hint.is_flex() {
            snap(hint, zones, fuzz);
        }
    }
    // collapse hints with identical geometry into the first of each group
    let mut merged_into: Vec<usize> = (0..hints.len()).collect();
    for ix in 0..hints.len() {
        if let Some(first) = (0..ix).find(|&other| {
            merged_into[other] == other && same_geometry(&hints[other], &hints[ix])
        }) {
            merged_into[ix] = first;
        }
    }
    let mut groups: Vec<Option<Hint>> = vec![None; hints.len()];
    for (ix, hint) in hints.iter().enumerate() {
        let target = merged_into[ix];
        let merged = match groups[target].take() {
            None => hint.clone(),
            Some(existing) => merge_duplicates(existing, hint),
        };
        groups[target] = Some(merged);
    }
    // resolve overlaps between surviving stems
    let mut survivors: Vec<(usize, Hint)> = groups
        .into_iter()
        .enumerate()
        .filter_map(|(ix, hint)| hint.map(|hint| (ix, hint)))
        .collect();
    let mut rejected = Vec::new();
    for orientation in Orientation::ALL {
        let stems: Vec<Hint> = survivors
            .iter()
            .filter(|(_, h)| h.orientation == orientation && !h.is_flex())
            .map(|(_, h)| h.clone())
            .collect();
        let kept = synth::resolve_conflicts(stems, &mut rejected);
        survivors.retain(|(_, h)| {
            h.orientation != orientation
                || h.is_flex()
                || kept.iter().any(|k| same_geometry(k, h))
        });
    }
    for error in &rejected {
        log::trace!("{glyph_name}: {error} after snapping");
    }
    // counter links now refer to group representatives
    let position_of = |group: usize| survivors.iter().position(|(ix, _)| *ix == group);
    let proposed: Vec<Option<usize>> = survivors
        .iter()
        .map(|(_, hint)| {
            let partner = merged_into.get(hint.counter?.0).copied()?;
            position_of(partner)
        })
        .collect();
    let mut result: Vec<Hint> = survivors.iter().map(|(_, h)| h.clone()).collect();
    for (ix, hint) in result.iter_mut().enumerate() {
        hint.counter = proposed[ix]
            .filter(|&partner| partner != ix && proposed[partner] == Some(ix))
            .filter(|&partner| {
                let (a, b) = (&survivors[ix].1, &survivors[partner].1);
                a.orientation == b.orientation
                    && (a.width - b.width).abs().to_f64() <= counter_tolerance
            })
            .map(HintIndex);
    }
    hint::sort_canonical(result)
}

fn snap(hint: &mut Hint, zones: &ZoneSet, fuzz: Fixed) {
    // a snapped stem stays on its zone, its other edge may now sit in a
    // band of the opposite side
    if let Some(zone) = hint.zone.and_then(|id| zones.get(id)) {
        hint.position = if zone.kind.is_top() {
            zone.position - hint.width
        } else {
            zone.position
        };
        return;
    }
    if let Some((id, zone)) = zones.bottom_zone_at(hint.position, fuzz) {
        hint.position = zone.position;
        hint.zone = Some(id);
    } else if let Some((id, zone)) = zones.top_zone_at(hint.end(), fuzz) {
        hint.position = zone.position - hint.width;
        hint.zone = Some(id);
    }
}

fn same_geometry(a: &Hint, b: &Hint) -> bool {
    a.sort_key() == b.sort_key()
}

/// Combines two hints with the same geometry. The higher score wins and
/// keeps its links; flex markers of both are preserved and the result is a
/// stem if either hint is.
fn merge_duplicates(existing: Hint, other: &Hint) -> Hint {
    let (mut winner, loser) = if other.score > existing.score {
        (other.clone(), existing)
    } else {
        (existing, other.clone())
    };
    winner.counter = winner.counter.or(loser.counter);
    winner.zone = winner.zone.or(loser.zone);
    winner.round |= loser.round;
    winner.stem |= loser.stem;
    winner.flex.extend(loser.flex);
    winner.flex.sort();
    winner.flex.dedup();
    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hint::counters_are_symmetric,
        zone::{Zone, ZoneId, ZoneKind},
    };

    fn fixed(value: i32) -> Fixed {
        Fixed::from_i32(value)
    }

    fn stem(orientation: Orientation, position: i32, width: i32, score: f64) -> Hint {
        let mut hint = Hint::new(orientation, fixed(position), fixed(width));
        hint.score = score;
        hint
    }

    fn zones() -> ZoneSet {
        ZoneSet::new(vec![
            Zone::new(ZoneKind::Baseline, fixed(0), fixed(-12)),
            Zone::new(ZoneKind::XHeight, fixed(500), fixed(12)),
        ])
    }

    fn run(hints: Vec<Hint>) -> Vec<Hint> {
        snap_and_dedupe("test", hints, &zones(), Fixed::ZERO, 2.0)
    }

    #[test]
    fn snaps_to_zone_coordinate() {
        let hints = run(vec![
            stem(Orientation::Horizontal, -10, 60, 1.0),
            stem(Orientation::Horizontal, 450, 58, 1.0),
            stem(Orientation::Horizontal, 250, 50, 1.0),
            stem(Orientation::Vertical, -10, 60, 1.0),
        ]);
        let zones = zones();
        let horizontal: Vec<_> = hints
            .iter()
            .filter(|h| h.orientation == Orientation::Horizontal)
            .map(|h| (h.position, h.width, h.zone))
            .collect();
        assert_eq!(
            horizontal,
            [
                (fixed(0), fixed(60), Some(ZoneId(0))),
                (fixed(250), fixed(50), None),
                (fixed(442), fixed(58), Some(ZoneId(1))),
            ]
        );
        for hint in hints.iter().filter(|h| h.zone.is_some()) {
            let zone = zones.get(hint.zone.unwrap()).unwrap();
            let edge = if zone.kind.is_top() {
                hint.end()
            } else {
                hint.position
            };
            assert_eq!(edge, zone.position);
        }
        // vertical stems never snap
        let vertical = hints
            .iter()
            .find(|h| h.orientation == Orientation::Vertical)
            .unwrap();
        assert_eq!(vertical.position, fixed(-10));
    }

    #[test]
    fn duplicates_merge_keeping_links() {
        let mut a = stem(Orientation::Horizontal, -5, 60, 1.0);
        let mut b = stem(Orientation::Horizontal, 200, 60, 1.0);
        let c = stem(Orientation::Horizontal, -8, 60, 5.0);
        a.counter = Some(HintIndex(1));
        b.counter = Some(HintIndex(0));
        let hints = run(vec![a, b, c]);
        assert_eq!(hints.len(), 2);
        assert_eq!(hints[0].position, fixed(0));
        assert_eq!(hints[0].score, 5.0);
        assert_eq!(hints[0].counter, Some(HintIndex(1)));
        assert!(counters_are_symmetric(&hints));
    }

    #[test]
    fn overlap_after_snap_resolved() {
        let hints = run(vec![
            stem(Orientation::Horizontal, -6, 60, 1.0),
            stem(Orientation::Horizontal, 40, 30, 2.0),
        ]);
        // snapping moves the first stem to 0..60 which now overlaps 40..70
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].position, fixed(40));
    }

    #[test]
    fn divergent_counter_links_dropped() {
        let mut a = stem(Orientation::Vertical, 0, 80, 1.0);
        let mut b = stem(Orientation::Vertical, 300, 90, 1.0);
        a.counter = Some(HintIndex(1));
        b.counter = Some(HintIndex(0));
        let hints = run(vec![a, b]);
        assert_eq!(hints.len(), 2);
        assert!(hints.iter().all(|h| h.counter.is_none()));
    }

    #[test]
    fn top_snap_keeps_its_zone() {
        // the bottom edge of the snapped stem lands in the baseline band
        let zones = ZoneSet::new(vec![
            Zone::new(ZoneKind::Baseline, fixed(0), fixed(-12)),
            Zone::new(ZoneKind::XHeight, fixed(62), fixed(10)),
        ]);
        let run = |hints| snap_and_dedupe("test", hints, &zones, fixed(2), 2.0);
        let once = run(vec![stem(Orientation::Horizontal, 5, 60, 1.0)]);
        assert_eq!(once[0].position, fixed(2));
        assert_eq!(once[0].zone, Some(ZoneId(1)));
        let twice = run(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn flex_and_stem_with_same_geometry_merge() {
        let pair = crate::hint::FlexPair {
            contour: 0,
            segment: 3,
        };
        let flex = Hint::flex(Orientation::Horizontal, fixed(200), fixed(60), pair);
        let hints = run(vec![flex, stem(Orientation::Horizontal, 200, 60, 1.0)]);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].flex, [pair]);
        assert!(hints[0].stem);
        assert!(!hints[0].is_flex());
        assert_eq!(run(hints.clone()), hints);
    }

    #[test]
    fn idempotent() {
        let mut a = stem(Orientation::Horizontal, -5, 60, 1.0);
        let mut b = stem(Orientation::Horizontal, 200, 61, 1.0);
        a.counter = Some(HintIndex(1));
        b.counter = Some(HintIndex(0));
        let flex = Hint::flex(
            Orientation::Horizontal,
            fixed(495),
            fixed(5),
            crate::hint::FlexPair {
                contour: 0,
                segment: 2,
            },
        );
        let hints = vec![
            a,
            b,
            flex,
            stem(Orientation::Horizontal, 445, 60, 2.0),
            stem(Orientation::Vertical, 10, 80, 1.0),
            stem(Orientation::Vertical, 50, 80, 3.0),
        ];
        let once = run(hints);
        let twice = run(once.clone());
        assert_eq!(once, twice);
        assert!(counters_are_symmetric(&once));
    }
}
