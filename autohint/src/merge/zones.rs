//! Alignment zone collection.

use font_types::Fixed;

use crate::{
    config::HintConfig,
    fontinfo::{FontMetrics, ZoneSpec},
    synth::ZoneAnchor,
    zone::{Zone, ZoneKind, ZoneSet},
};

/// Maximum number of zones in the `BlueValues` array, baseline included.
pub const MAX_TOP_ZONES: usize = 7;

/// Maximum number of zones in the `OtherBlues` array.
pub const MAX_BOTTOM_ZONES: usize = 5;

/// A zone anchor tagged with the glyph that produced it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SourcedAnchor {
    pub glyph: usize,
    pub anchor: ZoneAnchor,
}

#[derive(Clone, Debug)]
struct Cluster {
    top: bool,
    position: f64,
    overshoot: f64,
    glyphs: Vec<usize>,
    kind: Option<ZoneKind>,
}

impl Cluster {
    fn support(&self) -> usize {
        self.glyphs.len()
    }

    fn zone(&self) -> Zone {
        let kind = self.kind.unwrap_or(if self.top {
            ZoneKind::OtherTop
        } else {
            ZoneKind::OtherBottom
        });
        Zone::new(
            kind,
            Fixed::from_f64(self.position),
            Fixed::from_f64(self.overshoot),
        )
    }

    fn is_blue_value(&self) -> bool {
        self.top || self.kind == Some(ZoneKind::Baseline)
    }
}

/// Builds the zone set of a font from the anchors of every glyph.
pub(crate) fn collect(
    anchors: &[SourcedAnchor],
    config: &HintConfig,
    metrics: &FontMetrics,
) -> ZoneSet {
    let mut clusters = Vec::new();
    for top in [true, false] {
        let mut side = cluster_flat(anchors, top, config.zone_tolerance);
        extend_overshoots(&mut side, anchors, top, config);
        clusters.extend(side);
    }
    let declared = declared_zones(metrics);
    let matched = classify(&mut clusters, &declared, config.zone_tolerance);
    clusters.retain(|cluster| {
        cluster.kind.is_some() || cluster.support() >= config.min_zone_support
    });
    // declared zones without glyph support
    for ((kind, spec), _) in declared.iter().zip(matched).filter(|(_, matched)| !matched) {
        clusters.push(Cluster {
            top: kind.is_top(),
            position: spec.position.to_f64(),
            overshoot: spec.overshoot.to_f64().abs(),
            glyphs: Vec::new(),
            kind: Some(*kind),
        });
    }
    // strongest first: metric zones, then by support
    clusters.sort_by(|a, b| {
        b.kind
            .is_some()
            .cmp(&a.kind.is_some())
            .then(b.support().cmp(&a.support()))
            .then(a.position.total_cmp(&b.position))
    });
    let mut zones: Vec<Zone> = Vec::new();
    let (mut blue_count, mut other_count) = (0, 0);
    for cluster in clusters {
        let zone = cluster.zone();
        let (min, max) = zone.bounds();
        if zones.iter().any(|other| {
            let (other_min, other_max) = other.bounds();
            min <= other_max && other_min <= max
        }) {
            log::debug!("dropping zone at {} that overlaps a stronger zone", zone.position);
            continue;
        }
        let (count, limit) = if cluster.is_blue_value() {
            (&mut blue_count, MAX_TOP_ZONES)
        } else {
            (&mut other_count, MAX_BOTTOM_ZONES)
        };
        if *count == limit {
            log::debug!("dropping zone at {}: limit of {limit} reached", zone.position);
            continue;
        }
        *count += 1;
        zones.push(zone);
    }
    ZoneSet::new(zones)
}

fn cluster_flat(anchors: &[SourcedAnchor], top: bool, tolerance: f64) -> Vec<Cluster> {
    let mut flat: Vec<_> = anchors
        .iter()
        .filter(|a| a.anchor.top == top && !a.anchor.round)
        .map(|a| (a.anchor.position.to_f64(), a.glyph))
        .collect();
    flat.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let mut clusters = Vec::new();
    let mut ix = 0;
    while ix < flat.len() {
        let first = flat[ix].0;
        let mut end = ix;
        while end < flat.len() && flat[end].0 - first <= tolerance {
            end += 1;
        }
        let members = &flat[ix..end];
        let mean = members.iter().map(|m| m.0).sum::<f64>() / members.len() as f64;
        let mut glyphs: Vec<_> = members.iter().map(|m| m.1).collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        clusters.push(Cluster {
            top,
            position: mean.round(),
            overshoot: 0.0,
            glyphs,
            kind: None,
        });
        ix = end;
    }
    clusters
}

/// Lets round anchors beyond a cluster widen its overshoot.
fn extend_overshoots(
    clusters: &mut [Cluster],
    anchors: &[SourcedAnchor],
    top: bool,
    config: &HintConfig,
) {
    for anchor in anchors
        .iter()
        .filter(|a| a.anchor.top == top && a.anchor.round)
    {
        let position = anchor.anchor.position.to_f64();
        let best = clusters
            .iter_mut()
            .map(|cluster| {
                // distance in the overshoot direction
                let distance = if top {
                    position - cluster.position
                } else {
                    cluster.position - position
                };
                (distance, cluster)
            })
            .filter(|(distance, _)| *distance >= 0.0 && *distance <= config.max_overshoot)
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((distance, cluster)) = best {
            cluster.overshoot = cluster.overshoot.max(distance);
        }
    }
}

fn declared_zones(metrics: &FontMetrics) -> Vec<(ZoneKind, ZoneSpec)> {
    let mut declared = Vec::new();
    let singles = [
        (ZoneKind::Baseline, metrics.baseline),
        (ZoneKind::XHeight, metrics.x_height),
        (ZoneKind::CapHeight, metrics.cap_height),
        (ZoneKind::Ascender, metrics.ascender),
        (ZoneKind::Descender, metrics.descender),
        (ZoneKind::FigureHeight, metrics.figure_height),
    ];
    for (kind, spec) in singles {
        if let Some(spec) = spec {
            declared.push((kind, spec));
        }
    }
    declared.extend(metrics.other_top.iter().map(|spec| (ZoneKind::OtherTop, *spec)));
    declared.extend(
        metrics
            .other_bottom
            .iter()
            .map(|spec| (ZoneKind::OtherBottom, *spec)),
    );
    declared
}

/// Assigns each declared zone to the nearest cluster on the same side and
/// returns which declared zones found a cluster.
///
/// Glyphs always sit on the baseline at zero when the font declares no
/// baseline of its own.
fn classify(
    clusters: &mut [Cluster],
    declared: &[(ZoneKind, ZoneSpec)],
    tolerance: f64,
) -> Vec<bool> {
    let implicit_baseline = (ZoneKind::Baseline, ZoneSpec::default());
    let has_baseline = declared.iter().any(|(kind, _)| *kind == ZoneKind::Baseline);
    let targets = declared
        .iter()
        .copied()
        .chain((!has_baseline).then_some(implicit_baseline));
    let mut matched = vec![false; declared.len()];
    for (ix, (kind, spec)) in targets.enumerate() {
        let target = spec.position.to_f64();
        let nearest = clusters
            .iter_mut()
            .filter(|cluster| cluster.kind.is_none() && cluster.top == kind.is_top())
            .map(|cluster| ((cluster.position - target).abs(), cluster))
            .filter(|(distance, _)| *distance <= tolerance)
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, cluster)) = nearest {
            cluster.kind = Some(kind);
            cluster.position = target;
            cluster.overshoot = cluster.overshoot.max(spec.overshoot.to_f64().abs());
            if let Some(flag) = matched.get_mut(ix) {
                *flag = true;
            }
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(glyph: usize, position: f64, top: bool, round: bool) -> SourcedAnchor {
        SourcedAnchor {
            glyph,
            anchor: ZoneAnchor {
                position: Fixed::from_f64(position),
                top,
                round,
            },
        }
    }

    fn fixed(value: i32) -> Fixed {
        Fixed::from_i32(value)
    }

    #[test]
    fn near_zero_anchors_make_one_baseline() {
        let anchors = [anchor(0, 0.2, false, false), anchor(1, -0.3, false, false)];
        let config = HintConfig {
            zone_tolerance: 1.0,
            ..Default::default()
        };
        let zones = collect(&anchors, &config, &FontMetrics::default());
        assert_eq!(zones.len(), 1);
        let (_, zone) = zones.iter().next().unwrap();
        assert_eq!(zone.kind, ZoneKind::Baseline);
        assert_eq!(zone.position, Fixed::ZERO);
    }

    #[test]
    fn round_anchors_extend_overshoot() {
        let anchors = [
            anchor(0, 0.0, false, false),
            anchor(1, -12.0, false, true),
            anchor(2, -40.0, false, true),
            anchor(0, 500.0, true, false),
            anchor(1, 500.0, true, false),
            anchor(2, 510.0, true, true),
        ];
        let zones = collect(&anchors, &HintConfig::default(), &FontMetrics::default());
        let zones: Vec<_> = zones.iter().map(|(_, zone)| *zone).collect();
        assert_eq!(
            zones,
            [
                Zone::new(ZoneKind::Baseline, fixed(0), fixed(-12)),
                Zone::new(ZoneKind::OtherTop, fixed(500), fixed(10)),
            ]
        );
    }

    #[test]
    fn unsupported_clusters_dropped() {
        let anchors = [anchor(0, 640.0, true, false), anchor(0, 641.0, true, false)];
        let zones = collect(&anchors, &HintConfig::default(), &FontMetrics::default());
        // two anchors but a single glyph
        assert!(zones.is_empty());
    }

    #[test]
    fn declared_metrics_classify_and_fill() {
        let metrics = FontMetrics {
            x_height: Some(ZoneSpec::new(fixed(500), fixed(12))),
            cap_height: Some(ZoneSpec::new(fixed(700), fixed(10))),
            descender: Some(ZoneSpec::new(fixed(-200), fixed(-10))),
            ..Default::default()
        };
        let anchors = [anchor(0, 501.0, true, false), anchor(0, 0.0, false, false)];
        let zones = collect(&anchors, &HintConfig::default(), &metrics);
        let kinds: Vec<_> = zones
            .iter()
            .map(|(_, zone)| (zone.kind, zone.position, zone.overshoot))
            .collect();
        assert_eq!(
            kinds,
            [
                (ZoneKind::Descender, fixed(-200), fixed(-10)),
                (ZoneKind::Baseline, fixed(0), Fixed::ZERO),
                (ZoneKind::XHeight, fixed(500), fixed(12)),
                (ZoneKind::CapHeight, fixed(700), fixed(10)),
            ]
        );
    }

    #[test]
    fn zone_limits() {
        // ten supported top clusters, far apart
        let anchors: Vec<_> = (0..10)
            .flat_map(|ix| {
                let y = 100.0 * (ix + 1) as f64;
                [anchor(0, y, true, false), anchor(1, y, true, false)]
            })
            .chain((0..8).flat_map(|ix| {
                let y = -100.0 * (ix + 1) as f64;
                [anchor(0, y, false, false), anchor(1, y, false, false)]
            }))
            .collect();
        let zones = collect(&anchors, &HintConfig::default(), &FontMetrics::default());
        let blue = zones.iter().filter(|(_, z)| z.kind.is_blue_value()).count();
        let other = zones.iter().filter(|(_, z)| !z.kind.is_blue_value()).count();
        assert_eq!(blue, MAX_TOP_ZONES);
        assert_eq!(other, MAX_BOTTOM_ZONES);
    }
}
