//! Font wide alignment zones.

use font_types::Fixed;

use crate::geometry;

/// Role of an alignment zone.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneKind {
    Baseline,
    XHeight,
    CapHeight,
    Ascender,
    Descender,
    FigureHeight,
    OtherTop,
    OtherBottom,
}

impl ZoneKind {
    /// Returns true if glyphs align to this zone with their top edge.
    pub fn is_top(self) -> bool {
        matches!(
            self,
            Self::XHeight | Self::CapHeight | Self::Ascender | Self::FigureHeight | Self::OtherTop
        )
    }

    /// Returns true if the zone is stored in the `BlueValues` array of the
    /// private dict. All other zones go to `OtherBlues`.
    pub fn is_blue_value(self) -> bool {
        self.is_top() || self == Self::Baseline
    }
}

/// An alignment zone.
///
/// The overshoot is signed: it is non-negative for top zones and
/// non-positive for bottom zones, so the band always spans from
/// `position` to `position + overshoot`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    pub kind: ZoneKind,
    pub position: Fixed,
    pub overshoot: Fixed,
}

impl Zone {
    pub fn new(kind: ZoneKind, position: Fixed, overshoot: Fixed) -> Self {
        // keep the overshoot on the correct side of the zone
        let overshoot = if kind.is_top() {
            overshoot.abs()
        } else {
            -overshoot.abs()
        };
        Self {
            kind,
            position,
            overshoot,
        }
    }

    /// Returns the lower and upper bounds of the zone band.
    pub fn bounds(&self) -> (Fixed, Fixed) {
        let other = self.position + self.overshoot;
        if other < self.position {
            (other, self.position)
        } else {
            (self.position, other)
        }
    }

    /// Returns true if the value lies within the band, extended by `fuzz`
    /// on both sides.
    pub fn contains(&self, value: Fixed, fuzz: Fixed) -> bool {
        let (min, max) = self.bounds();
        geometry::in_zone(value, min, max, fuzz)
    }
}

/// Identifier of a zone within a [`ZoneSet`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneId(pub usize);

/// Ordered collection of zones for a font.
///
/// Zones are sorted by position and immutable after construction.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    pub fn new(mut zones: Vec<Zone>) -> Self {
        zones.sort_by_key(|zone| (zone.position, zone.kind));
        Self { zones }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &Zone)> + Clone + '_ {
        self.zones
            .iter()
            .enumerate()
            .map(|(ix, zone)| (ZoneId(ix), zone))
    }

    /// Returns the first zone of the given kind.
    pub fn find_kind(&self, kind: ZoneKind) -> Option<(ZoneId, &Zone)> {
        self.iter().find(|(_, zone)| zone.kind == kind)
    }

    /// Returns the top zone whose band contains the value.
    pub fn top_zone_at(&self, value: Fixed, fuzz: Fixed) -> Option<(ZoneId, &Zone)> {
        self.iter()
            .find(|(_, zone)| zone.kind.is_top() && zone.contains(value, fuzz))
    }

    /// Returns the bottom zone whose band contains the value.
    pub fn bottom_zone_at(&self, value: Fixed, fuzz: Fixed) -> Option<(ZoneId, &Zone)> {
        self.iter()
            .find(|(_, zone)| !zone.kind.is_top() && zone.contains(value, fuzz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(value: i32) -> Fixed {
        Fixed::from_i32(value)
    }

    #[test]
    fn overshoot_sign_follows_kind() {
        let top = Zone::new(ZoneKind::XHeight, fixed(500), fixed(-12));
        assert_eq!(top.overshoot, fixed(12));
        assert_eq!(top.bounds(), (fixed(500), fixed(512)));
        let bottom = Zone::new(ZoneKind::Baseline, fixed(0), fixed(12));
        assert_eq!(bottom.overshoot, fixed(-12));
        assert_eq!(bottom.bounds(), (fixed(-12), fixed(0)));
    }

    #[test]
    fn lookup_by_side() {
        let zones = ZoneSet::new(vec![
            Zone::new(ZoneKind::CapHeight, fixed(700), fixed(10)),
            Zone::new(ZoneKind::Baseline, fixed(0), fixed(-10)),
            Zone::new(ZoneKind::Descender, fixed(-200), fixed(-10)),
        ]);
        // sorted by position
        let kinds: Vec<_> = zones.iter().map(|(_, zone)| zone.kind).collect();
        assert_eq!(
            kinds,
            [ZoneKind::Descender, ZoneKind::Baseline, ZoneKind::CapHeight]
        );
        let (id, _) = zones.top_zone_at(fixed(705), Fixed::ZERO).unwrap();
        assert_eq!(id, ZoneId(2));
        assert!(zones.top_zone_at(fixed(-5), Fixed::ZERO).is_none());
        let (id, _) = zones.bottom_zone_at(fixed(-5), Fixed::ZERO).unwrap();
        assert_eq!(id, ZoneId(1));
        assert!(zones.bottom_zone_at(fixed(2), Fixed::ZERO).is_none());
        assert!(zones.bottom_zone_at(fixed(2), fixed(2)).is_some());
    }
}
