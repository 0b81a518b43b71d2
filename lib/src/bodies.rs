//! Definitions of celestial bodies.

use std::sync::Arc;

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    arena::{Arena, IdLike},
    error::{LayoutError, Result},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl BodyKind {
    pub const ALL: [BodyKind; 10] = [
        BodyKind::Sun,
        BodyKind::Mercury,
        BodyKind::Venus,
        BodyKind::Earth,
        BodyKind::Mars,
        BodyKind::Jupiter,
        BodyKind::Saturn,
        BodyKind::Uranus,
        BodyKind::Neptune,
        BodyKind::Pluto,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BodyKind::Sun => "Sun",
            BodyKind::Mercury => "Mercury",
            BodyKind::Venus => "Venus",
            BodyKind::Earth => "Earth",
            BodyKind::Mars => "Mars",
            BodyKind::Jupiter => "Jupiter",
            BodyKind::Saturn => "Saturn",
            BodyKind::Uranus => "Uranus",
            BodyKind::Neptune => "Neptune",
            BodyKind::Pluto => "Pluto",
        }
    }

    /// Mean distance from the Sun (`10^6 km`).
    pub fn orbital_radius(self) -> f64 {
        match self {
            BodyKind::Sun => 0.0,
            BodyKind::Mercury => 57.9,
            BodyKind::Venus => 108.2,
            BodyKind::Earth => 149.6,
            BodyKind::Mars => 227.9,
            BodyKind::Jupiter => 778.3,
            BodyKind::Saturn => 1427.0,
            BodyKind::Uranus => 2871.0,
            BodyKind::Neptune => 4497.0,
            BodyKind::Pluto => 5913.0,
        }
    }

    /// Mean radius (`km`).
    pub fn radius(self) -> f64 {
        match self {
            BodyKind::Sun => 696_340.0,
            BodyKind::Mercury => 2439.7,
            BodyKind::Venus => 6051.8,
            BodyKind::Earth => 6371.0,
            BodyKind::Mars => 3389.5,
            BodyKind::Jupiter => 69911.0,
            BodyKind::Saturn => 58232.0,
            BodyKind::Uranus => 25362.0,
            BodyKind::Neptune => 24622.0,
            BodyKind::Pluto => 1188.3,
        }
    }

    /// Sidereal rotation period (`h`). Negative for retrograde rotation.
    pub fn rotation_period(self) -> f64 {
        match self {
            BodyKind::Sun => 609.12,
            BodyKind::Mercury => 1407.6,
            BodyKind::Venus => -5832.6,
            BodyKind::Earth => 23.93,
            BodyKind::Mars => 24.62,
            BodyKind::Jupiter => 9.93,
            BodyKind::Saturn => 10.66,
            BodyKind::Uranus => -17.24,
            BodyKind::Neptune => 16.11,
            BodyKind::Pluto => -153.29,
        }
    }

    /// Obliquity to orbit (`deg`).
    pub fn axial_tilt(self) -> f64 {
        match self {
            BodyKind::Sun => 7.25,
            BodyKind::Mercury => 0.03,
            BodyKind::Venus => 2.64,
            BodyKind::Earth => 23.44,
            BodyKind::Mars => 25.19,
            BodyKind::Jupiter => 3.13,
            BodyKind::Saturn => 26.73,
            BodyKind::Uranus => 82.23,
            BodyKind::Neptune => 28.32,
            BodyKind::Pluto => 57.47,
        }
    }

    /// Sidereal orbital period (`yr`). Zero for the Sun.
    pub fn orbital_period(self) -> f64 {
        match self {
            BodyKind::Sun => 0.0,
            BodyKind::Mercury => 0.240846,
            BodyKind::Venus => 0.615,
            BodyKind::Earth => 1.0,
            BodyKind::Mars => 1.881,
            BodyKind::Jupiter => 11.86,
            BodyKind::Saturn => 29.46,
            BodyKind::Uranus => 84.01,
            BodyKind::Neptune => 164.8,
            BodyKind::Pluto => 248.1,
        }
    }

    /// Moons and rings drawn with this body.
    pub fn satellites(self) -> &'static [Satellite] {
        match self {
            BodyKind::Earth => &[Satellite::Moon {
                orbit_radius: 2.0,
                radius: 0.09,
                period_days: 27.32,
            }],
            BodyKind::Jupiter => &[Satellite::Moon {
                orbit_radius: 3.0,
                radius: 0.2,
                period_days: 7.15,
            }],
            BodyKind::Saturn => &[Satellite::Rings {
                inner_radius: 1.7,
                outer_radius: 2.3,
            }],
            _ => &[],
        }
    }
}

/// Decoration that travels with a body. Lengths are in multiples of the
/// body's own rendered radius, so they follow every scale change.
///
/// These are for looks only; the distances are not to scale.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Satellite {
    /// A moon on a circular orbit in the ecliptic plane around its parent.
    Moon {
        orbit_radius: f64,
        radius: f64,
        /// One revolution every this many simulated days
        period_days: f64,
    },
    /// A flat ring in the body's equatorial plane.
    Rings { inner_radius: f64, outer_radius: f64 },
}

/// How a body's ecliptic longitude is obtained. Picked once when the
/// catalog is built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LongitudeModel {
    /// Does not orbit anything; its orbital rotation is always zero.
    Stationary,
    /// Ask the ephemeris, falling back to [`LongitudeModel::ConstantRate`]
    /// if it has no answer.
    Ephemeris,
    /// Uniform angular rate of one revolution per orbital period, measured
    /// from J2000.
    ConstantRate,
}

/// A celestial body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub name: Arc<str>,
    pub kind: BodyKind,
    /// Mean distance from the Sun (`10^6 km`)
    pub orbital_radius: f64,
    /// Mean radius of the body's sphere (`km`)
    pub radius: f64,
    /// Rotational period, length of sidereal day (`h`), negative when
    /// retrograde
    pub rotation_period: f64,
    /// Axial tilt (`deg`)
    pub axial_tilt: f64,
    /// Time to circle the Sun (`yr`)
    pub orbital_period: f64,
    pub longitude: LongitudeModel,
    #[serde(default)]
    pub satellites: Vec<Satellite>,
}

impl Body {
    pub fn new(kind: BodyKind, longitude: LongitudeModel) -> Self {
        Self {
            name: kind.label().into(),
            kind,
            orbital_radius: kind.orbital_radius(),
            radius: kind.radius(),
            rotation_period: kind.rotation_period(),
            axial_tilt: kind.axial_tilt(),
            orbital_period: kind.orbital_period(),
            longitude,
            satellites: kind.satellites().to_vec(),
        }
    }

    pub fn is_star(&self) -> bool {
        self.kind == BodyKind::Sun
    }

    pub fn is_retrograde(&self) -> bool {
        self.rotation_period < 0.0
    }
}

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct BodyId(u16);

impl IdLike for BodyId {
    fn from_raw(index: usize) -> Self {
        Self(index as u16)
    }

    fn into_raw(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    pub include_pluto: bool,
    /// When false every planet uses the constant-rate model.
    pub use_ephemeris: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            include_pluto: false,
            use_ephemeris: true,
        }
    }
}

/// The bodies of the modelled solar system, innermost first.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    bodies: Arena<BodyId, Body>,
}

impl Catalog {
    pub fn new(options: CatalogOptions) -> Self {
        let planet_model = if options.use_ephemeris {
            LongitudeModel::Ephemeris
        } else {
            LongitudeModel::ConstantRate
        };
        Self::from_bodies(
            BodyKind::ALL
                .into_iter()
                .filter(|kind| options.include_pluto || *kind != BodyKind::Pluto)
                .map(|kind| {
                    let model = if kind == BodyKind::Sun {
                        LongitudeModel::Stationary
                    } else {
                        planet_model
                    };
                    Body::new(kind, model)
                }),
        )
    }

    /// Build a catalog from arbitrary bodies. They are sorted by
    /// `orbital_radius`; later duplicates of a name are dropped.
    pub fn from_bodies(bodies: impl IntoIterator<Item = Body>) -> Self {
        let bodies = bodies
            .into_iter()
            .unique_by(|body| body.name.clone())
            .sorted_by_key(|body| OrderedFloat(body.orbital_radius))
            .collect();
        Self { bodies }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.ids()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn find(&self, name: &str) -> Result<BodyId> {
        self.bodies
            .iter()
            .find(|(_, body)| &*body.name == name)
            .map(|(id, _)| id)
            .ok_or_else(|| LayoutError::UnknownBody(name.to_owned()))
    }

    pub fn sun(&self) -> Option<(BodyId, &Body)> {
        self.bodies.iter().find(|(_, body)| body.is_star())
    }

    /// Every body except the Sun, in order of increasing distance.
    pub fn orbiting(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter().filter(|(_, body)| !body.is_star())
    }

    pub fn orbiting_count(&self) -> usize {
        self.orbiting().count()
    }

    /// 1-based distance rank among orbiting bodies; 0 for the Sun.
    pub fn rank(&self, id: BodyId) -> usize {
        self.orbiting()
            .position(|(other, _)| other == id)
            .map_or(0, |i| i + 1)
    }

    /// The innermost orbiting body, used to anchor true-relative spacing.
    pub fn anchor(&self) -> Option<(BodyId, &Body)> {
        self.orbiting().find(|(_, body)| body.orbital_radius > 0.0)
    }
}

impl std::ops::Index<BodyId> for Catalog {
    type Output = Body;

    fn index(&self, index: BodyId) -> &Self::Output {
        &self.bodies[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_nine_bodies_sun_first() {
        let catalog = Catalog::new(CatalogOptions::default());
        assert_eq!(catalog.len(), 9);
        let names: Vec<_> = catalog.iter().map(|(_, b)| b.name.to_string()).collect();
        assert_eq!(
            names,
            [
                "Sun", "Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus",
                "Neptune"
            ]
        );
        let (_, sun) = catalog.sun().unwrap();
        assert_eq!(sun.orbital_radius, 0.0);
        assert_eq!(sun.longitude, LongitudeModel::Stationary);
    }

    #[test]
    fn pluto_is_opt_in() {
        let without = Catalog::new(CatalogOptions::default());
        assert!(matches!(
            without.find("Pluto"),
            Err(LayoutError::UnknownBody(name)) if name == "Pluto"
        ));
        let with = Catalog::new(CatalogOptions {
            include_pluto: true,
            ..Default::default()
        });
        assert_eq!(with.len(), 10);
        let pluto = with.find("Pluto").unwrap();
        assert_eq!(with.rank(pluto), 9);
    }

    #[test]
    fn catalog_is_sorted_by_distance() {
        let catalog = Catalog::new(CatalogOptions {
            include_pluto: true,
            ..Default::default()
        });
        let radii: Vec<_> = catalog.iter().map(|(_, b)| b.orbital_radius).collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn from_bodies_sorts_and_deduplicates() {
        let catalog = Catalog::from_bodies([
            Body::new(BodyKind::Mars, LongitudeModel::ConstantRate),
            Body::new(BodyKind::Sun, LongitudeModel::Stationary),
            Body::new(BodyKind::Mars, LongitudeModel::Ephemeris),
            Body::new(BodyKind::Earth, LongitudeModel::ConstantRate),
        ]);
        assert_eq!(catalog.len(), 3);
        let mars = catalog.find("Mars").unwrap();
        assert_eq!(catalog[mars].longitude, LongitudeModel::ConstantRate);
        assert_eq!(catalog.rank(mars), 2);
        assert_eq!(catalog.anchor().unwrap().1.kind, BodyKind::Earth);
    }

    #[test]
    fn constant_rate_selected_without_ephemeris() {
        let catalog = Catalog::new(CatalogOptions {
            use_ephemeris: false,
            ..Default::default()
        });
        assert!(catalog
            .orbiting()
            .all(|(_, b)| b.longitude == LongitudeModel::ConstantRate));
    }

    #[test]
    fn retrograde_rotators() {
        let venus = Body::new(BodyKind::Venus, LongitudeModel::Ephemeris);
        let earth = Body::new(BodyKind::Earth, LongitudeModel::Ephemeris);
        assert!(venus.is_retrograde());
        assert!(!earth.is_retrograde());
    }

    #[test]
    fn only_earth_jupiter_and_saturn_carry_satellites() {
        let adorned: Vec<_> = BodyKind::ALL
            .into_iter()
            .filter(|kind| !kind.satellites().is_empty())
            .collect();
        assert_eq!(adorned, [BodyKind::Earth, BodyKind::Jupiter, BodyKind::Saturn]);
        assert!(matches!(
            BodyKind::Saturn.satellites(),
            [Satellite::Rings {
                inner_radius,
                outer_radius
            }] if *inner_radius > 1.0 && outer_radius > inner_radius
        ));
        let earth = Body::new(BodyKind::Earth, LongitudeModel::Ephemeris);
        assert_eq!(earth.satellites, BodyKind::Earth.satellites());
    }
}
