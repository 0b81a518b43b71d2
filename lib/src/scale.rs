//! Mapping physical magnitudes to display units.
//!
//! Everything here is a pure function of its arguments. Display units are
//! whatever the renderer uses for the table (metres, in AR).

use serde::{Deserialize, Serialize};

use crate::{
    bodies::{Body, BodyId, Catalog},
    error::{LayoutError, Result},
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleMode {
    /// Squeezed to fit the table.
    #[default]
    Compressed,
    /// Proportional to the real values.
    TrueRelative,
}

impl ScaleMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ScaleMode::Compressed => ScaleMode::TrueRelative,
            ScaleMode::TrueRelative => ScaleMode::Compressed,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleModeState {
    pub size_mode: ScaleMode,
    pub orbit_mode: ScaleMode,
    /// Radius of the usable surface, in display units.
    pub table_radius: f64,
}

impl ScaleModeState {
    pub fn new(table_radius: f64) -> Result<Self> {
        Ok(Self {
            size_mode: ScaleMode::Compressed,
            orbit_mode: ScaleMode::Compressed,
            table_radius: validate_table_radius(table_radius)?,
        })
    }
}

pub fn validate_table_radius(table_radius: f64) -> Result<f64> {
    if table_radius.is_finite() && table_radius > 0.0 {
        Ok(table_radius)
    } else {
        Err(LayoutError::InvalidScaleInput(table_radius))
    }
}

/// The table is never cut into fewer bands than this, so small catalogs keep
/// the same body size as the full one.
pub const MIN_ORBIT_BANDS: usize = 8;

/// Width of one orbit band when `orbiting_count` bodies share the table.
pub fn orbital_delta(table_radius: f64, orbiting_count: usize) -> f64 {
    table_radius / orbiting_count.max(MIN_ORBIT_BANDS) as f64
}

/// The uniform body size used while sizes are compressed: a quarter band,
/// so neighbouring bodies never touch.
pub fn compressed_body_size(table_radius: f64, orbiting_count: usize) -> f64 {
    orbital_delta(table_radius, orbiting_count) / 4.0
}

/// Where the true-relative layout is pinned: a body's real distance and the
/// display radius it currently sits at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Anchor {
    pub orbital_radius: f64,
    pub display_radius: f64,
}

/// Display radius of the orbit of a body with 1-based distance `rank`
/// (0 for the Sun).
pub fn display_orbital_radius(
    body: &Body,
    rank: usize,
    mode: ScaleMode,
    table_radius: f64,
    orbiting_count: usize,
    anchor: Option<Anchor>,
) -> f64 {
    if body.is_star() || rank == 0 {
        return 0.0;
    }
    let compressed = orbital_delta(table_radius, orbiting_count) * rank as f64;
    match (mode, anchor) {
        (ScaleMode::TrueRelative, Some(anchor)) if anchor.orbital_radius > 0.0 => {
            anchor.display_radius * body.orbital_radius / anchor.orbital_radius
        }
        _ => compressed,
    }
}

/// Uniform display scale of a body. True-relative sizes hang off the Sun's
/// current scale so the Sun itself never changes size on a toggle.
pub fn display_body_scale(
    body: &Body,
    sun: &Body,
    mode: ScaleMode,
    sun_scale: f64,
    compressed_scale: f64,
) -> f64 {
    match mode {
        ScaleMode::TrueRelative if sun.radius > 0.0 => sun_scale * body.radius / sun.radius,
        _ => compressed_scale,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitEntry {
    pub id: BodyId,
    pub orbit_radius: f64,
    pub size: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitLayout {
    pub orbital_delta: f64,
    pub body_size: f64,
    /// One entry per catalog body, in catalog order.
    pub entries: Vec<FitEntry>,
}

/// Lay every body out in equal bands across `table_radius`, all at the same
/// size. Used when the system is first set down on a surface.
pub fn scale_all_to_fit(catalog: &Catalog, table_radius: f64) -> Result<FitLayout> {
    let table_radius = validate_table_radius(table_radius)?;
    let count = catalog.orbiting_count();
    let delta = orbital_delta(table_radius, count);
    let body_size = compressed_body_size(table_radius, count);
    let entries = catalog
        .ids()
        .map(|id| FitEntry {
            id,
            orbit_radius: delta * catalog.rank(id) as f64,
            size: body_size,
        })
        .collect();
    Ok(FitLayout {
        orbital_delta: delta,
        body_size,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::bodies::{BodyKind, CatalogOptions, LongitudeModel};

    fn catalog() -> Catalog {
        Catalog::new(CatalogOptions::default())
    }

    #[test]
    fn fit_to_eight_unit_table() {
        let catalog = catalog();
        let fit = scale_all_to_fit(&catalog, 8.0).unwrap();
        let orbits: Vec<_> = fit
            .entries
            .iter()
            .filter(|e| !catalog[e.id].is_star())
            .map(|e| e.orbit_radius)
            .collect();
        assert_eq!(orbits, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert!(fit.entries.iter().all(|e| e.size == 0.25));
        let (sun, _) = catalog.sun().unwrap();
        assert_eq!(fit.entries[0].id, sun);
        assert_eq!(fit.entries[0].orbit_radius, 0.0);
    }

    #[test]
    fn fit_stays_on_the_table() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let catalog = Catalog::new(CatalogOptions {
            include_pluto: true,
            ..Default::default()
        });
        for _ in 0..200 {
            let r: f64 = rng.gen_range(1e-3..50.0);
            let fit = scale_all_to_fit(&catalog, r).unwrap();
            for entry in &fit.entries {
                assert!(entry.orbit_radius <= r * (1.0 + 1e-12));
                assert!(entry.size <= r / 32.0);
            }
        }
    }

    #[test]
    fn rejects_unusable_tables() {
        let catalog = catalog();
        for r in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                scale_all_to_fit(&catalog, r),
                Err(LayoutError::InvalidScaleInput(_))
            ));
        }
    }

    #[test]
    fn sun_only_catalog_does_not_divide_by_zero() {
        let catalog = Catalog::from_bodies([Body::new(BodyKind::Sun, LongitudeModel::Stationary)]);
        let fit = scale_all_to_fit(&catalog, 2.0).unwrap();
        assert_eq!(fit.orbital_delta, 0.25);
        assert_eq!(fit.body_size, 0.0625);
        assert_eq!(fit.entries.len(), 1);
    }

    #[test]
    fn small_catalogs_stay_on_the_table() {
        let mut rng = StdRng::seed_from_u64(0xb0d1e5);
        for _ in 0..200 {
            let bodies = BodyKind::ALL
                .into_iter()
                .filter(|kind| *kind == BodyKind::Sun || rng.gen_bool(0.3))
                .map(|kind| {
                    let model = if kind == BodyKind::Sun {
                        LongitudeModel::Stationary
                    } else {
                        LongitudeModel::ConstantRate
                    };
                    Body::new(kind, model)
                });
            let catalog = Catalog::from_bodies(bodies);
            let r: f64 = rng.gen_range(1e-3..50.0);
            let fit = scale_all_to_fit(&catalog, r).unwrap();
            for entry in &fit.entries {
                assert!(entry.orbit_radius <= r * (1.0 + 1e-12));
                assert!(entry.size <= r / 32.0, "{} bodies", catalog.len());
            }
        }
    }

    #[test]
    fn compressed_orbits_strictly_increase() {
        let catalog = catalog();
        let count = catalog.orbiting_count();
        let radii: Vec<_> = catalog
            .orbiting()
            .map(|(id, body)| {
                display_orbital_radius(body, catalog.rank(id), ScaleMode::Compressed, 1.5, count, None)
            })
            .collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
        assert!((radii[radii.len() - 1] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn true_relative_keeps_anchor_in_place() {
        let catalog = catalog();
        let count = catalog.orbiting_count();
        let (anchor_id, anchor_body) = catalog.anchor().unwrap();
        let anchor = Anchor {
            orbital_radius: anchor_body.orbital_radius,
            display_radius: 0.125,
        };
        let at_anchor = display_orbital_radius(
            anchor_body,
            catalog.rank(anchor_id),
            ScaleMode::TrueRelative,
            1.0,
            count,
            Some(anchor),
        );
        assert_eq!(at_anchor, 0.125);

        let earth = catalog.find("Earth").unwrap();
        let earth_radius = display_orbital_radius(
            &catalog[earth],
            catalog.rank(earth),
            ScaleMode::TrueRelative,
            1.0,
            count,
            Some(anchor),
        );
        assert!((earth_radius - 0.125 * 149.6 / 57.9).abs() < 1e-12);
    }

    #[test]
    fn true_relative_sizes_follow_the_sun() {
        let catalog = catalog();
        let (_, sun) = catalog.sun().unwrap();
        let jupiter = &catalog[catalog.find("Jupiter").unwrap()];
        let scale = display_body_scale(jupiter, sun, ScaleMode::TrueRelative, 0.5, 0.01);
        assert!((scale - 0.5 * 69911.0 / 696_340.0).abs() < 1e-12);
        assert_eq!(display_body_scale(sun, sun, ScaleMode::TrueRelative, 0.5, 0.01), 0.5);
        assert_eq!(display_body_scale(jupiter, sun, ScaleMode::Compressed, 0.5, 0.01), 0.01);
    }

    #[test]
    fn toggling_twice_is_identity() {
        assert_eq!(ScaleMode::Compressed.toggled().toggled(), ScaleMode::Compressed);
        assert_eq!(ScaleMode::Compressed.toggled(), ScaleMode::TrueRelative);
    }
}
