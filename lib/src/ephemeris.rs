//! Heliocentric ecliptic positions of the bodies.
//!
//! The layout engine only ever asks one question, "where along its orbit is
//! this body on this date", through [`EphemerisAdapter::longitude_for`].
//! The adapter picks the strategy recorded on the body, calls out to an
//! [`Ephemeris`] when asked to, and drops back to a constant angular rate
//! whenever the ephemeris cannot answer.

use std::{collections::HashMap, f64::consts, ops::RangeInclusive, sync::Arc};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    bodies::{Body, BodyKind, LongitudeModel},
    kepler,
    time::{SimDate, J2000_JD},
};

/// Days in a Julian century.
const DAYS_PER_CENTURY: f64 = 36_525.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EclipticCoordinates {
    /// Heliocentric ecliptic longitude (`rad`, `[0, 2π)`)
    pub longitude: f64,
    /// Heliocentric ecliptic latitude (`rad`)
    pub latitude: f64,
    /// Distance from the Sun (`AU`)
    pub distance: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Error)]
#[error("no ephemeris for {kind:?} at JD {jd}")]
pub struct EphemerisUnavailable {
    pub kind: BodyKind,
    pub jd: f64,
}

pub trait Ephemeris {
    /// Position of `kind` at Julian day `jd`. Must be deterministic and
    /// must not block.
    fn position(&self, kind: BodyKind, jd: f64) -> Result<EclipticCoordinates, EphemerisUnavailable>;
}

/// Mean-element ephemeris after JPL's "Approximate Positions of the
/// Planets". Good to well under a degree over its validity window.
#[derive(Clone, Debug, PartialEq)]
pub struct KeplerianEphemeris {
    valid: RangeInclusive<f64>,
}

impl KeplerianEphemeris {
    /// 1800-01-01 through 2050-12-31.
    pub const VALID_JD: RangeInclusive<f64> = 2_378_496.5..=2_470_171.5;

    pub fn with_validity(valid: RangeInclusive<f64>) -> Self {
        Self { valid }
    }
}

impl Default for KeplerianEphemeris {
    fn default() -> Self {
        Self::with_validity(Self::VALID_JD)
    }
}

impl Ephemeris for KeplerianEphemeris {
    fn position(&self, kind: BodyKind, jd: f64) -> Result<EclipticCoordinates, EphemerisUnavailable> {
        let unavailable = EphemerisUnavailable { kind, jd };
        if !self.valid.contains(&jd) {
            return Err(unavailable);
        }
        let centuries = (jd - J2000_JD) / DAYS_PER_CENTURY;
        let el = kepler::elements_at(kind, centuries).ok_or(unavailable)?;

        let ma = (el.l - el.lperi).to_radians();
        let ta = kepler::ma_to_ta(ma, el.e, 1e-12, 50).ok_or(unavailable)?;
        let r = el.a * (1.0 - el.e.powi(2)) / (1.0 + el.e * libm::cos(ta));

        // Argument of latitude
        let u = (el.lperi - el.lan).to_radians() + ta;
        let i = el.i.to_radians();
        let lan = el.lan.to_radians();
        let longitude = lan + libm::atan2(libm::cos(i) * libm::sin(u), libm::cos(u));
        let latitude = libm::asin(libm::sin(i) * libm::sin(u));

        Ok(EclipticCoordinates {
            longitude: kepler::wrap_tau(longitude),
            latitude,
            distance: r,
        })
    }
}

/// An ephemeris that never has an answer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoEphemeris;

impl Ephemeris for NoEphemeris {
    fn position(&self, kind: BodyKind, jd: f64) -> Result<EclipticCoordinates, EphemerisUnavailable> {
        Err(EphemerisUnavailable { kind, jd })
    }
}

/// One revolution per orbital period, zero at J2000.
pub fn constant_rate_longitude(body: &Body, date: SimDate) -> f64 {
    if body.orbital_period <= 0.0 || !body.orbital_period.is_finite() {
        return 0.0;
    }
    kepler::wrap_tau(2.0 * consts::PI * date.years_since_j2000() / body.orbital_period)
}

#[derive(Clone, Debug, Default)]
struct FrameMemo {
    jd: Option<OrderedFloat<f64>>,
    longitudes: HashMap<Arc<str>, f64>,
}

#[derive(Clone, Debug)]
pub struct EphemerisAdapter<E> {
    source: E,
    memo: FrameMemo,
}

impl<E: Ephemeris> EphemerisAdapter<E> {
    pub fn new(source: E) -> Self {
        Self {
            source,
            memo: FrameMemo::default(),
        }
    }

    pub fn source(&self) -> &E {
        &self.source
    }

    /// Ecliptic longitude of `body` on `date`, in `[0, 2π)`.
    ///
    /// `None` for stationary bodies (the Sun); callers treat that as no
    /// orbital rotation.
    pub fn longitude_for(&mut self, body: &Body, date: SimDate) -> Option<f64> {
        match body.longitude {
            LongitudeModel::Stationary => None,
            LongitudeModel::ConstantRate => Some(constant_rate_longitude(body, date)),
            LongitudeModel::Ephemeris => {
                let jd = OrderedFloat(date.julian_day());
                if self.memo.jd != Some(jd) {
                    self.memo.jd = Some(jd);
                    self.memo.longitudes.clear();
                }
                if let Some(&longitude) = self.memo.longitudes.get(&body.name) {
                    return Some(longitude);
                }
                let longitude = match self.source.position(body.kind, jd.0) {
                    Ok(coords) => kepler::wrap_tau(coords.longitude),
                    Err(err) => {
                        debug!(%err, body = %body.name, "falling back to constant-rate longitude");
                        constant_rate_longitude(body, date)
                    }
                };
                self.memo.longitudes.insert(body.name.clone(), longitude);
                Some(longitude)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, Month};

    use super::*;
    use crate::time::{DAYS_PER_YEAR, SECONDS_PER_DAY};

    fn body(kind: BodyKind, model: LongitudeModel) -> Body {
        Body::new(kind, model)
    }

    #[test]
    fn earth_at_j2000() {
        let coords = KeplerianEphemeris::default()
            .position(BodyKind::Earth, J2000_JD)
            .unwrap();
        // The Sun's apparent longitude at J2000 is about 280.4°
        assert!((coords.longitude.to_degrees() - 100.4).abs() < 1.0, "{coords:?}");
        assert!((coords.distance - 0.983).abs() < 0.01);
    }

    #[test]
    fn mars_at_j2000() {
        let coords = KeplerianEphemeris::default()
            .position(BodyKind::Mars, J2000_JD)
            .unwrap();
        let deg = coords.longitude.to_degrees();
        assert!((deg - 359.4).abs() < 1.0, "{deg}");
        assert!(coords.latitude.abs() <= 1.85_f64.to_radians() + 1e-9);
    }

    #[test]
    fn outside_validity_window() {
        let eph = KeplerianEphemeris::default();
        let late = SimDate::from_calendar_date(2100, Month::January, 1).unwrap();
        assert_eq!(
            eph.position(BodyKind::Venus, late.julian_day()),
            Err(EphemerisUnavailable {
                kind: BodyKind::Venus,
                jd: late.julian_day()
            })
        );
        assert!(eph.position(BodyKind::Sun, J2000_JD).is_err());
    }

    #[test]
    fn sun_has_no_longitude() {
        let mut adapter = EphemerisAdapter::new(KeplerianEphemeris::default());
        let sun = body(BodyKind::Sun, LongitudeModel::Stationary);
        assert_eq!(adapter.longitude_for(&sun, SimDate::J2000), None);
    }

    #[test]
    fn falls_back_when_ephemeris_is_missing() {
        let mut adapter = EphemerisAdapter::new(NoEphemeris);
        let mars = body(BodyKind::Mars, LongitudeModel::Ephemeris);
        let date = SimDate::J2000 + Duration::days(100);
        assert_eq!(
            adapter.longitude_for(&mars, date),
            Some(constant_rate_longitude(&mars, date))
        );
    }

    #[test]
    fn constant_rate_completes_one_revolution_per_period() {
        let mars = body(BodyKind::Mars, LongitudeModel::ConstantRate);
        let start = SimDate::from_calendar_date(2010, Month::June, 1).unwrap();
        let period =
            Duration::seconds_f64(mars.orbital_period * DAYS_PER_YEAR * SECONDS_PER_DAY);
        let a = constant_rate_longitude(&mars, start);
        let b = constant_rate_longitude(&mars, start + period);
        let diff = kepler::wrap_pi(a - b).abs();
        assert!(diff < 1e-6, "{a} vs {b}");
    }

    #[test]
    fn longitudes_are_normalised_and_repeatable() {
        let mut adapter = EphemerisAdapter::new(KeplerianEphemeris::default());
        let date = SimDate::from_calendar_date(1990, Month::February, 14).unwrap();
        for kind in BodyKind::ALL.into_iter().skip(1) {
            let b = body(kind, LongitudeModel::Ephemeris);
            let first = adapter.longitude_for(&b, date).unwrap();
            let again = adapter.longitude_for(&b, date).unwrap();
            let fresh = EphemerisAdapter::new(KeplerianEphemeris::default())
                .longitude_for(&b, date)
                .unwrap();
            assert!((0.0..2.0 * consts::PI).contains(&first));
            assert_eq!(first, again);
            assert_eq!(first, fresh);
        }
    }
}
