//! Keplerian mean elements and anomaly conversions.

use std::f64::consts;

use crate::bodies::BodyKind;

/// Classical elements referred to the mean ecliptic and equinox of J2000.
/// Angles in degrees, `a` in AU.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeanElements {
    /// Semi-major axis
    pub a: f64,
    /// Eccentricity
    pub e: f64,
    /// Inclination
    pub i: f64,
    /// Mean longitude
    pub l: f64,
    /// Longitude of perihelion
    pub lperi: f64,
    /// Longitude of ascending node
    pub lan: f64,
}

impl MeanElements {
    const fn new(a: f64, e: f64, i: f64, l: f64, lperi: f64, lan: f64) -> Self {
        Self {
            a,
            e,
            i,
            l,
            lperi,
            lan,
        }
    }

    /// `self + rate * centuries`, with `self` taken as the J2000 value.
    fn at(&self, rate: &MeanElements, centuries: f64) -> MeanElements {
        MeanElements {
            a: self.a + rate.a * centuries,
            e: self.e + rate.e * centuries,
            i: self.i + rate.i * centuries,
            l: self.l + rate.l * centuries,
            lperi: self.lperi + rate.lperi * centuries,
            lan: self.lan + rate.lan * centuries,
        }
    }
}

/// J2000 values and per-century rates from JPL's "Approximate Positions of
/// the Planets" (Standish), table 1. Earth is the Earth-Moon barycentre.
pub fn mean_elements(kind: BodyKind) -> Option<(MeanElements, MeanElements)> {
    let pair = match kind {
        BodyKind::Sun => return None,
        BodyKind::Mercury => (
            MeanElements::new(0.387_099_27, 0.205_635_93, 7.004_979_02, 252.250_323_50, 77.457_796_28, 48.330_765_93),
            MeanElements::new(0.000_000_37, 0.000_019_06, -0.005_947_49, 149_472.674_111_75, 0.160_476_89, -0.125_340_81),
        ),
        BodyKind::Venus => (
            MeanElements::new(0.723_335_66, 0.006_776_72, 3.394_676_05, 181.979_099_50, 131.602_467_18, 76.679_842_55),
            MeanElements::new(0.000_003_90, -0.000_041_07, -0.000_788_90, 58_517.815_387_29, 0.002_683_29, -0.277_694_18),
        ),
        BodyKind::Earth => (
            MeanElements::new(1.000_002_61, 0.016_711_23, -0.000_015_31, 100.464_571_66, 102.937_681_93, 0.0),
            MeanElements::new(0.000_005_62, -0.000_043_92, -0.012_946_68, 35_999.372_449_81, 0.323_273_64, 0.0),
        ),
        BodyKind::Mars => (
            MeanElements::new(1.523_710_34, 0.093_394_10, 1.849_691_42, -4.553_432_05, -23.943_629_59, 49.559_538_91),
            MeanElements::new(0.000_018_47, 0.000_078_82, -0.008_131_31, 19_140.302_684_99, 0.444_410_88, -0.292_573_43),
        ),
        BodyKind::Jupiter => (
            MeanElements::new(5.202_887_00, 0.048_386_24, 1.304_396_95, 34.396_440_51, 14.728_479_83, 100.473_909_09),
            MeanElements::new(-0.000_116_07, -0.000_132_53, -0.001_837_14, 3_034.746_127_75, 0.212_526_68, 0.204_691_06),
        ),
        BodyKind::Saturn => (
            MeanElements::new(9.536_675_94, 0.053_861_79, 2.485_991_87, 49.954_244_23, 92.598_878_31, 113.662_424_48),
            MeanElements::new(-0.001_250_60, -0.000_509_91, 0.001_936_09, 1_222.493_622_01, -0.418_972_16, -0.288_677_94),
        ),
        BodyKind::Uranus => (
            MeanElements::new(19.189_164_64, 0.047_257_44, 0.772_637_83, 313.238_104_51, 170.954_276_30, 74.016_925_03),
            MeanElements::new(-0.001_961_76, -0.000_043_97, -0.002_429_39, 428.482_027_85, 0.408_052_81, 0.042_405_89),
        ),
        BodyKind::Neptune => (
            MeanElements::new(30.069_922_76, 0.008_590_48, 1.770_043_47, -55.120_029_69, 44.964_762_27, 131.784_225_74),
            MeanElements::new(0.000_262_91, 0.000_051_05, 0.000_353_72, 218.459_453_25, -0.322_414_64, -0.005_086_64),
        ),
        BodyKind::Pluto => (
            MeanElements::new(39.482_116_75, 0.248_827_30, 17.140_012_06, 238.929_038_33, 224.068_916_29, 110.303_936_84),
            MeanElements::new(-0.000_315_96, 0.000_051_70, 0.000_048_18, 145.207_805_15, -0.040_629_42, -0.011_834_82),
        ),
    };
    Some(pair)
}

/// Elements of `kind` propagated to `centuries` Julian centuries past J2000.
pub fn elements_at(kind: BodyKind, centuries: f64) -> Option<MeanElements> {
    let (base, rate) = mean_elements(kind)?;
    Some(base.at(&rate, centuries))
}

/// Wrap an angle into `[-π, π)`.
pub fn wrap_pi(angle: f64) -> f64 {
    (angle + consts::PI).rem_euclid(2.0 * consts::PI) - consts::PI
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_tau(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * consts::PI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if wrapped >= 2.0 * consts::PI {
        0.0
    } else {
        wrapped
    }
}

pub fn ea_to_ta(ea: f64, e: f64) -> f64 {
    debug_assert!((0.0..1.0).contains(&e));
    let beta = e / (1.0 + libm::sqrt(1.0 - e.powi(2)));
    ea + 2.0 * libm::atan2(beta * libm::sin(ea), 1.0 - beta * libm::cos(ea))
}

/// Solve Kepler's equation `M = E - e sin E` by Newton iteration.
///
/// Returns `None` for non-elliptic eccentricities or if the iteration does
/// not settle within `maxiter` steps. Recommended: `tol = 1e-12`,
/// `maxiter = 50`.
pub fn ma_to_ea(ma: f64, e: f64, tol: f64, maxiter: u64) -> Option<f64> {
    if !(0.0..1.0).contains(&e) || !ma.is_finite() {
        return None;
    }
    let ma = wrap_pi(ma);

    let mut ea_new = if e > 0.8 { consts::PI.copysign(ma) } else { ma };

    let mut ea;
    let mut iter = 0;
    while iter < maxiter {
        ea = ea_new;
        ea_new = ea + (ma - ea + e * libm::sin(ea)) / (1.0 - e * libm::cos(ea));

        if (ea_new - ea).abs() < tol {
            return Some(ea_new);
        }

        iter += 1;
    }
    None
}

pub fn ma_to_ta(ma: f64, e: f64, tol: f64, maxiter: u64) -> Option<f64> {
    let ea = ma_to_ea(ma, e, tol, maxiter)?;
    Some(ea_to_ta(ea, e))
}
