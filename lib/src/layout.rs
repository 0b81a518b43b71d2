//! The layout engine: turns a date and a table size into a transform for
//! every body.
//!
//! The engine is either unplaced or placed on a surface. Nothing is laid out
//! until [`LayoutEngine::place_on_surface`] succeeds; after that every
//! operation that moves time or changes a scale recomputes all bodies in one
//! pass and the result is read back through [`LayoutEngine::frame`].

use std::{f64::consts, sync::Arc};

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::{debug, info, trace};

use crate::{
    arena::Arena,
    bodies::{Body, BodyId, Catalog, Satellite},
    config::LayoutConfig,
    ephemeris::{Ephemeris, EphemerisAdapter, KeplerianEphemeris},
    error::{LayoutError, Result},
    kepler,
    scale::{self, Anchor, ScaleMode, ScaleModeState},
    time::{SimDate, SimulationClock},
};

/// Radius of the mesh every body is rendered with before scaling.
pub const UNIT_MESH_RADIUS: f64 = 1.0;

/// Where a body sits right now. Index-aligned with the catalog.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitalState {
    /// Ecliptic longitude (`rad`), zero for the Sun
    pub longitude: f64,
    pub position: Vector3<f64>,
    pub scale: f64,
    pub orbit_radius: f64,
}

impl OrbitalState {
    fn at_origin() -> Self {
        Self {
            longitude: 0.0,
            position: Vector3::zeros(),
            scale: 0.0,
            orbit_radius: 0.0,
        }
    }
}

/// Everything a renderer needs to draw one body.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyTransform {
    pub position: Vector3<f64>,
    pub scale: f64,
    /// Rotation of the body's orbital frame about the up axis (`rad`)
    pub orbital_plane_rotation: f64,
    pub orbit_path_radius: f64,
    pub orbit_path_visible: bool,
    /// (`rad`)
    pub axial_tilt: f64,
    /// Rotation about the body's own axis (`rad`, `[0, 2π)`)
    pub spin: f64,
}

impl BodyTransform {
    /// Interpolate towards `to`. Angles take the short way round; path
    /// visibility switches at the end.
    #[must_use]
    pub fn lerp(&self, to: &BodyTransform, t: f64) -> BodyTransform {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        let lerp_angle = |a: f64, b: f64| kepler::wrap_tau(a + kepler::wrap_pi(b - a) * t);
        BodyTransform {
            position: self.position.lerp(&to.position, t),
            scale: lerp(self.scale, to.scale),
            orbital_plane_rotation: lerp_angle(self.orbital_plane_rotation, to.orbital_plane_rotation),
            orbit_path_radius: lerp(self.orbit_path_radius, to.orbit_path_radius),
            orbit_path_visible: if t < 1.0 {
                self.orbit_path_visible
            } else {
                to.orbit_path_visible
            },
            axial_tilt: lerp(self.axial_tilt, to.axial_tilt),
            spin: lerp_angle(self.spin, to.spin),
        }
    }

    fn scaled(mut self, factor: f64) -> BodyTransform {
        self.position *= factor;
        self.scale *= factor;
        self.orbit_path_radius *= factor;
        self
    }
}

/// A moon or ring set placed in display space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SatelliteTransform {
    Moon { position: Vector3<f64>, scale: f64 },
    /// Centred on the parent and tilted with its axis.
    Rings { inner_radius: f64, outer_radius: f64 },
}

impl SatelliteTransform {
    fn place(satellite: &Satellite, parent: &BodyTransform, date: SimDate) -> Self {
        let radius = parent.scale * UNIT_MESH_RADIUS;
        match *satellite {
            Satellite::Moon {
                orbit_radius,
                radius: moon_radius,
                period_days,
            } => {
                let phase = if period_days.is_normal() {
                    kepler::wrap_tau(2.0 * consts::PI * date.days_since_j2000() / period_days)
                } else {
                    0.0
                };
                SatelliteTransform::Moon {
                    position: parent.position + orbit_position(orbit_radius * radius, phase),
                    scale: moon_radius * parent.scale,
                }
            }
            Satellite::Rings {
                inner_radius,
                outer_radius,
            } => SatelliteTransform::Rings {
                inner_radius: inner_radius * radius,
                outer_radius: outer_radius * radius,
            },
        }
    }

    fn scaled(self, factor: f64) -> Self {
        match self {
            SatelliteTransform::Moon { position, scale } => SatelliteTransform::Moon {
                position: position * factor,
                scale: scale * factor,
            },
            SatelliteTransform::Rings {
                inner_radius,
                outer_radius,
            } => SatelliteTransform::Rings {
                inner_radius: inner_radius * factor,
                outer_radius: outer_radius * factor,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderedBody {
    pub name: Arc<str>,
    pub transform: BodyTransform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub satellites: Vec<SatelliteTransform>,
}

/// One rendered frame, bodies in catalog order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub date: SimDate,
    pub bodies: Vec<RenderedBody>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformChange {
    pub name: Arc<str>,
    pub before: BodyTransform,
    pub after: BodyTransform,
}

/// Result of a scale toggle. The engine has already jumped to the end
/// state; the renderer animates `before` to `after` over `duration`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleTransition {
    pub mode: ScaleMode,
    pub duration: Duration,
    pub changes: Vec<TransformChange>,
}

#[derive(Clone, Debug, PartialEq)]
struct Placement {
    scale: ScaleModeState,
    /// Table radius the system was placed with, restored by a reset.
    surface_radius: f64,
    /// Uniform compressed size. Also the Sun's size in either mode.
    body_size: f64,
    paths_visible: bool,
    /// Factor of the pinch in progress, if any.
    pinch: Option<f64>,
}

impl Placement {
    fn fit(catalog: &Catalog, table_radius: f64) -> Result<Self> {
        let fit = scale::scale_all_to_fit(catalog, table_radius)?;
        let scale = ScaleModeState::new(table_radius)?;
        Ok(Self {
            surface_radius: scale.table_radius,
            body_size: fit.body_size,
            scale,
            paths_visible: true,
            pinch: None,
        })
    }
}

#[derive(Debug)]
pub struct LayoutEngine<E = KeplerianEphemeris> {
    catalog: Catalog,
    config: LayoutConfig,
    clock: SimulationClock,
    adapter: EphemerisAdapter<E>,
    states: Arena<BodyId, OrbitalState>,
    placement: Option<Placement>,
    /// Date of the last layout.
    date: SimDate,
}

impl LayoutEngine<KeplerianEphemeris> {
    /// An engine over the built-in catalog and ephemeris.
    pub fn from_config(config: LayoutConfig, start: SimDate) -> Result<Self> {
        let catalog = Catalog::new(config.catalog_options());
        Self::new(catalog, config, KeplerianEphemeris::default(), start)
    }
}

impl<E: Ephemeris> LayoutEngine<E> {
    pub fn new(catalog: Catalog, config: LayoutConfig, ephemeris: E, start: SimDate) -> Result<Self> {
        config.validate()?;
        let states = catalog.ids().map(|_| OrbitalState::at_origin()).collect();
        Ok(Self {
            clock: SimulationClock::new(start, config.days_per_second),
            adapter: EphemerisAdapter::new(ephemeris),
            catalog,
            config,
            states,
            placement: None,
            date: start,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn ephemeris(&self) -> &E {
        self.adapter.source()
    }

    /// Date the current layout was computed for.
    pub fn date(&self) -> SimDate {
        self.date
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    pub fn scale_state(&self) -> Option<ScaleModeState> {
        self.placement.as_ref().map(|p| p.scale)
    }

    pub fn state(&self, id: BodyId) -> Option<&OrbitalState> {
        self.states.get(id)
    }

    fn placement(&self) -> Result<&Placement> {
        self.placement.as_ref().ok_or(LayoutError::NotPlaced)
    }

    fn placement_mut(&mut self) -> Result<&mut Placement> {
        self.placement.as_mut().ok_or(LayoutError::NotPlaced)
    }

    pub fn place_on_surface(&mut self, table_radius: f64) -> Result<()> {
        if self.placement.is_some() {
            return Err(LayoutError::AlreadyPlaced);
        }
        let placement = Placement::fit(&self.catalog, table_radius)?;
        let body_size = placement.body_size;
        self.placement = Some(placement);
        self.layout(self.clock.date())?;
        info!(table_radius, body_size, "placed solar system");
        Ok(())
    }

    /// Lay every body out for `date`.
    pub fn advance(&mut self, date: SimDate) -> Result<()> {
        self.layout(date)
    }

    /// Move the clock forward by `wall` and lay out at the new date. The
    /// clock runs whether or not the system is placed. A tick that would run
    /// off the calendar changes nothing.
    pub fn tick(&mut self, wall: Duration) -> Result<SimDate> {
        let Some(date) = self.clock.tick(wall) else {
            debug!(
                ?wall,
                rate = self.clock.days_per_second(),
                "tick past the calendar dropped"
            );
            return Err(LayoutError::DateOutOfRange);
        };
        if self.placement.is_none() {
            self.date = date;
            return Err(LayoutError::NotPlaced);
        }
        self.layout(date)?;
        Ok(date)
    }

    /// Jump to a user-picked date. The clock continues from there.
    pub fn select_date(&mut self, date: SimDate) -> Result<()> {
        self.clock.select(date);
        self.date = date;
        if self.placement.is_none() {
            debug!(%date, "date selected while unplaced");
            return Ok(());
        }
        self.layout(date)?;
        info!(%date, "selected date");
        Ok(())
    }

    pub fn toggle_orbit_scale(&mut self) -> Result<ScaleTransition> {
        self.transition(|scale| {
            scale.orbit_mode = scale.orbit_mode.toggled();
            scale.orbit_mode
        })
    }

    pub fn toggle_size_scale(&mut self) -> Result<ScaleTransition> {
        self.transition(|scale| {
            scale.size_mode = scale.size_mode.toggled();
            scale.size_mode
        })
    }

    fn transition(&mut self, flip: impl FnOnce(&mut ScaleModeState) -> ScaleMode) -> Result<ScaleTransition> {
        let before = self.frame();
        let mode = flip(&mut self.placement_mut()?.scale);
        self.layout(self.date)?;
        let after = self.frame();
        let changes = before
            .bodies
            .into_iter()
            .zip(after.bodies)
            .map(|(before, after)| TransformChange {
                name: before.name,
                before: before.transform,
                after: after.transform,
            })
            .collect();
        info!(?mode, "scale toggled");
        Ok(ScaleTransition {
            mode,
            duration: self.config.transition(),
            changes,
        })
    }

    /// Refit to the surface the system was placed on. Both modes go back to
    /// compressed and orbit paths are shown again.
    pub fn reset_to_surface(&mut self) -> Result<()> {
        let surface_radius = self.placement()?.surface_radius;
        self.placement = Some(Placement::fit(&self.catalog, surface_radius)?);
        self.layout(self.date)?;
        info!("reset to surface");
        Ok(())
    }

    pub fn clear_placement(&mut self) {
        if self.placement.take().is_some() {
            for (_, state) in self.states.iter_mut() {
                *state = OrbitalState::at_origin();
            }
            info!("cleared placement");
        }
    }

    pub fn orbit_paths_visible(&self) -> bool {
        self.placement.as_ref().is_some_and(|p| p.paths_visible)
    }

    pub fn set_orbit_paths_visible(&mut self, visible: bool) -> Result<()> {
        self.placement_mut()?.paths_visible = visible;
        Ok(())
    }

    pub fn toggle_orbit_paths(&mut self) -> Result<bool> {
        let placement = self.placement_mut()?;
        placement.paths_visible = !placement.paths_visible;
        Ok(placement.paths_visible)
    }

    pub fn pinch_begin(&mut self) -> Result<()> {
        let placement = self.placement_mut()?;
        if placement.pinch.replace(1.0).is_some() {
            debug!("pinch restarted");
        }
        Ok(())
    }

    /// Preview the system scaled by `factor` about the Sun. Engine state is
    /// left alone until [`LayoutEngine::pinch_end`].
    pub fn pinch_update(&mut self, factor: f64) -> Result<Vec<RenderedBody>> {
        let factor = scale::validate_table_radius(factor)?;
        let placement = self.placement_mut()?;
        if placement.pinch.is_none() {
            debug!("pinch update without begin");
        }
        placement.pinch = Some(factor);
        Ok(self
            .frame()
            .bodies
            .into_iter()
            .map(|body| RenderedBody {
                transform: body.transform.scaled(factor),
                satellites: body.satellites.into_iter().map(|s| s.scaled(factor)).collect(),
                ..body
            })
            .collect())
    }

    /// Finish the pinch. With `persist` the factor is folded into the table
    /// radius and body sizes. Returns the final factor, or `None` if no
    /// pinch was in progress.
    pub fn pinch_end(&mut self, persist: bool) -> Result<Option<f64>> {
        let placement = self.placement_mut()?;
        let Some(factor) = placement.pinch.take() else {
            debug!("pinch end without begin");
            return Ok(None);
        };
        if persist {
            placement.scale.table_radius *= factor;
            placement.body_size *= factor;
            self.layout(self.date)?;
            info!(factor, "pinch persisted");
        }
        Ok(Some(factor))
    }

    pub fn select_body(&self, name: &str) -> Result<&Body> {
        let id = self.catalog.find(name)?;
        Ok(&self.catalog[id])
    }

    /// Rendered radius of a body in display units.
    pub fn rendered_radius(&self, id: BodyId) -> Option<f64> {
        self.states.get(id).map(|s| s.scale * UNIT_MESH_RADIUS)
    }

    pub fn distance_from(&self, observer: &Vector3<f64>, name: &str) -> Result<f64> {
        self.placement()?;
        let id = self.catalog.find(name)?;
        Ok((self.states[id].position - observer).norm())
    }

    /// Strictly inside: an observer exactly on the surface is outside.
    pub fn is_observer_inside(&self, observer: &Vector3<f64>, name: &str) -> Result<bool> {
        let distance = self.distance_from(observer, name)?;
        let id = self.catalog.find(name)?;
        Ok(distance < self.states[id].scale * UNIT_MESH_RADIUS)
    }

    pub fn transform(&self, id: BodyId) -> Option<BodyTransform> {
        let placement = self.placement.as_ref()?;
        let body = self.catalog.get(id)?;
        let state = self.states.get(id)?;
        Some(BodyTransform {
            position: state.position,
            scale: state.scale,
            orbital_plane_rotation: state.longitude,
            orbit_path_radius: state.orbit_radius,
            orbit_path_visible: placement.paths_visible && !body.is_star(),
            axial_tilt: body.axial_tilt.to_radians(),
            spin: spin(body, self.date),
        })
    }

    /// What a renderer should draw. Empty while unplaced.
    pub fn frame(&self) -> Frame {
        let bodies = self
            .catalog
            .iter()
            .filter_map(|(id, body)| {
                self.transform(id).map(|transform| RenderedBody {
                    name: body.name.clone(),
                    satellites: body
                        .satellites
                        .iter()
                        .map(|satellite| SatelliteTransform::place(satellite, &transform, self.date))
                        .collect(),
                    transform,
                })
            })
            .collect();
        Frame {
            date: self.date,
            bodies,
        }
    }

    fn anchor(&self, placement: &Placement) -> Option<Anchor> {
        let (id, body) = self.catalog.anchor()?;
        let display_radius = scale::display_orbital_radius(
            body,
            self.catalog.rank(id),
            ScaleMode::Compressed,
            placement.scale.table_radius,
            self.catalog.orbiting_count(),
            None,
        );
        Some(Anchor {
            orbital_radius: body.orbital_radius,
            display_radius,
        })
    }

    fn layout(&mut self, date: SimDate) -> Result<()> {
        let placement = self.placement()?;
        let anchor = self.anchor(placement);
        let ScaleModeState {
            size_mode,
            orbit_mode,
            table_radius,
        } = placement.scale;
        let body_size = placement.body_size;
        let count = self.catalog.orbiting_count();
        let sun = self.catalog.sun().map(|(_, sun)| sun);

        let mut rank = 0;
        for (id, body) in self.catalog.iter() {
            if !body.is_star() {
                rank += 1;
            }
            let orbit_radius = scale::display_orbital_radius(body, rank, orbit_mode, table_radius, count, anchor);
            let scale = sun.map_or(body_size, |sun| {
                scale::display_body_scale(body, sun, size_mode, body_size, body_size)
            });
            let longitude = self.adapter.longitude_for(body, date).unwrap_or(0.0);
            let position = if body.is_star() {
                Vector3::zeros()
            } else {
                orbit_position(orbit_radius, longitude)
            };
            self.states[id] = OrbitalState {
                longitude,
                position,
                scale,
                orbit_radius,
            };
        }
        self.date = date;
        trace!(%date, bodies = self.states.len(), "laid out");
        Ok(())
    }
}

/// A point on a circular orbit of `radius` in the ecliptic (XZ) plane.
pub fn orbit_position(radius: f64, longitude: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), longitude) * Vector3::new(radius, 0.0, 0.0)
}

/// Rotation of a body about its own axis on `date`, zero at J2000.
pub fn spin(body: &Body, date: SimDate) -> f64 {
    if body.rotation_period == 0.0 || !body.rotation_period.is_finite() {
        return 0.0;
    }
    let hours = date.days_since_j2000() * 24.0;
    kepler::wrap_tau(2.0 * consts::PI * hours / body.rotation_period)
}
