//! What the user is looking at and where they are standing.
//!
//! A [`Selection`] only reads the engine. It is kept separate so a HUD can be
//! rebuilt from any engine state without touching the layout.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    bodies::{Body, BodyId},
    ephemeris::Ephemeris,
    error::Result,
    layout::LayoutEngine,
    reference,
};

/// Where to point an indicator so it faces the focused body.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookAt {
    /// Unit vector from the observer to the body
    pub direction: Vector3<f64>,
    pub distance: f64,
    /// Rotation about the up axis, same sense as orbital longitude (`rad`)
    pub yaw: f64,
    /// Elevation above the ecliptic plane (`rad`)
    pub pitch: f64,
}

/// Text shown for the focused body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSummary {
    pub name: String,
    pub tilt: String,
    pub rotation: String,
    pub radius: String,
    pub distance: String,
    pub size_reference: &'static str,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    focused: Option<BodyId>,
    observer: Vector3<f64>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self {
            focused: None,
            observer: Vector3::zeros(),
        }
    }

    pub fn focus<'e, E: Ephemeris>(&mut self, engine: &'e LayoutEngine<E>, name: &str) -> Result<&'e Body> {
        let id = engine.catalog().find(name)?;
        self.focused = Some(id);
        Ok(&engine.catalog()[id])
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    pub fn focused(&self) -> Option<BodyId> {
        self.focused
    }

    pub fn set_observer(&mut self, observer: Vector3<f64>) {
        self.observer = observer;
    }

    pub fn observer(&self) -> Vector3<f64> {
        self.observer
    }

    fn offset_to<E: Ephemeris>(&self, engine: &LayoutEngine<E>, id: BodyId) -> Option<Vector3<f64>> {
        if !engine.is_placed() {
            return None;
        }
        engine.state(id).map(|state| state.position - self.observer)
    }

    fn contains_observer<E: Ephemeris>(&self, engine: &LayoutEngine<E>, id: BodyId) -> bool {
        match (self.offset_to(engine, id), engine.rendered_radius(id)) {
            (Some(offset), Some(radius)) => offset.norm() < radius,
            _ => false,
        }
    }

    pub fn distance_to_focused<E: Ephemeris>(&self, engine: &LayoutEngine<E>) -> Option<f64> {
        self.offset_to(engine, self.focused?).map(|offset| offset.norm())
    }

    pub fn focused_body_is_containing_observer<E: Ephemeris>(&self, engine: &LayoutEngine<E>) -> bool {
        self.focused
            .is_some_and(|id| self.contains_observer(engine, id))
    }

    /// The first body, innermost out, the observer is standing inside.
    pub fn containing_body<'e, E: Ephemeris>(&self, engine: &'e LayoutEngine<E>) -> Option<&'e Body> {
        engine
            .catalog()
            .iter()
            .find(|&(id, _)| self.contains_observer(engine, id))
            .map(|(_, body)| body)
    }

    /// `None` with nothing focused, or when the observer sits exactly on the
    /// body's centre.
    pub fn look_at<E: Ephemeris>(&self, engine: &LayoutEngine<E>) -> Option<LookAt> {
        let offset = self.offset_to(engine, self.focused?)?;
        let distance = offset.norm();
        if distance == 0.0 {
            return None;
        }
        let direction = offset / distance;
        Some(LookAt {
            direction,
            distance,
            yaw: libm::atan2(-direction.z, direction.x),
            pitch: libm::asin(direction.y.clamp(-1.0, 1.0)),
        })
    }

    pub fn hud<E: Ephemeris>(&self, engine: &LayoutEngine<E>) -> Option<HudSummary> {
        let id = self.focused?;
        let body = engine.catalog().get(id)?;
        let distance = self.distance_to_focused(engine)?;
        let size = engine.rendered_radius(id)?;
        Some(HudSummary {
            name: body.name.to_uppercase(),
            tilt: format!("{} degree tilt", body.axial_tilt),
            rotation: format!("{} hour days", body.rotation_period.abs()),
            radius: format!("{} km radius", body.radius),
            distance: format!("{distance:.1} real meters away"),
            size_reference: reference::object_size_description(size),
        })
    }

    /// Status line while the observer is inside a body.
    pub fn status<E: Ephemeris>(&self, engine: &LayoutEngine<E>) -> Option<String> {
        let body = self.containing_body(engine)?;
        Some(if body.is_star() {
            format!("You are inside the {}", body.name)
        } else {
            format!("You are inside {}", body.name)
        })
    }
}
