#![warn(clippy::unwrap_used, clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::doc_markdown
)]
use std::{fs, path::PathBuf};

use clap::Parser;
use color_eyre::eyre;
use itertools::Itertools;
use orrery::{
    config::LayoutConfig,
    error::LayoutError,
    layout::{Frame, LayoutEngine, ScaleTransition},
    scale::ScaleModeState,
    selection::Selection,
    time::SimDate,
};
use script::{Command, Toggle};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod script;

const DEMO: &str = include_str!("demo.orrery");

/// Play an intent script against the solar system layout engine and print
/// what a renderer would be handed.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Layout configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Script to play back. A short demo runs when omitted.
    script: Option<PathBuf>,
}

#[derive(Serialize)]
struct Dump<'a> {
    frame: &'a Frame,
    scale: Option<ScaleModeState>,
    focused: Option<&'a str>,
}

struct Player {
    engine: LayoutEngine,
    selection: Selection,
}

impl Player {
    fn new(config: LayoutConfig, start: SimDate) -> eyre::Result<Self> {
        Ok(Self {
            engine: LayoutEngine::from_config(config, start)?,
            selection: Selection::new(),
        })
    }

    fn apply(&mut self, command: Command) -> eyre::Result<()> {
        match command {
            Command::Place(radius) => self.engine.place_on_surface(radius)?,
            Command::Date(date) => self.engine.select_date(date)?,
            Command::Tick(wall) => {
                self.engine.tick(wall)?;
            }
            Command::Toggle(Toggle::Orbit) => {
                let transition = self.engine.toggle_orbit_scale()?;
                print_transition("orbits", &transition);
            }
            Command::Toggle(Toggle::Size) => {
                let transition = self.engine.toggle_size_scale()?;
                print_transition("sizes", &transition);
            }
            Command::Toggle(Toggle::Paths) => {
                let visible = self.engine.toggle_orbit_paths()?;
                println!("orbit paths {}", if visible { "shown" } else { "hidden" });
            }
            Command::Select(name) => {
                let body = self.selection.focus(&self.engine, &name)?;
                info!(body = %body.name, "focused");
            }
            Command::Observer(position) => self.selection.set_observer(position),
            Command::Pinch { factor, keep } => {
                self.engine.pinch_begin()?;
                let preview = self.engine.pinch_update(factor)?;
                if let Some(outer) = preview.last() {
                    println!(
                        "pinch x{factor}: {} orbit at {:.3}",
                        outer.name, outer.transform.orbit_path_radius
                    );
                }
                self.engine.pinch_end(keep)?;
            }
            Command::Reset => self.engine.reset_to_surface()?,
            Command::Clear => {
                self.engine.clear_placement();
                self.selection.clear_focus();
            }
            Command::Report => self.report(),
            Command::Dump => {
                let frame = self.engine.frame();
                let focused = self
                    .selection
                    .focused()
                    .and_then(|id| self.engine.catalog().get(id))
                    .map(|body| &*body.name);
                let dump = Dump {
                    frame: &frame,
                    scale: self.engine.scale_state(),
                    focused,
                };
                println!(
                    "{}",
                    ron::ser::to_string_pretty(&dump, ron::ser::PrettyConfig::default())?
                );
            }
        }
        Ok(())
    }

    fn report(&self) {
        let frame = self.engine.frame();
        println!("== {} ==", frame.date);
        match self.engine.scale_state() {
            Some(scale) => println!(
                "table {:.3}, orbits {:?}, sizes {:?}",
                scale.table_radius, scale.orbit_mode, scale.size_mode
            ),
            None => println!("not placed"),
        }
        for body in &frame.bodies {
            let t = &body.transform;
            println!(
                "{:>8}  pos ({:>7.3}, {:>7.3}, {:>7.3})  scale {:.4}  lon {:>6.1}°",
                body.name,
                t.position.x,
                t.position.y,
                t.position.z,
                t.scale,
                t.orbital_plane_rotation.to_degrees()
            );
        }
        if let Some(hud) = self.selection.hud(&self.engine) {
            println!(
                "{}",
                [hud.name, hud.tilt, hud.rotation, hud.radius, hud.distance]
                    .iter()
                    .join(" | ")
            );
            println!("{}", hud.size_reference);
        }
        if let Some(status) = self.selection.status(&self.engine) {
            println!("{status}");
        }
    }
}

fn print_transition(what: &str, transition: &ScaleTransition) {
    println!(
        "{what} now {:?}, animating {} bodies over {:.1}s",
        transition.mode,
        transition.changes.len(),
        transition.duration.as_seconds_f64()
    );
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let config: LayoutConfig = match &args.config {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };
    config.validate()?;

    let source = match &args.script {
        Some(path) => fs::read_to_string(path)?,
        None => DEMO.to_owned(),
    };
    let commands = script::parse_script(&source)?;

    let mut player = Player::new(config, SimDate::from_datetime(OffsetDateTime::now_utc()))?;
    for (line, command) in commands {
        if let Err(err) = player.apply(command) {
            match err.downcast_ref::<LayoutError>() {
                Some(err) => warn!(line, %err, "command had no effect"),
                None => return Err(err),
            }
        }
    }
    Ok(())
}
