//! The `<h3-map>` element state and lifecycle.
//!
//! A host (the wasm binding, the CLI) drives the element:
//!
//! 1. forwards attribute changes with [`H3Map::attribute_changed`] or the typed
//!    setters, raising any returned error to its caller;
//! 2. calls [`H3Map::render`] and paints the returned markup;
//! 3. calls [`H3Map::after_paint`] and runs the returned [`Task`]s, reporting
//!    results with [`H3Map::apply_world_geometry`] and
//!    [`H3Map::apply_viewport`];
//! 4. renders again whenever a setter or an `apply_*` call reports a change.

use formats::FeatureCollection;
use foundation::math::ProjectionKind;
use h3o::CellIndex;
use layers::{Symbology, unique_cells};
use runtime::{Event, EventBus, Frame};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::attributes::{
    self, AREAS, Area, PROJECTION, RELOAD_POLICY, WORLD_GEOMETRY_COLL, WORLD_GEOMETRY_SRC,
};
use crate::config::{ReloadPolicy, WidgetConfig, default_attribute};
use crate::derive::DerivedGeometry;
use crate::error::{AttributeError, LoadError};
use crate::events::LifecycleEvent;
use crate::loader::{WorldGeometry, WorldSource};
use crate::render::{MapView, render_map, render_placeholder};
use crate::sequencer::{Phase, RenderSequencer, Task};
use crate::viewport::Viewport;

/// Lifecycle events kept for inspection; older ones are dropped.
pub const EVENT_LOG_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct H3Map {
    projection: ProjectionKind,
    areas: Vec<Area>,
    unique_areas: Vec<CellIndex>,
    source: WorldSource,
    reload_policy: ReloadPolicy,
    world: WorldGeometry,
    viewport: Option<Viewport>,
    sequencer: RenderSequencer,
    events: EventBus<LifecycleEvent>,
    symbology: Symbology,
}

impl Default for H3Map {
    fn default() -> Self {
        Self::new()
    }
}

impl H3Map {
    pub fn new() -> Self {
        let defaults = WidgetConfig::default();
        Self {
            projection: ProjectionKind::Orthographic,
            areas: Vec::new(),
            unique_areas: Vec::new(),
            source: WorldSource::new(defaults.world_geometry_src, defaults.world_geometry_coll),
            reload_policy: ReloadPolicy::Once,
            world: WorldGeometry::Unloaded,
            viewport: None,
            sequencer: RenderSequencer::new(),
            events: EventBus::with_capacity(EVENT_LOG_CAPACITY),
            symbology: Symbology::default(),
        }
    }

    /// Builds an element from a configuration, validating it like markup.
    pub fn from_config(config: &WidgetConfig) -> Result<Self, AttributeError> {
        let mut map = Self::new();
        map.set_projection(&config.projection)?;
        map.set_areas(&config.areas)?;
        map.set_world_geometry_src(&config.world_geometry_src);
        map.set_world_geometry_coll(&config.world_geometry_coll);
        map.set_reload_policy(&config.reload_policy)?;
        Ok(map)
    }

    // --- configuration ---------------------------------------------------

    /// Applies a markup attribute change. `None` means the attribute was
    /// removed and its default applies again. Unknown names are ignored.
    pub fn attribute_changed(&mut self, name: &str, value: Option<&str>) -> Result<(), AttributeError> {
        let Some(value) = value.or_else(|| default_attribute(name)) else {
            return Ok(());
        };
        match name {
            PROJECTION => self.set_projection(value),
            AREAS => self.set_areas_json(value),
            WORLD_GEOMETRY_SRC => {
                self.set_world_geometry_src(value);
                Ok(())
            }
            WORLD_GEOMETRY_COLL => {
                self.set_world_geometry_coll(value);
                Ok(())
            }
            RELOAD_POLICY => self.set_reload_policy(value),
            _ => Ok(()),
        }
    }

    pub fn projection(&self) -> ProjectionKind {
        self.projection
    }

    pub fn set_projection(&mut self, id: &str) -> Result<(), AttributeError> {
        let kind = self.checked(PROJECTION, attributes::validate_projection(id))?;
        self.projection = kind;
        Ok(())
    }

    /// Areas as assigned, duplicates included and identifiers verbatim.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Areas without duplicates, in first-seen order.
    pub fn unique_areas(&self) -> &[CellIndex] {
        &self.unique_areas
    }

    pub fn set_areas<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<(), AttributeError> {
        let cells = self.checked(AREAS, attributes::validate_areas(ids))?;
        self.commit_areas(cells);
        Ok(())
    }

    pub fn set_areas_value(&mut self, value: &Value) -> Result<(), AttributeError> {
        let cells = self.checked(AREAS, attributes::validate_areas_value(value))?;
        self.commit_areas(cells);
        Ok(())
    }

    pub fn set_areas_json(&mut self, text: &str) -> Result<(), AttributeError> {
        let cells = self.checked(AREAS, attributes::validate_areas_json(text))?;
        self.commit_areas(cells);
        Ok(())
    }

    fn commit_areas(&mut self, areas: Vec<Area>) {
        let cells: Vec<CellIndex> = areas.iter().map(|area| area.cell).collect();
        self.unique_areas = unique_cells(&cells);
        self.areas = areas;
    }

    pub fn world_source(&self) -> &WorldSource {
        &self.source
    }

    pub fn set_world_geometry_src(&mut self, src: &str) {
        if self.source.src != src {
            self.source.src = src.to_string();
            self.source_changed();
        }
        self.accepted(WORLD_GEOMETRY_SRC);
    }

    pub fn set_world_geometry_coll(&mut self, coll: &str) {
        if self.source.coll != coll {
            self.source.coll = coll.to_string();
            self.source_changed();
        }
        self.accepted(WORLD_GEOMETRY_COLL);
    }

    pub fn reload_policy(&self) -> ReloadPolicy {
        self.reload_policy
    }

    pub fn set_reload_policy(&mut self, text: &str) -> Result<(), AttributeError> {
        let policy = self.checked(RELOAD_POLICY, attributes::validate_reload_policy(text))?;
        self.reload_policy = policy;
        Ok(())
    }

    pub fn symbology(&self) -> &Symbology {
        &self.symbology
    }

    pub fn set_symbology(&mut self, symbology: Symbology) {
        self.symbology = symbology;
    }

    fn source_changed(&mut self) {
        // Before the first paint the initial load picks up the new source.
        if self.reload_policy == ReloadPolicy::OnSourceChange && self.sequencer.first_paint_done() {
            debug!(src = %self.source.src, coll = %self.source.coll, "world geometry reload requested");
            self.sequencer
                .request(Task::LoadWorldGeometry(self.source.clone()));
        }
    }

    fn checked<T>(
        &mut self,
        name: &'static str,
        result: Result<T, AttributeError>,
    ) -> Result<T, AttributeError> {
        match &result {
            Ok(_) => self.accepted(name),
            Err(err) => {
                warn!(attribute = name, error = %err, "attribute rejected");
                self.emit(LifecycleEvent::AttributeRejected {
                    name,
                    message: err.to_string(),
                });
            }
        }
        result
    }

    fn accepted(&mut self, name: &'static str) {
        debug!(attribute = name, "attribute accepted");
        self.emit(LifecycleEvent::AttributeAccepted { name });
    }

    // --- readiness ---------------------------------------------------------

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn size_known(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn world_geometry(&self) -> &WorldGeometry {
        &self.world
    }

    pub fn world_features(&self) -> Option<&FeatureCollection> {
        self.world.features()
    }

    /// Loaded or explicitly absent.
    pub fn geometry_loaded(&self) -> bool {
        self.world.is_resolved()
    }

    /// The error of the most recent geometry load, if it failed.
    pub fn load_error(&self) -> Option<&LoadError> {
        self.world.error()
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == Phase::Loading && !(self.size_known() && self.geometry_loaded())
    }

    pub fn frame(&self) -> Frame {
        self.sequencer.frame()
    }

    // --- lifecycle -----------------------------------------------------------

    /// Renders the current presentation: the placeholder while loading, the
    /// map once ready.
    pub fn render(&mut self) -> String {
        if let Some(phase) = self
            .sequencer
            .begin_render(self.size_known(), self.geometry_loaded())
        {
            info!(frame = self.frame().index, projection = self.projection.id(), "map ready");
            self.emit(LifecycleEvent::PhaseChanged(phase));
        }
        if self.phase() == Phase::Loading {
            return render_placeholder(self.load_error());
        }
        match self.derive() {
            Some(derived) => render_map(&MapView {
                projection_kind: self.projection,
                derived: &derived,
                world: self.world.features(),
                symbology: &self.symbology,
                load_error: self.load_error(),
            }),
            None => render_placeholder(self.load_error()),
        }
    }

    /// Derived shapes for the current state; `None` until the viewport is
    /// measured.
    pub fn derive(&self) -> Option<DerivedGeometry> {
        let viewport = self.viewport?;
        Some(DerivedGeometry::compute(
            self.projection,
            &self.unique_areas,
            viewport,
        ))
    }

    /// Hands out the background tasks due after a completed paint.
    pub fn after_paint(&mut self) -> Vec<Task> {
        let tasks = self.sequencer.after_paint(&self.source, self.size_known());
        for task in &tasks {
            debug!(?task, "task scheduled");
            self.emit(LifecycleEvent::TaskScheduled(task.clone()));
        }
        tasks
    }

    /// Stores a measured surface size. Sizes without a usable aspect ratio
    /// (a detached or collapsed surface) return `false`; while the size is
    /// still unknown the probe then runs again after the next paint.
    pub fn apply_viewport(&mut self, width: f64, height: f64) -> bool {
        let Some(viewport) = Viewport::new(width, height) else {
            warn!(width, height, "ignoring unusable viewport measurement");
            if self.viewport.is_none() {
                self.sequencer.request(Task::ProbeViewport);
            }
            return false;
        };
        debug!(width, height, "viewport measured");
        self.viewport = Some(viewport);
        self.emit(LifecycleEvent::ViewportMeasured(viewport));
        true
    }

    /// Stores the outcome of a geometry load for `source`. Returns `false`
    /// when the result is stale and was discarded.
    pub fn apply_world_geometry(
        &mut self,
        source: &WorldSource,
        result: Result<Option<FeatureCollection>, LoadError>,
    ) -> bool {
        if self.reload_policy == ReloadPolicy::OnSourceChange && *source != self.source {
            debug!(src = %source.src, "discarding stale world geometry");
            self.emit(LifecycleEvent::StaleGeometryDiscarded {
                src: source.src.clone(),
            });
            return false;
        }
        let event = match &result {
            Ok(fc) => LifecycleEvent::GeometryResolved {
                coll: source.coll.clone(),
                features: fc.as_ref().map(|fc| fc.features.len()),
            },
            Err(err) => {
                warn!(src = %source.src, error = %err, "world geometry failed to load");
                LifecycleEvent::GeometryFailed {
                    message: err.to_string(),
                }
            }
        };
        self.world = WorldGeometry::from_result(result);
        self.emit(event);
        true
    }

    // --- events --------------------------------------------------------------

    pub fn events(&self) -> &[Event<LifecycleEvent>] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event<LifecycleEvent>> {
        self.events.drain()
    }

    fn emit(&mut self, event: LifecycleEvent) {
        self.events.emit(self.sequencer.frame(), event);
    }
}
