//! Chart view: owns the dataset, the mounted scene and the tooltip state.
//!
//! Every change goes through [`ChartView::apply`]:
//!
//! ```text
//! Loaded(dataset) -> teardown -> Scales::compute -> render_scene -> Interactions::bind
//! Pointer(event)  -> Interactions::dispatch -> TooltipState::reduce
//! ```

use crate::data::Dataset;
use crate::interaction::{Interactions, PointerEvent, TooltipState};
use crate::render::render_scene;
use crate::scale::{Canvas, Scales};
use crate::scene::Scene;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Discrete inputs to the chart view
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// The dataset finished loading (possibly empty)
    Loaded(Dataset),
    Pointer(PointerEvent),
}

/// A scene currently on display together with its bindings
#[derive(Debug, Clone)]
pub struct Mounted {
    pub scales: Scales,
    pub scene: Scene,
    pub interactions: Interactions,
}

#[derive(Debug, Clone)]
pub struct ChartView {
    canvas: Canvas,
    anchor: DateTime<Utc>,
    dataset: Dataset,
    mounted: Option<Mounted>,
    tooltip: TooltipState,
}

impl ChartView {
    /// Create an empty view. `anchor` supplies month, day and time of day for year dates.
    pub fn new(canvas: Canvas, anchor: DateTime<Utc>) -> Self {
        Self {
            canvas,
            anchor,
            dataset: Dataset::new(),
            mounted: None,
            tooltip: TooltipState::default(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn mounted(&self) -> Option<&Mounted> {
        self.mounted.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.mounted.as_ref().map(|m| &m.scene)
    }

    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    pub fn apply(&mut self, event: ChartEvent) {
        match event {
            ChartEvent::Loaded(dataset) => self.load(dataset),
            ChartEvent::Pointer(pointer) => self.pointer(pointer),
        }
    }

    fn load(&mut self, dataset: Dataset) {
        if dataset == self.dataset {
            debug!("Dataset unchanged, keeping current scene");
            return;
        }

        self.teardown();
        self.dataset = dataset;

        let Some(scales) = Scales::compute(&self.dataset, &self.canvas, self.anchor) else {
            info!("Dataset is empty, skipping render");
            return;
        };

        let scene = render_scene(&self.dataset, &scales, &self.canvas);
        let interactions = Interactions::bind(&scene);
        info!("Rendered {} records", self.dataset.len());

        self.mounted = Some(Mounted {
            scales,
            scene,
            interactions,
        });
    }

    /// Detach all handlers and drop the current scene
    fn teardown(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            let removed = mounted.interactions.detach_all();
            debug!("Tore down scene, detached {} handlers", removed);
        }
        self.tooltip = TooltipState::default();
    }

    fn pointer(&mut self, event: PointerEvent) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        if let Some(action) = mounted.interactions.dispatch(&event, &self.dataset) {
            self.tooltip = std::mem::take(&mut self.tooltip).reduce(action);
        }
    }
}
