//! Hover interactions and the tooltip state they drive

use crate::data::{Dataset, Record};
use crate::scene::Scene;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Pointer position in page coordinates (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PagePosition {
    pub x: f64,
    pub y: f64,
}

/// Record fields shown in the tooltip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipDetails {
    pub year: i32,
    pub time: String,
    pub place: String,
    pub name: String,
    pub doping: String,
}

impl From<&Record> for TooltipDetails {
    fn from(record: &Record) -> Self {
        Self {
            year: record.year,
            time: record.time.clone(),
            place: record.place.clone(),
            name: record.name.clone(),
            doping: record.doping.clone(),
        }
    }
}

/// Transient hover state of the tooltip surface
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TooltipState {
    pub visible: bool,
    pub position: Option<PagePosition>,
    pub details: Option<TooltipDetails>,
}

/// Transition applied to a [`TooltipState`]
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipAction {
    Show {
        position: PagePosition,
        details: TooltipDetails,
    },
    /// Hide without clearing the last position and content
    Hide,
}

impl TooltipState {
    /// Apply `action`, returning the next state
    pub fn reduce(self, action: TooltipAction) -> Self {
        match action {
            TooltipAction::Show { position, details } => Self {
                visible: true,
                position: Some(position),
                details: Some(details),
            },
            TooltipAction::Hide => Self {
                visible: false,
                ..self
            },
        }
    }

    /// Year of the last hovered record, exposed as `data-year`
    pub fn year(&self) -> Option<i32> {
        self.details.as_ref().map(|d| d.year)
    }
}

/// Pointer activity on a rendered point, identified by its index in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Over { point: usize, page: PagePosition },
    Out { point: usize },
}

impl PointerEvent {
    pub fn point(&self) -> usize {
        match self {
            PointerEvent::Over { point, .. } | PointerEvent::Out { point } => *point,
        }
    }

    fn behavior(&self) -> Behavior {
        match self {
            PointerEvent::Over { .. } => Behavior::Hover,
            PointerEvent::Out { .. } => Behavior::Unhover,
        }
    }
}

/// Behavior attached to a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Hover,
    Unhover,
}

/// Hover/unhover bindings for every dot of a scene
#[derive(Debug, Clone, Default)]
pub struct Interactions {
    /// (point, behavior) -> record index
    bindings: HashMap<(usize, Behavior), usize>,
}

impl Interactions {
    /// Attach both behaviors to every dot in `scene`
    pub fn bind(scene: &Scene) -> Self {
        let mut bindings = HashMap::new();
        for (point, dot) in scene.dots().into_iter().enumerate() {
            bindings.insert((point, Behavior::Hover), dot.record);
            bindings.insert((point, Behavior::Unhover), dot.record);
        }
        debug!("Bound {} interaction handlers", bindings.len());
        Self { bindings }
    }

    pub fn is_bound(&self, point: usize, behavior: Behavior) -> bool {
        self.bindings.contains_key(&(point, behavior))
    }

    /// Number of attached handlers
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Translate a pointer event into a tooltip transition.
    ///
    /// Events on points without a matching binding produce nothing.
    pub fn dispatch(&self, event: &PointerEvent, dataset: &Dataset) -> Option<TooltipAction> {
        let record = *self.bindings.get(&(event.point(), event.behavior()))?;
        match event {
            PointerEvent::Over { page, .. } => {
                let record = dataset.get(record)?;
                Some(TooltipAction::Show {
                    position: *page,
                    details: TooltipDetails::from(record),
                })
            }
            PointerEvent::Out { .. } => Some(TooltipAction::Hide),
        }
    }

    /// Detach every handler, returning how many were removed
    pub fn detach_all(&mut self) -> usize {
        let removed = self.bindings.len();
        self.bindings.clear();
        removed
    }
}
