//! doping-scatter - Scatter plot of professional cycling race times
//!
//! Fetches the cyclist dataset, maps race year and elapsed time onto a fixed
//! canvas, and builds a scene with a legend, two time axes and one dot per
//! record, colored by whether the rider faced a doping allegation. Hovering a
//! dot drives a tooltip through explicit state transitions.
//!
//! # Example
//!
//! ```no_run
//! use doping_scatter::{chart::{ChartEvent, ChartView}, html, loader::{DatasetLoader, DATA_URL}, scale::Canvas};
//!
//! # async fn run() -> doping_scatter::Result<()> {
//! let dataset = DatasetLoader::new(DATA_URL)?.load().await;
//!
//! let mut view = ChartView::new(Canvas::default(), chrono::Utc::now());
//! view.apply(ChartEvent::Loaded(dataset));
//!
//! html::write_page(&view, &html::PageConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod data;
pub mod error;
pub mod html;
pub mod interaction;
pub mod loader;
pub mod render;
pub mod scale;
pub mod scene;
pub mod ticks;

pub use error::{Error, Result};
