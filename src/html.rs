//! HTML page generator for the scatter plot

use crate::chart::ChartView;
use crate::error::{Error, Result};
use crate::interaction::TooltipState;
use crate::scene::num;
use minijinja::{context, Environment};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Page template; the `.html` name turns on autoescaping
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            margin: 0;
            padding: 2rem;
        }

        main {
            display: flex;
            flex-direction: column;
            align-items: center;
        }

        #title {
            font-size: 2rem;
            font-weight: 600;
            margin-bottom: 1rem;
        }

        #tooltip {
            background: rgba(255, 255, 255, 0.95);
            border: 1px solid #30363d;
            border-radius: 4px;
            padding: 0.5rem;
            font-size: 0.85rem;
            pointer-events: none;
        }

        .dot {
            stroke: #000;
        }
    </style>
</head>
<body>
    <main>
        <h1 id="title">{{ title }}</h1>
        {% include "tooltip.html" %}
        {% if svg %}
        {{ svg | safe }}
        {% endif %}
    </main>

    <script>
        window.CYCLIST_DATA = {{ dataset_json | safe }};

        document.addEventListener('DOMContentLoaded', function() {
            const tooltip = document.getElementById('tooltip');
            const fields = ['name', 'place', 'time', 'year', 'doping'];
            const keys = { name: 'Name', place: 'Place', time: 'Time', year: 'Year', doping: 'Doping' };

            document.querySelectorAll('circle.dot').forEach(dot => {
                const record = window.CYCLIST_DATA[Number(dot.dataset.index)];
                if (!record) return;

                dot.addEventListener('mouseover', event => {
                    tooltip.style.visibility = 'visible';
                    tooltip.style.left = event.pageX + 'px';
                    tooltip.style.top = event.pageY + 'px';
                    tooltip.dataset.year = record.Year;
                    fields.forEach(field => {
                        tooltip.querySelector('[data-field="' + field + '"]').textContent = record[keys[field]];
                    });
                });

                dot.addEventListener('mouseout', () => {
                    tooltip.style.visibility = 'hidden';
                });
            });
        });
    </script>
</body>
</html>
"#;

/// Tooltip surface, included by the page and rendered alone for inspection
const TOOLTIP_TEMPLATE: &str = r#"<div id="tooltip" data-year="{{ tooltip.data_year }}" style="{{ tooltip.style }}">
Name: <span data-field="name">{{ tooltip.name }}</span>,<br />
Place: <span data-field="place">{{ tooltip.place }}</span>,<br />
Time: <span data-field="time">{{ tooltip.time }}</span>,<br />
Year: <span data-field="year">{{ tooltip.year }}</span>,<br />
Doping: <span data-field="doping">{{ tooltip.doping }}</span>,
</div>"#;

/// Page configuration
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Title shown in the heading and the browser tab
    pub title: String,
    /// Directory receiving index.html, chart.svg and data.json
    pub output_dir: PathBuf,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Doping Allegations in Professional Bicycle Racing".to_string(),
            output_dir: PathBuf::from("dist"),
        }
    }
}

/// Tooltip values as the template consumes them
#[derive(Debug, Clone, serde::Serialize)]
struct TooltipView {
    data_year: String,
    style: String,
    name: String,
    place: String,
    time: String,
    year: String,
    doping: String,
}

impl From<&TooltipState> for TooltipView {
    fn from(state: &TooltipState) -> Self {
        let visibility = if state.visible { "visible" } else { "hidden" };
        let (left, top) = state
            .position
            .map(|p| (format!("{}px", num(p.x)), format!("{}px", num(p.y))))
            .unwrap_or_default();
        let year = state.year().map(|y| y.to_string()).unwrap_or_default();

        let details = state.details.as_ref();
        Self {
            data_year: year.clone(),
            style: format!(
                "visibility: {}; position: absolute; left: {}; top: {};",
                visibility, left, top
            ),
            name: details.map(|d| d.name.clone()).unwrap_or_default(),
            place: details.map(|d| d.place.clone()).unwrap_or_default(),
            time: details.map(|d| d.time.clone()).unwrap_or_default(),
            year,
            doping: details.map(|d| d.doping.clone()).unwrap_or_default(),
        }
    }
}

fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("tooltip.html", TOOLTIP_TEMPLATE)?;
    env.add_template("page.html", PAGE_TEMPLATE)?;
    Ok(env)
}

/// Render the tooltip surface on its own
pub fn render_tooltip(state: &TooltipState) -> Result<String> {
    let env = environment()?;
    let template = env.get_template("tooltip.html")?;
    Ok(template.render(context! { tooltip => TooltipView::from(state) })?)
}

/// Generate the full HTML page for the current state of `view`
pub fn generate_page(view: &ChartView, config: &PageConfig) -> Result<String> {
    let env = environment()?;
    let template = env.get_template("page.html")?;

    let svg = view.scene().map(|scene| scene.to_svg());
    // Keep the embedded JSON from closing the script element
    let dataset_json = serde_json::to_string(view.dataset())?.replace("</", "<\\/");

    let html = template.render(context! {
        title => &config.title,
        tooltip => TooltipView::from(view.tooltip()),
        svg => svg,
        dataset_json => dataset_json,
    })?;

    Ok(html)
}

/// Write index.html, chart.svg (when a scene is mounted) and data.json
pub fn write_page(view: &ChartView, config: &PageConfig) -> Result<PathBuf> {
    let output_dir = &config.output_dir;
    std::fs::create_dir_all(output_dir).map_err(|e| Error::FileWriteError {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let html = generate_page(view, config)?;
    let index_path = output_dir.join("index.html");
    write_file(&index_path, &html)?;

    if let Some(scene) = view.scene() {
        write_file(&output_dir.join("chart.svg"), &scene.to_svg())?;
    }

    let json = serde_json::to_string_pretty(view.dataset())?;
    write_file(&output_dir.join("data.json"), &json)?;

    debug!("Wrote page to {}", index_path.display());
    Ok(index_path)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| Error::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
