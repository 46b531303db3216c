//! Chart renderer: builds the legend, both axes and one dot per record

use crate::data::Dataset;
use crate::scale::{Canvas, Scales, TimeScale};
use crate::scene::{
    Dot, Group, Line, Node, Path, Rect, Scene, Text, ALLEGATION_COLOR, NO_ALLEGATION_COLOR,
};
use tracing::debug;

/// Radius of every plotted point
pub const DOT_RADIUS: f64 = 6.0;
/// Requested number of ticks per axis
pub const TICK_COUNT: usize = 10;

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const SWATCH_SIZE: f64 = 18.0;
const YEAR_FORMAT: &str = "%Y";
const TIME_FORMAT: &str = "%M:%S";

/// Side of the plot an axis is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    Bottom,
    Left,
}

/// Build a fresh scene for `dataset` using `scales`.
///
/// The output never shares nodes with a previous scene, so calling this again
/// after a dataset change cannot duplicate elements.
pub fn render_scene(dataset: &Dataset, scales: &Scales, canvas: &Canvas) -> Scene {
    let mut scene = Scene::new(canvas.width, canvas.height);

    scene.nodes.push(Node::Group(legend(canvas)));

    let x_axis = axis(&scales.year, Orient::Bottom, YEAR_FORMAT)
        .with_id("x-axis")
        .translated(0.0, canvas.height - canvas.padding);
    scene.nodes.push(Node::Group(x_axis));

    let y_axis = axis(&scales.time, Orient::Left, TIME_FORMAT)
        .with_id("y-axis")
        .translated(canvas.padding, 0.0);
    scene.nodes.push(Node::Group(y_axis));

    for (index, record) in dataset.iter().enumerate() {
        let fill = if record.has_allegation() {
            ALLEGATION_COLOR
        } else {
            NO_ALLEGATION_COLOR
        };

        scene.nodes.push(Node::Dot(Dot {
            cx: scales.x(record.year),
            cy: scales.y(record.seconds),
            r: DOT_RADIUS,
            fill: fill.to_string(),
            x_value: record.year_date(scales.anchor).format(YEAR_FORMAT).to_string(),
            y_value: record.time_iso(),
            record: index,
        }));
    }

    debug!("Rendered scene with {} dots", dataset.len());
    scene
}

fn legend(canvas: &Canvas) -> Group {
    let mut item = Group::new()
        .with_class("legend-element")
        .translated(canvas.width - canvas.padding, canvas.height / 2.0);

    let entries = [
        (NO_ALLEGATION_COLOR, "No allegations", -75.0, 0.0),
        (ALLEGATION_COLOR, "Allegations", -60.0, 20.0),
    ];
    for (color, label, label_x, offset) in entries {
        item.push(Node::Rect(Rect {
            x: 0.0,
            y: offset,
            width: SWATCH_SIZE,
            height: SWATCH_SIZE,
            fill: color.to_string(),
        }));
        item.push(Node::Text(Text {
            x: label_x,
            y: offset + 13.0,
            font_size: Some(12.0),
            content: label.to_string(),
            ..Default::default()
        }));
    }

    let mut legend = Group::new().with_id("legend");
    legend.push(Node::Group(item));
    legend
}

/// Axis group for `scale`: a domain path plus one labelled tick per calendar tick
pub fn axis(scale: &TimeScale, orient: Orient, format: &str) -> Group {
    let (r0, r1) = scale.range();
    let anchor = match orient {
        Orient::Bottom => "middle",
        Orient::Left => "end",
    };

    let mut group = Group::new()
        .with_attr("fill", "none")
        .with_attr("font-size", "10")
        .with_attr("font-family", "sans-serif")
        .with_attr("text-anchor", anchor);

    let d = match orient {
        Orient::Bottom => format!("M{},{}V0H{}V{}", r0, TICK_SIZE, r1, TICK_SIZE),
        Orient::Left => format!("M{},{}H0V{}H{}", -TICK_SIZE, r0, r1, -TICK_SIZE),
    };
    group.push(Node::Path(Path {
        class: Some("domain".to_string()),
        d,
        stroke: "currentColor".to_string(),
    }));

    let offset = TICK_SIZE + TICK_PADDING;
    for tick in scale.ticks(TICK_COUNT) {
        let position = scale.map(tick);
        let label = tick.format(format).to_string();

        let (translate, line, text) = match orient {
            Orient::Bottom => (
                (position, 0.0),
                Line {
                    x2: 0.0,
                    y2: TICK_SIZE,
                    stroke: "currentColor".to_string(),
                },
                Text {
                    x: 0.0,
                    y: offset,
                    dy: Some("0.71em".to_string()),
                    fill: Some("currentColor".to_string()),
                    content: label,
                    ..Default::default()
                },
            ),
            Orient::Left => (
                (0.0, position),
                Line {
                    x2: -TICK_SIZE,
                    y2: 0.0,
                    stroke: "currentColor".to_string(),
                },
                Text {
                    x: -offset,
                    y: 0.0,
                    dy: Some("0.32em".to_string()),
                    fill: Some("currentColor".to_string()),
                    content: label,
                    ..Default::default()
                },
            ),
        };

        let mut tick_group = Group::new()
            .with_class("tick")
            .translated(translate.0, translate.1);
        tick_group.push(Node::Line(line));
        tick_group.push(Node::Text(text));
        group.push(Node::Group(tick_group));
    }

    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::make_record;
    use crate::data::Record;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn render(records: Vec<Record>) -> (Dataset, Scales, Scene) {
        let canvas = Canvas::default();
        let dataset = Dataset::from_records(records);
        let scales = Scales::compute(&dataset, &canvas, anchor()).unwrap();
        let scene = render_scene(&dataset, &scales, &canvas);
        (dataset, scales, scene)
    }

    fn sample() -> Vec<Record> {
        vec![
            make_record(1995, 2210.0, "Alleged drug use during 1995"),
            make_record(1997, 2240.0, ""),
            make_record(2004, 2300.0, "Positive test"),
            make_record(2015, 2390.0, ""),
            make_record(2015, 2390.0, ""),
        ]
    }

    fn tick_labels(group: &Group) -> Vec<String> {
        group
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Group(tick) => tick.children.iter().find_map(|child| match child {
                    Node::Text(text) => Some(text.content.clone()),
                    _ => None,
                }),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_one_dot_per_record() {
        let (dataset, _, scene) = render(sample());
        assert_eq!(scene.dots().len(), dataset.len());
    }

    #[test]
    fn test_dot_color_follows_allegation() {
        let (dataset, _, scene) = render(sample());
        for dot in scene.dots() {
            let record = dataset.get(dot.record).unwrap();
            let expected = if record.doping.is_empty() {
                NO_ALLEGATION_COLOR
            } else {
                ALLEGATION_COLOR
            };
            assert_eq!(dot.fill, expected);
        }
    }

    #[test]
    fn test_dot_data_attributes() {
        let (dataset, _, scene) = render(sample());
        for dot in scene.dots() {
            let record = dataset.get(dot.record).unwrap();
            assert_eq!(dot.x_value.parse::<i32>().unwrap(), record.year);
            assert_eq!(dot.y_value, record.time_iso());
        }
    }

    #[test]
    fn test_single_record_scenario() {
        let (_, scales, scene) = render(vec![make_record(1998, 4000.0, "")]);
        let dots = scene.dots();
        assert_eq!(dots.len(), 1);

        let dot = dots[0];
        assert_eq!(dot.fill, NO_ALLEGATION_COLOR);
        assert_eq!(dot.cx, scales.x(1998));
        assert_eq!(dot.cy, scales.y(4000.0));
        assert_eq!(dot.r, DOT_RADIUS);
        assert_eq!(dot.y_value, "1970-01-01T01:06:40.000Z");
    }

    #[test]
    fn test_legend_layout() {
        let (_, _, scene) = render(sample());
        let legend = scene.group("legend").unwrap();
        let Node::Group(item) = &legend.children[0] else {
            panic!("legend item missing");
        };
        assert_eq!(item.class.as_deref(), Some("legend-element"));
        assert_eq!(item.translate, Some((950.0, 300.0)));

        let labels: Vec<&str> = item
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["No allegations", "Allegations"]);

        let fills: Vec<&str> = item
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Rect(rect) => Some(rect.fill.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![NO_ALLEGATION_COLOR, ALLEGATION_COLOR]);
    }

    #[test]
    fn test_axes_placement_and_labels() {
        let (_, _, scene) = render(sample());

        let x_axis = scene.group("x-axis").unwrap();
        assert_eq!(x_axis.translate, Some((0.0, 550.0)));
        let years = tick_labels(x_axis);
        assert_eq!(years.first().map(String::as_str), Some("1996"));
        assert!(years.iter().all(|y| y.len() == 4));

        let y_axis = scene.group("y-axis").unwrap();
        assert_eq!(y_axis.translate, Some((50.0, 0.0)));
        let times = tick_labels(y_axis);
        assert_eq!(times.first().map(String::as_str), Some("39:45"));
        assert_eq!(times.last().map(String::as_str), Some("37:00"));
    }

    #[test]
    fn test_left_axis_domain_path() {
        let (_, scales, _) = render(sample());
        let group = axis(&scales.time, Orient::Left, TIME_FORMAT);
        let Node::Path(path) = &group.children[0] else {
            panic!("domain path missing");
        };
        assert_eq!(path.d, "M-6,550H0V50H-6");
        assert!(group
            .attrs
            .contains(&("text-anchor".to_string(), "end".to_string())));
    }

    #[test]
    fn test_render_is_fresh_each_time() {
        let canvas = Canvas::default();
        let dataset = Dataset::from_records(sample());
        let scales = Scales::compute(&dataset, &canvas, anchor()).unwrap();

        let first = render_scene(&dataset, &scales, &canvas);
        let second = render_scene(&dataset, &scales, &canvas);
        assert_eq!(first, second);
        assert_eq!(second.dots().len(), dataset.len());
    }
}
