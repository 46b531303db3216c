//! Retained scene graph for the chart and its SVG serialization

use std::fmt::Write;

/// Fill for points and swatches without an allegation
pub const NO_ALLEGATION_COLOR: &str = "blue";
/// Fill for points and swatches with an allegation
pub const ALLEGATION_COLOR: &str = "red";

/// A complete chart: fixed-size canvas plus its top-level nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Rect(Rect),
    Text(Text),
    Line(Line),
    Path(Path),
    Dot(Dot),
}

/// Container translated as a unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub id: Option<String>,
    pub class: Option<String>,
    pub translate: Option<(f64, f64)>,
    /// Presentation attributes inherited by children
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    /// Baseline shift, e.g. "0.71em"
    pub dy: Option<String>,
    pub font_size: Option<f64>,
    pub fill: Option<String>,
    pub content: String,
}

/// Line from the local origin to `(x2, y2)`
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub x2: f64,
    pub y2: f64,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub class: Option<String>,
    pub d: String,
    pub stroke: String,
}

/// One plotted record
#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: String,
    /// Formatted year, exposed as `data-xvalue`
    pub x_value: String,
    /// ISO-8601 time value, exposed as `data-yvalue`
    pub y_value: String,
    /// Index of the record in the dataset
    pub record: usize,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn translated(mut self, x: f64, y: f64) -> Self {
        self.translate = Some((x, y));
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            nodes: Vec::new(),
        }
    }

    /// All dots in document order
    pub fn dots(&self) -> Vec<&Dot> {
        let mut dots = Vec::new();
        collect_dots(&self.nodes, &mut dots);
        dots
    }

    /// The group with the given id, searched depth first
    pub fn group(&self, id: &str) -> Option<&Group> {
        find_group(&self.nodes, id)
    }

    /// Serialize as a standalone `<svg>` element
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            num(self.width),
            num(self.height)
        );
        for node in &self.nodes {
            write_node(&mut out, node, 1);
        }
        out.push_str("</svg>\n");
        out
    }
}

fn collect_dots<'a>(nodes: &'a [Node], out: &mut Vec<&'a Dot>) {
    for node in nodes {
        match node {
            Node::Dot(dot) => out.push(dot),
            Node::Group(group) => collect_dots(&group.children, out),
            _ => {}
        }
    }
}

fn find_group<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Group> {
    nodes.iter().find_map(|node| match node {
        Node::Group(group) if group.id.as_deref() == Some(id) => Some(group),
        Node::Group(group) => find_group(&group.children, id),
        _ => None,
    })
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Group(group) => {
            let _ = write!(out, "{}<g", indent);
            if let Some(id) = &group.id {
                let _ = write!(out, r#" id="{}""#, escape(id));
            }
            if let Some(class) = &group.class {
                let _ = write!(out, r#" class="{}""#, escape(class));
            }
            if let Some((x, y)) = group.translate {
                let _ = write!(out, r#" transform="translate({},{})""#, num(x), num(y));
            }
            for (name, value) in &group.attrs {
                let _ = write!(out, r#" {}="{}""#, name, escape(value));
            }
            if group.children.is_empty() {
                out.push_str("/>\n");
                return;
            }
            out.push_str(">\n");
            for child in &group.children {
                write_node(out, child, depth + 1);
            }
            let _ = writeln!(out, "{}</g>", indent);
        }
        Node::Rect(rect) => {
            let _ = writeln!(
                out,
                r#"{}<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                indent,
                num(rect.x),
                num(rect.y),
                num(rect.width),
                num(rect.height),
                escape(&rect.fill)
            );
        }
        Node::Text(text) => {
            let _ = write!(out, r#"{}<text x="{}" y="{}""#, indent, num(text.x), num(text.y));
            if let Some(dy) = &text.dy {
                let _ = write!(out, r#" dy="{}""#, escape(dy));
            }
            if let Some(size) = text.font_size {
                let _ = write!(out, r#" font-size="{}""#, num(size));
            }
            if let Some(fill) = &text.fill {
                let _ = write!(out, r#" fill="{}""#, escape(fill));
            }
            let _ = writeln!(out, ">{}</text>", escape(&text.content));
        }
        Node::Line(line) => {
            let _ = writeln!(
                out,
                r#"{}<line x2="{}" y2="{}" stroke="{}"/>"#,
                indent,
                num(line.x2),
                num(line.y2),
                escape(&line.stroke)
            );
        }
        Node::Path(path) => {
            let _ = write!(out, "{}<path", indent);
            if let Some(class) = &path.class {
                let _ = write!(out, r#" class="{}""#, escape(class));
            }
            let _ = writeln!(
                out,
                r#" d="{}" stroke="{}"/>"#,
                escape(&path.d),
                escape(&path.stroke)
            );
        }
        Node::Dot(dot) => {
            let _ = writeln!(
                out,
                r#"{}<circle class="dot" cx="{}" cy="{}" r="{}" fill="{}" data-xvalue="{}" data-yvalue="{}" data-index="{}"/>"#,
                indent,
                num(dot.cx),
                num(dot.cy),
                num(dot.r),
                escape(&dot.fill),
                escape(&dot.x_value),
                escape(&dot.y_value),
                dot.record
            );
        }
    }
}

/// Format a coordinate with at most three decimals and no trailing zeros
pub fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Escape text for use in XML content and attribute values
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
