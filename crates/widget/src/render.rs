//! HTML/SVG templates for the two presentations.

use std::fmt::Write as _;

use formats::FeatureCollection;
use foundation::math::{LonLat, ProjectionKind};
use layers::{LayerKind, PathGenerator, Symbology, base_grid, fmt_num};

use crate::derive::DerivedGeometry;
use crate::error::LoadError;

pub const ROOT_CLASS: &str = "h3-map";
pub const LOADING_TEXT: &str = "Loading map…";

/// Placeholder shown while the element is loading.
pub fn render_placeholder(load_error: Option<&LoadError>) -> String {
    let mut html = format!("<div class=\"{ROOT_CLASS} loading\" role=\"status\">{LOADING_TEXT}");
    if let Some(err) = load_error {
        let _ = write!(
            html,
            "<p class=\"error\">Failed to load world geometry: {}</p>",
            escape_html(&err.to_string())
        );
    }
    html.push_str("</div>");
    html
}

/// Inputs of the map presentation.
pub struct MapView<'a> {
    pub projection_kind: ProjectionKind,
    pub derived: &'a DerivedGeometry,
    pub world: Option<&'a FeatureCollection>,
    pub symbology: &'a Symbology,
    /// Shown in the overlay when a reload failed after the map became ready.
    pub load_error: Option<&'a LoadError>,
}

pub fn render_map(view: &MapView<'_>) -> String {
    let derived = view.derived;
    let path = PathGenerator::new(&derived.projection);
    let [w, h] = derived.view_box;

    let mut html = format!("<div class=\"{ROOT_CLASS}\">");
    let _ = write!(html, "<style>{}</style>", view.symbology.to_css(&format!(".{ROOT_CLASS}")));
    let _ = write!(
        html,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"xMidYMid meet\">",
        fmt_num(w),
        fmt_num(h)
    );

    for kind in LayerKind::ALL {
        let _ = write!(html, "<g class=\"{}\">", kind.class_name());
        match kind {
            LayerKind::Outline => push_path(&mut html, None, None, Some(path.sphere())),
            LayerKind::BaseGrid => {
                for cell in base_grid() {
                    push_path(&mut html, None, Some(&cell.id()), path.polygon(&[cell.ring.clone()]));
                }
            }
            LayerKind::World => {
                for feature in view.world.map(|fc| fc.features.as_slice()).unwrap_or_default() {
                    push_path(&mut html, None, None, path.feature(feature));
                }
            }
            LayerKind::Areas => {
                for area in &derived.areas {
                    let class = if area.pentagon { "area pentagon" } else { "area" };
                    push_path(
                        &mut html,
                        Some(class),
                        Some(&area.id()),
                        path.polygon(&[area.ring.clone()]),
                    );
                }
            }
            LayerKind::BoundingCircle => {
                if let Some(circle) = &derived.bounding_circle {
                    push_path(&mut html, None, None, path.polygon(&[circle.clone()]));
                }
            }
        }
        html.push_str("</g>");
    }
    html.push_str("</svg>");
    push_info(&mut html, view);
    html.push_str("</div>");
    html
}

fn push_path(html: &mut String, class: Option<&str>, cell: Option<&str>, d: Option<String>) {
    let Some(d) = d else {
        return;
    };
    html.push_str("<path");
    if let Some(class) = class {
        let _ = write!(html, " class=\"{class}\"");
    }
    if let Some(cell) = cell {
        let _ = write!(html, " data-cell=\"{}\"", escape_html(cell));
    }
    let _ = write!(html, " d=\"{d}\"/>");
}

fn push_info(html: &mut String, view: &MapView<'_>) {
    let derived = view.derived;
    html.push_str("<div class=\"info\"><dl>");
    let _ = write!(
        html,
        "<dt>Projection</dt><dd>{}</dd>",
        escape_html(view.projection_kind.id())
    );
    let _ = write!(html, "<dt>Cells</dt><dd>{}</dd>", derived.areas.len());
    let _ = write!(html, "<dt>Pentagons</dt><dd>{}</dd>", derived.pentagon_count());
    let _ = write!(html, "<dt>Centroid</dt><dd>{}</dd>", format_centroid(derived.centroid));
    html.push_str("</dl>");
    if let Some(err) = view.load_error {
        let _ = write!(html, "<p class=\"error\">{}</p>", escape_html(&err.to_string()));
    }
    html.push_str("</div>");
}

pub fn format_centroid(centroid: Option<LonLat>) -> String {
    match centroid {
        Some(c) => format!("{:.4}°, {:.4}°", c.lat_deg, c.lon_deg),
        None => "—".to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wraps a rendered fragment in a standalone HTML page.
pub fn standalone_document(title: &str, fragment: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>body{{margin:0}} .{ROOT_CLASS} svg{{width:100vw;height:100vh;display:block}} \
         .{ROOT_CLASS} .info{{position:absolute;top:1rem;left:1rem;font:14px sans-serif;\
         background:rgba(255,255,255,0.85);padding:0.5rem 0.75rem}}</style>\n</head>\n<body>\n{fragment}\n</body>\n</html>\n",
        escape_html(title)
    )
}
