use crate::scene::{DisplayList, DrawItem, Label, Shape, StrokeStyle};
use std::fmt::Write;

/// Export a display list as a standalone SVG document.
pub fn render_svg(list: &DisplayList) -> String {
    let (w, h) = (list.width, list.height);
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );
    let _ = writeln!(
        svg,
        "  <rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{}\"/>",
        list.background.to_css()
    );
    for item in &list.items {
        write_item(&mut svg, item);
    }
    svg.push_str("</svg>\n");
    svg
}

fn write_item(svg: &mut String, item: &DrawItem) {
    let fill = item
        .fill
        .map(|c| c.to_css())
        .unwrap_or_else(|| "none".to_string());
    let stroke = stroke_attrs(item.stroke);
    match &item.shape {
        Shape::Rect(r) => {
            let _ = writeln!(
                svg,
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{fill}\"{stroke}/>",
                r.x0,
                r.y0,
                r.width(),
                r.height()
            );
        }
        Shape::Circle { center, radius } => {
            let _ = writeln!(
                svg,
                "  <circle cx=\"{}\" cy=\"{}\" r=\"{radius}\" fill=\"{fill}\"{stroke}/>",
                center.x, center.y
            );
        }
        Shape::Polyline(points) => {
            if points.is_empty() {
                return;
            }
            let coords: Vec<String> = points.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
            let _ = writeln!(
                svg,
                "  <polyline points=\"{}\" fill=\"none\"{stroke} stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
                coords.join(" ")
            );
        }
    }
    if let Some(label) = &item.label {
        write_label(svg, label);
    }
}

fn stroke_attrs(stroke: Option<StrokeStyle>) -> String {
    match stroke {
        Some(s) => format!(" stroke=\"{}\" stroke-width=\"{}\"", s.color.to_css(), s.width),
        None => String::new(),
    }
}

fn write_label(svg: &mut String, label: &Label) {
    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
        label.at.x,
        label.at.y,
        label.size,
        label.color.to_css(),
        escape(&label.text)
    );
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RenderState, Theme, build_display_list};
    use rp_core::{CandidateRoute, GraphModel, SelectionMode, SelectionStage, VertexId};

    #[test]
    fn svg_contains_graph_and_route() {
        let g = GraphModel::reference();
        let route = CandidateRoute::from_labels(&["v0", "v5", "v6"]);
        let state = RenderState {
            graph: &g,
            stage: SelectionStage::Confirmed,
            start: Some(VertexId::intern("v0")),
            goal: Some(VertexId::intern("v6")),
            candidates: std::slice::from_ref(&route),
            selected_candidate: Some(0),
            confirmed: Some(&route),
            mode: SelectionMode::LineClick,
            connected: true,
        };
        let svg = render_svg(&build_display_list(&state, &Theme::light()));
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 18 + 26);
        assert!(svg.contains("points=\"50,50 50,200 200,200\""));
        assert!(svg.contains(">v17</text>"));
        assert!(svg.contains("fill=\"#32CD32\""));
    }

    #[test]
    fn label_text_is_escaped() {
        assert_eq!(escape("a<b&c"), "a&lt;b&amp;c");
    }
}
