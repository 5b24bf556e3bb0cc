//! Display list → Vello drawing commands.

use crate::scene::{DisplayList, DrawItem, Rgba, Shape, StrokeStyle};
use kurbo::{Affine, BezPath, Cap, Circle, Join, Rect, Stroke as KurboStroke};
use peniko::{Color, Fill};
use vello::Scene;

/// Paint a display list into a Vello scene.
///
/// Call once per frame with a freshly-cleared `Scene`. The caller presents
/// the scene via wgpu.
pub fn paint_scene(scene: &mut Scene, list: &DisplayList) {
    let backdrop = Rect::new(0.0, 0.0, list.width, list.height);
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        to_color(list.background),
        None,
        &backdrop,
    );

    for item in &list.items {
        paint_item(scene, item);
    }
}

fn paint_item(scene: &mut Scene, item: &DrawItem) {
    match &item.shape {
        Shape::Rect(rect) => {
            fill_shape(scene, rect, item.fill);
            stroke_shape(scene, rect, item.stroke);
        }
        Shape::Circle { center, radius } => {
            let circle = Circle::new(*center, *radius);
            fill_shape(scene, &circle, item.fill);
            stroke_shape(scene, &circle, item.stroke);
        }
        Shape::Polyline(points) => {
            let Some((first, rest)) = points.split_first() else {
                return;
            };
            let mut bez = BezPath::new();
            bez.move_to(*first);
            for p in rest {
                bez.line_to(*p);
            }
            stroke_shape(scene, &bez, item.stroke);
        }
    }

    if let Some(label) = &item.label {
        log::trace!(
            "LABEL {:?} at ({}, {})",
            label.text,
            label.at.x,
            label.at.y
        );
        // Glyph runs need a font context; labels are drawn by the Canvas2D and SVG painters.
    }
}

fn fill_shape<S: kurbo::Shape>(scene: &mut Scene, shape: &S, fill: Option<Rgba>) {
    if let Some(color) = fill {
        scene.fill(Fill::NonZero, Affine::IDENTITY, to_color(color), None, shape);
    }
}

fn stroke_shape<S: kurbo::Shape>(scene: &mut Scene, shape: &S, stroke: Option<StrokeStyle>) {
    if let Some(stroke) = stroke {
        let vello_stroke = KurboStroke {
            width: stroke.width,
            join: Join::Round,
            start_cap: Cap::Round,
            end_cap: Cap::Round,
            ..Default::default()
        };
        scene.stroke(
            &vello_stroke,
            Affine::IDENTITY,
            to_color(stroke.color),
            None,
            shape,
        );
    }
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RenderState, Theme, build_display_list};
    use rp_core::{GraphModel, SelectionMode, SelectionStage};

    #[test]
    fn paints_reference_grid() {
        let g = GraphModel::reference();
        let state = RenderState {
            graph: &g,
            stage: SelectionStage::ChoosingStart,
            start: None,
            goal: None,
            candidates: &[],
            selected_candidate: None,
            confirmed: None,
            mode: SelectionMode::LineClick,
            connected: true,
        };
        let list = build_display_list(&state, &Theme::light());
        let mut scene = Scene::new();
        assert!(scene.encoding().is_empty());
        paint_scene(&mut scene, &list);
        assert!(!scene.encoding().is_empty());
    }

    #[test]
    fn empty_polyline_is_skipped() {
        let mut scene = Scene::new();
        let list = DisplayList {
            width: 10.0,
            height: 10.0,
            background: Rgba::rgb(255, 255, 255),
            items: vec![DrawItem {
                kind: crate::scene::ItemKind::ConfirmedRoute,
                shape: Shape::Polyline(Vec::new()),
                fill: None,
                stroke: None,
                label: None,
            }],
            legend: Vec::new(),
        };
        paint_scene(&mut scene, &list);
        assert!(!scene.encoding().is_empty());
    }
}
