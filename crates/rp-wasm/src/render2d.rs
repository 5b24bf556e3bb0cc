//! Canvas2D painter.
//!
//! Walks a display list and draws it to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`.

use rp_render::scene::{DisplayList, DrawItem, Label, Shape};
use web_sys::CanvasRenderingContext2d;

/// Paint the whole display list, background first.
pub fn render_display_list(ctx: &CanvasRenderingContext2d, list: &DisplayList) {
    ctx.set_fill_style_str(&list.background.to_css());
    ctx.fill_rect(0.0, 0.0, list.width, list.height);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    for item in &list.items {
        draw_item(ctx, item);
    }
}

fn draw_item(ctx: &CanvasRenderingContext2d, item: &DrawItem) {
    ctx.begin_path();
    match &item.shape {
        Shape::Rect(r) => ctx.rect(r.x0, r.y0, r.width(), r.height()),
        Shape::Circle { center, radius } => {
            let _ = ctx.arc(center.x, center.y, *radius, 0.0, std::f64::consts::TAU);
        }
        Shape::Polyline(points) => {
            let Some((first, rest)) = points.split_first() else {
                return;
            };
            ctx.move_to(first.x, first.y);
            for p in rest {
                ctx.line_to(p.x, p.y);
            }
        }
    }

    // Polylines are stroke-only.
    if let (Some(fill), false) = (item.fill, matches!(item.shape, Shape::Polyline(_))) {
        ctx.set_fill_style_str(&fill.to_css());
        ctx.fill();
    }
    if let Some(stroke) = item.stroke {
        ctx.set_stroke_style_str(&stroke.color.to_css());
        ctx.set_line_width(stroke.width);
        ctx.stroke();
    }
    if let Some(label) = &item.label {
        draw_label(ctx, label);
    }
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &Label) {
    ctx.set_font(&format!("600 {}px system-ui, sans-serif", label.size));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str(&label.color.to_css());
    let _ = ctx.fill_text(&label.text, label.at.x, label.at.y);
}
