//! Selection state → display list.
//!
//! The display list is a flat, back-to-front list of shapes with resolved
//! colours. Painters (`paint` for Vello, `svg` for export, the Canvas2D
//! bridge in `rp-wasm`) only walk it; they never look at selection state.

use kurbo::{Point, Rect};
use rp_core::{CandidateRoute, GraphModel, SelectionMode, SelectionStage, VertexId};

// ─── Colours & theme ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// `#RRGGBB` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }
}

pub struct Theme {
    pub background: Rgba,
    pub wall: Rgba,
    pub graph_edge: Rgba,
    pub vertex_fill: Rgba,
    pub outline: Rgba,
    pub text: Rgba,
    pub start: Rgba,
    pub goal: Rgba,
    pub marker_idle: Rgba,
    pub marker_removed: Rgba,
    pub confirmed_route: Rgba,
    pub disconnected: Rgba,
    /// Candidate colours by display index (wraps around).
    pub palette: [Rgba; 6],
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: Rgba::rgb(255, 255, 255),
            wall: Rgba::rgb(0, 0, 0),
            graph_edge: Rgba::rgb(200, 200, 200),
            vertex_fill: Rgba::rgb(255, 255, 255),
            outline: Rgba::rgb(0, 0, 0),
            text: Rgba::rgb(0, 0, 0),
            start: Rgba::rgb(0x32, 0xCD, 0x32),
            goal: Rgba::rgb(0xFF, 0xA5, 0x00),
            marker_idle: Rgba::rgb(0x96, 0x96, 0x96),
            marker_removed: Rgba::rgb(0xFF, 0x00, 0x00),
            confirmed_route: Rgba::rgb(0xFF, 0xFF, 0x00),
            disconnected: Rgba::rgb(0xB0, 0x00, 0x20),
            palette: [
                Rgba::rgb(0x1E, 0x90, 0xFF),
                Rgba::rgb(0xFF, 0x14, 0x93),
                Rgba::rgb(0x00, 0xCE, 0xD1),
                Rgba::rgb(0x8A, 0x2B, 0xE2),
                Rgba::rgb(0xFF, 0x8C, 0x00),
                Rgba::rgb(0x22, 0x8B, 0x22),
            ],
        }
    }

    pub fn candidate_color(&self, index: usize) -> Rgba {
        self.palette[index % self.palette.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

const VERTEX_RADIUS: f64 = 25.0;
const MARKER_RADIUS: f64 = 15.0;
const LEGEND_ORIGIN: Point = Point::new(8.0, 4.0);
const LEGEND_SIZE: (f64, f64) = (28.0, 18.0);
const LEGEND_GAP: f64 = 8.0;
const BANNER_HEIGHT: f64 = 20.0;

// ─── Display list ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Circle { center: Point, radius: f64 },
    Polyline(Vec<Point>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub at: Point,
    pub color: Rgba,
    pub size: f64,
}

/// What a draw item depicts; lets tests and hosts find items without
/// matching on geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Wall,
    GraphEdge,
    EdgeMarker,
    Candidate(usize),
    ConfirmedRoute,
    Vertex,
    Legend(usize),
    Banner,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub kind: ItemKind,
    pub shape: Shape,
    pub fill: Option<Rgba>,
    pub stroke: Option<StrokeStyle>,
    pub label: Option<Label>,
}

/// One clickable candidate control (ControlList mode).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendItem {
    pub index: usize,
    pub rect: Rect,
    pub color: Rgba,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub width: f64,
    pub height: f64,
    pub background: Rgba,
    pub items: Vec<DrawItem>,
    pub legend: Vec<LegendItem>,
}

impl DisplayList {
    pub fn items_of(&self, kind: ItemKind) -> impl Iterator<Item = &DrawItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }
}

// ─── Render state ────────────────────────────────────────────────────────

/// Read-only snapshot of everything the renderer draws.
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub graph: &'a GraphModel,
    pub stage: SelectionStage,
    pub start: Option<VertexId>,
    pub goal: Option<VertexId>,
    pub candidates: &'a [CandidateRoute],
    pub selected_candidate: Option<usize>,
    pub confirmed: Option<&'a CandidateRoute>,
    pub mode: SelectionMode,
    pub connected: bool,
}

/// Hit rectangles of the candidate controls, by display index.
pub fn legend_layout(count: usize) -> Vec<Rect> {
    let (w, h) = LEGEND_SIZE;
    (0..count)
        .map(|i| {
            let x = LEGEND_ORIGIN.x + i as f64 * (w + LEGEND_GAP);
            Rect::new(x, LEGEND_ORIGIN.y, x + w, LEGEND_ORIGIN.y + h)
        })
        .collect()
}

/// Canvas extent: the far edge of the outermost vertex or wall.
pub fn canvas_extent(graph: &GraphModel) -> (f64, f64) {
    let mut w: f64 = 0.0;
    let mut h: f64 = 0.0;
    for v in graph.vertices() {
        w = w.max(v.x + 2.0 * VERTEX_RADIUS);
        h = h.max(v.y + 2.0 * VERTEX_RADIUS);
    }
    for wall in graph.walls() {
        w = w.max(wall.x + wall.width);
        h = h.max(wall.y + wall.height);
    }
    (w, h)
}

/// Build the display list for one frame.
pub fn build_display_list(state: &RenderState<'_>, theme: &Theme) -> DisplayList {
    let graph = state.graph;
    let (width, height) = canvas_extent(graph);
    let mut items = Vec::new();

    for wall in graph.walls() {
        items.push(DrawItem {
            kind: ItemKind::Wall,
            shape: Shape::Rect(Rect::new(
                wall.x,
                wall.y,
                wall.x + wall.width,
                wall.y + wall.height,
            )),
            fill: Some(theme.wall),
            stroke: None,
            label: None,
        });
    }

    for edge in graph.edges() {
        let (Some(a), Some(b)) = (graph.vertex(edge.key.a()), graph.vertex(edge.key.b())) else {
            continue;
        };
        let color = if edge.removed {
            theme.marker_removed.with_alpha(90)
        } else {
            theme.graph_edge
        };
        items.push(DrawItem {
            kind: ItemKind::GraphEdge,
            shape: Shape::Polyline(vec![Point::new(a.x, a.y), Point::new(b.x, b.y)]),
            fill: None,
            stroke: Some(StrokeStyle { color, width: 2.0 }),
            label: None,
        });
    }

    for edge in graph.edges() {
        items.push(DrawItem {
            kind: ItemKind::EdgeMarker,
            shape: Shape::Circle {
                center: Point::new(edge.midpoint.0, edge.midpoint.1),
                radius: MARKER_RADIUS,
            },
            fill: Some(if edge.removed {
                theme.marker_removed
            } else {
                theme.marker_idle
            }),
            stroke: Some(StrokeStyle {
                color: theme.outline,
                width: 2.0,
            }),
            label: None,
        });
    }

    let mut legend = Vec::new();
    if let Some(route) = state.confirmed {
        items.extend(route_items(
            graph,
            route,
            ItemKind::ConfirmedRoute,
            theme.confirmed_route,
            5.0,
        ));
    } else if state.stage == SelectionStage::DisambiguatingCandidates {
        push_candidates(state, theme, &mut items);
        if state.mode == SelectionMode::ControlList {
            legend = push_legend(state, theme, &mut items);
        }
    }

    for v in graph.vertices() {
        let fill = if Some(v.id) == state.start {
            theme.start
        } else if Some(v.id) == state.goal {
            theme.goal
        } else {
            theme.vertex_fill
        };
        items.push(DrawItem {
            kind: ItemKind::Vertex,
            shape: Shape::Circle {
                center: Point::new(v.x, v.y),
                radius: VERTEX_RADIUS,
            },
            fill: Some(fill),
            stroke: Some(StrokeStyle {
                color: theme.outline,
                width: 2.0,
            }),
            label: Some(Label {
                text: v.id.as_str().to_string(),
                at: Point::new(v.x, v.y),
                color: theme.text,
                size: 20.0,
            }),
        });
    }

    if !state.connected {
        items.push(DrawItem {
            kind: ItemKind::Banner,
            shape: Shape::Rect(Rect::new(0.0, height - BANNER_HEIGHT, width, height)),
            fill: Some(theme.disconnected),
            stroke: None,
            label: Some(Label {
                text: "route service disconnected".to_string(),
                at: Point::new(width / 2.0, height - BANNER_HEIGHT / 2.0),
                color: Rgba::rgb(255, 255, 255),
                size: 14.0,
            }),
        });
    }

    log::trace!(
        "display list: {} items, {} legend controls ({:?}, {:?})",
        items.len(),
        legend.len(),
        state.stage,
        state.mode
    );

    DisplayList {
        width,
        height,
        background: theme.background,
        items,
        legend,
    }
}

fn push_candidates(state: &RenderState<'_>, theme: &Theme, items: &mut Vec<DrawItem>) {
    // Unselected first so the selected route is drawn on top.
    let order = (0..state.candidates.len())
        .filter(|i| Some(*i) != state.selected_candidate)
        .chain(state.selected_candidate);
    for i in order {
        let Some(route) = state.candidates.get(i) else {
            continue;
        };
        let selected = Some(i) == state.selected_candidate;
        let base = theme.candidate_color(i);
        let (color, width) = match (state.mode, selected) {
            (_, true) => (base, 7.0),
            (SelectionMode::LineClick, false) => (base, 4.0),
            (SelectionMode::ControlList, false) => (base.with_alpha(70), 3.0),
        };
        items.extend(route_items(
            state.graph,
            route,
            ItemKind::Candidate(i),
            color,
            width,
        ));
    }
}

fn push_legend(
    state: &RenderState<'_>,
    theme: &Theme,
    items: &mut Vec<DrawItem>,
) -> Vec<LegendItem> {
    legend_layout(state.candidates.len())
        .into_iter()
        .enumerate()
        .map(|(index, rect)| {
            let selected = Some(index) == state.selected_candidate;
            let color = theme.candidate_color(index);
            items.push(DrawItem {
                kind: ItemKind::Legend(index),
                shape: Shape::Rect(rect),
                fill: Some(color),
                stroke: Some(StrokeStyle {
                    color: theme.outline,
                    width: if selected { 3.0 } else { 1.0 },
                }),
                label: Some(Label {
                    text: (index + 1).to_string(),
                    at: rect.center(),
                    color: Rgba::rgb(255, 255, 255),
                    size: 12.0,
                }),
            });
            LegendItem {
                index,
                rect,
                color,
                selected,
            }
        })
        .collect()
}

/// One polyline per run of known vertices. A label missing from the graph
/// breaks the route; runs shorter than two points are not drawn.
fn route_items(
    graph: &GraphModel,
    route: &CandidateRoute,
    kind: ItemKind,
    color: Rgba,
    width: f64,
) -> Vec<DrawItem> {
    let mut runs: Vec<Vec<Point>> = vec![Vec::new()];
    for id in route.vertices() {
        match graph.vertex(*id) {
            Some(v) => {
                if let Some(run) = runs.last_mut() {
                    run.push(Point::new(v.x, v.y));
                }
            }
            None => {
                log::warn!("route vertex {id} is not on the grid; splitting the line");
                runs.push(Vec::new());
            }
        }
    }
    runs.into_iter()
        .filter(|run| run.len() >= 2)
        .map(|points| DrawItem {
            kind,
            shape: Shape::Polyline(points),
            fill: None,
            stroke: Some(StrokeStyle { color, width }),
            label: None,
        })
        .collect()
}
