//! The built-in 18-vertex course layout (700 × 700 canvas).

use crate::model::{GraphModel, Wall};

const VERTICES: &[(&str, f64, f64)] = &[
    ("v0", 50.0, 50.0),
    ("v1", 200.0, 50.0),
    ("v2", 350.0, 50.0),
    ("v3", 500.0, 50.0),
    ("v4", 650.0, 50.0),
    ("v5", 50.0, 200.0),
    ("v6", 200.0, 200.0),
    ("v7", 350.0, 200.0),
    ("v8", 500.0, 200.0),
    ("v9", 650.0, 200.0),
    ("v10", 200.0, 500.0),
    ("v11", 350.0, 500.0),
    ("v12", 500.0, 500.0),
    ("v13", 650.0, 500.0),
    ("v14", 50.0, 650.0),
    ("v15", 200.0, 650.0),
    ("v16", 500.0, 650.0),
    ("v17", 650.0, 650.0),
];

const EDGES: &[(&str, &str)] = &[
    ("v0", "v1"),
    ("v0", "v5"),
    ("v1", "v2"),
    ("v1", "v6"),
    ("v2", "v3"),
    ("v2", "v7"),
    ("v3", "v4"),
    ("v3", "v8"),
    ("v4", "v9"),
    ("v5", "v6"),
    ("v5", "v14"),
    ("v6", "v7"),
    ("v6", "v10"),
    ("v7", "v8"),
    ("v7", "v11"),
    ("v8", "v9"),
    ("v9", "v13"),
    ("v10", "v11"),
    ("v10", "v15"),
    ("v11", "v12"),
    ("v12", "v13"),
    ("v12", "v16"),
    ("v13", "v17"),
    ("v14", "v15"),
    ("v15", "v16"),
    ("v16", "v17"),
];

const WALLS: &[(f64, f64, f64, f64)] = &[
    (75.0, 75.0, 100.0, 100.0),
    (75.0, 225.0, 100.0, 400.0),
    (225.0, 75.0, 100.0, 100.0),
    (225.0, 525.0, 250.0, 100.0),
    (225.0, 225.0, 100.0, 250.0),
    (375.0, 225.0, 250.0, 250.0),
    (375.0, 75.0, 100.0, 100.0),
    (525.0, 75.0, 100.0, 100.0),
    (525.0, 525.0, 100.0, 100.0),
];

impl GraphModel {
    /// The reference course.
    ///
    /// # Panics
    ///
    /// Panics if the static declaration above is inconsistent. The layout
    /// is compiled-in configuration, so there is nothing to recover to.
    pub fn reference() -> Self {
        let walls = WALLS
            .iter()
            .map(|&(x, y, width, height)| Wall {
                x,
                y,
                width,
                height,
            })
            .collect();
        match GraphModel::build(VERTICES, EDGES, walls) {
            Ok(graph) => graph,
            Err(e) => panic!("reference grid is malformed: {e}"),
        }
    }
}
