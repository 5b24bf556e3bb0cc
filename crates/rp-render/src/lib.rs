pub mod hit;
pub mod paint;
pub mod scene;
pub mod svg;

pub use scene::{DisplayList, RenderState, Theme, build_display_list};
