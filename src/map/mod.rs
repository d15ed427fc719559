mod geometry;
mod projection;
mod renderer;

pub use projection::{GeoBounds, Viewport};
pub use renderer::{hit_test, render_markers, MarkerLayer};
