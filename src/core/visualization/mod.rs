//! Visualization support
//!
//! Reduces long curves to a displayable number of points and renders an
//! overview image of an analysis.

mod plot;
mod sampler;

pub use plot::{render_overview, PlotConfig};
pub use sampler::{downsample, DEFAULT_POINTS};
