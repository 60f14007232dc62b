//! Background/foreground separation: model, masks, and the pipeline.

pub mod mask;
pub mod model;
pub mod pipeline;

pub use mask::*;
pub use model::*;
pub use pipeline::*;
