//! Periodicity analysis: beat spectrum, period selection, artifacts.

pub mod artifact;
pub mod beat_spectrum;
pub mod period;

pub use artifact::*;
pub use beat_spectrum::*;
pub use period::*;
