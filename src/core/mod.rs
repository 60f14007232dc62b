//! Core types, window functions, and the spectral transform.

pub mod fft;
pub mod stft;
pub mod types;
pub mod window;

pub use fft::*;
pub use stft::*;
pub use types::*;
pub use window::*;
