//! Audio file I/O: WAV and MP3 codecs, format dispatch.

pub mod format;
pub mod mp3;
pub mod wav;

pub use format::*;
pub use mp3::*;
pub use wav::*;
