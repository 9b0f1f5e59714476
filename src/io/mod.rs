pub mod audio;
pub mod transcript;

pub use audio::*;
pub use transcript::*;
