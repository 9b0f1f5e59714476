pub mod classify;
pub mod consolidate;
pub mod edit;
pub mod split;

pub use classify::*;
pub use consolidate::*;
pub use edit::*;
pub use split::*;
