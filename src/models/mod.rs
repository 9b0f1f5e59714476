pub mod emotion;
pub mod range;
pub mod row;
pub mod rules;

pub use emotion::*;
pub use range::*;
pub use row::*;
pub use rules::*;
