pub mod market;
pub mod prediction;
pub mod sentiment;

pub use market::*;
pub use prediction::*;
pub use sentiment::*;
