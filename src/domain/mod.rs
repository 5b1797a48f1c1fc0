pub mod announcement;
pub mod filter;

pub use announcement::*;
pub use filter::*;
