pub mod decompose;
pub mod runner;
pub mod spec;

pub use decompose::*;
pub use runner::*;
pub use spec::*;
