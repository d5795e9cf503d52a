pub mod convert;
pub mod info;

pub use convert::*;
pub use info::*;
