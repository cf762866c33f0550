pub mod catalog;
pub mod category;
pub mod product;

pub use catalog::*;
pub use category::*;
pub use product::*;
