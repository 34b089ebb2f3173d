pub mod artifact;
pub mod document;
pub mod enums;
pub mod requirement;

pub use artifact::*;
pub use document::*;
pub use enums::*;
pub use requirement::*;
