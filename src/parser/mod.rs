pub mod classify;
pub mod document;
pub mod extract;
pub mod paths;

pub use document::Document;
pub use extract::Context;
pub use paths::Paths;
