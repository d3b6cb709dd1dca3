pub mod resolver;
pub mod scanner;
pub mod version_map;

pub use resolver::{shipping_executable, ResolvedVersion, VersionResolver};
