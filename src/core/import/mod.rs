pub mod session;
pub mod workflow;

pub use session::{ImportSession, ImportStatus};
pub use workflow::{register_build, BuildImporter};
