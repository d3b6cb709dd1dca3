pub mod model;
pub mod registry;
pub mod season;

pub use model::{splash_image, BuildRecord};
pub use registry::{BuildRegistry, BuildSnapshot};
pub use season::chapter_and_season;
