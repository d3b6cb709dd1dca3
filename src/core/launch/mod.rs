pub mod process;
pub mod session;

pub use process::{kill_game_processes, spawn_build};
pub use session::{mark_closed, BuildLauncher};
