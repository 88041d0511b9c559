//! Reference host for the pack engines: a hecs world of wolves, prey and
//! settlements, advanced one tick at a time.

pub mod model;

pub use model::config::AppConfig;
pub use model::world::World;
