pub mod config {
    pub use wolfpack_core::config::*;
}
pub mod spatial_hash {
    pub use wolfpack_core::spatial_hash::*;
}
pub mod metrics {
    pub use wolfpack_core::metrics::*;
}

pub mod collaborators;
pub mod world;
