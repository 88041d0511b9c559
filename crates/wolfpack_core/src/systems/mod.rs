//! Pack engines: social hierarchy, coordinated hunting, territory and siege.

pub mod hunting;
pub mod siege;
pub mod social;
pub mod territory;
