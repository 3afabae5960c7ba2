//! HTTP Handlers

mod backup;
mod book;
mod ping;
mod timeline;
mod world;

pub use backup::*;
pub use book::*;
pub use ping::*;
pub use timeline::*;
pub use world::*;
