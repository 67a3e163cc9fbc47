pub mod membership;
pub mod plex;
pub mod sync;
