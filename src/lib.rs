pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod paths;
pub mod playlist;
pub mod plex_rs;
pub mod ports;
pub mod services;

#[cfg(test)]
mod test_utils;
