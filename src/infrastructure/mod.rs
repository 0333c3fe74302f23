//! Infrastructure concerns that sit outside the domain: configuration and
//! logging.

pub mod config;
pub mod logging;
