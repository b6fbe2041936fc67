//! musify - catalog browsing core for a music streaming client
//!
//! Screen controllers fan out concurrent catalog requests, reconcile their
//! outcomes into a single screen state and expose paged result sessions.

pub mod auth;
pub mod config;
pub mod controller;
pub mod greeting;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod paging;
pub mod reconciler;
pub mod repository;

#[cfg(test)]
mod testing;
