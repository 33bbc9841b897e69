//! Solution-finder quiz engine.
//!
//! A step wizard collects one answer per question, a static rule table turns
//! the answers into per-product points, and the ranked result is handed to
//! whichever presentation layer subscribed to the controller.

pub mod config;
pub mod error;
pub mod quiz;
pub mod telemetry;
