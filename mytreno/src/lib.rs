//! ViaggiaTreno polling service.
//!
//! Polls the Trenitalia ViaggiaTreno API for station departure/arrival
//! boards and for the live status of tracked trains, and exposes the
//! latest readings as sensors over HTTP.

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod registry;
pub mod viaggiatreno;
pub mod web;
