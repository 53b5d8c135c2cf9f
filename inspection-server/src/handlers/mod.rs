//! HTTP handlers

pub mod health;
pub mod inspect;
pub mod alerts;
pub mod scoring;
pub mod notifications;
pub mod models;
