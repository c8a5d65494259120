//! Roleplay Trainer - Simulation & Evaluation Engine
//!
//! This crate drives scripted role-play exercises (simulated interviews and
//! presentations), scores free-text learner turns against a weighted rubric,
//! and compiles a certification verdict when a session ends.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
