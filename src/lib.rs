// ABOUTME: Main library entry point for the Tex Vision training server
// ABOUTME: Vision drill engines, session orchestration, wellness quizzes, storage and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![deny(unsafe_code)]

//! # Tex Vision
//!
//! Vision training drills and daily wellness check-ins for youth athletes.
//!
//! ## Architecture
//!
//! - **Drills**: deterministic, clock-driven engines for sixteen vision drills
//! - **Session**: the instructions, countdown, play, reflection, conclusion
//!   and break flow around one drill, with fatigue and adaptive difficulty
//! - **Quiz**: wellness quiz form state and submission
//! - **Database**: wellness, weight and coach-override storage (memory or `SQLite`)
//! - **Routes**: the axum HTTP surface
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tex_vision::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Tex Vision configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Environment and session configuration
pub mod config;

/// Wellness storage backends
pub mod database;

/// Drill engines and the drill registry
pub mod drills;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Wellness quiz form and submission
pub mod quiz;

/// Shared server state
pub mod resources;

/// HTTP routes
pub mod routes;

/// HTTP server bootstrap
pub mod server;

/// Drill session orchestration
pub mod session;
