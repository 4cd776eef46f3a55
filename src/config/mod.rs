// ABOUTME: Configuration management for the server process and drill sessions
// ABOUTME: Environment-driven settings with typed defaults and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! Configuration module for Tex Vision
//!
//! - **Environment**: server port, database URL and data directory
//! - **Session**: countdown and break lengths, fatigue constants, completion minima

/// Server configuration from environment variables
pub mod environment;

/// Drill session tuning
pub mod session;

pub use environment::ServerConfig;
pub use session::{ConfigError, SessionConfig};
