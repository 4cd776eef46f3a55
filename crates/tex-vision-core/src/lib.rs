// ABOUTME: Core types and constants for the Tex Vision athlete training platform
// ABOUTME: Foundation crate with error handling, drill and quiz models, constants, and body map
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![deny(unsafe_code)]

//! # Tex Vision Core
//!
//! Foundation crate providing shared types and constants for the Tex Vision
//! training platform. This crate changes infrequently so the rest of the
//! workspace benefits from incremental compilation.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Fatigue, difficulty, quiz and test constants organized by domain
//! - **models**: Drill identifiers, tiers, drill results, quiz payloads and persisted rows
//! - **`body_map`**: Static body-area and fascia-line reference tables

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (drills, results, quizzes, records)
pub mod models;

/// Static body-area labels and fascia-line educational content
pub mod body_map;
