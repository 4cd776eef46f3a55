// ABOUTME: Error types for the Tex Vision server crate
// ABOUTME: Re-exports the unified AppError system from tex-vision-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! Unified error handling
//!
//! `AppError` converts into an HTTP response with the status from its
//! `ErrorCode` and a JSON body of code and message.

pub use tex_vision_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
