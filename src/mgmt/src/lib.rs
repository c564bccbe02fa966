// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core types shared by the Azure Resource Manager client runtime.
//!
//! This crate contains the error type, the response wrapper, and the
//! per-operation request options used by the higher level crates. Most
//! applications consume these types indirectly, through
//! `azure-mgmt-lro` or a service client built on top of it.

/// A `Result` alias where the `Err` case is [error::Error].
pub type Result<T> = std::result::Result<T, crate::error::Error>;

pub mod error;
pub mod options;
pub mod response;
