// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stage wiring shared by the `ltcscope` binary and its end-to-end tests.

pub mod pipeline;

pub use pipeline::{GithubSources, Pipeline, SourceProvider, StageName};
