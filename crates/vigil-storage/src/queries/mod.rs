// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the alert and metric tables.

pub mod alerts;
pub mod metrics;
