// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Architecture specific support code
//! OWNERS: @port-arch-team
//! PUBLIC API: arch backends under `arch::<isa>`
//! INVARIANTS: Keep per-arch code isolated behind module boundaries

pub mod cortex_m;
