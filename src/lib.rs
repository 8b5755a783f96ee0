//! Workspace-level test package for distcalc.
//!
//! Holds the golden integration tests under `tests/`; no library code.
