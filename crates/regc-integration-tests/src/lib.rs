//! End-to-end scenarios for the registry engine live in `tests/`.
//! This crate intentionally exports nothing.
