//! Integration tests against the public API.
//!
//! Tests in this module set up `pretty_env_logger`; use `RUST_LOG=debug` to
//! see its output.

mod recursion;
mod testdata;
