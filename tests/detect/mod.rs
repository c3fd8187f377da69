//! End-to-end detection tests.
//!
//! Each test writes a synthetic binary to a temporary file and runs the
//! public API over it.

mod adversarial;
