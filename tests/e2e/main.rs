//! End-to-end tests for the `parprog` binary.
//!
//! These run the real executable in `--plain` mode, so no terminal is
//! needed.
//!
//! ```sh
//! cargo test --test e2e
//! ```

mod harness;

mod cli;
mod errors;
