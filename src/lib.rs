//! Roster - command-line client for the Roster workforce-management API.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── auth/         # login, manage, add, list, rm, check
//! │   ├── completions   # Shell completions
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── api           # Remote API liveness probe
//!     ├── config        # ~/.roster/config.toml
//!     ├── domain/       # Token, Credentials, SetupResult
//!     ├── handshake/    # Loopback browser handshake server
//!     ├── ratelimit     # Fixed-window keyed rate limiter
//!     ├── store/        # Credential storage backends
//!     └── validation    # Account name and token checks
//! ```

pub mod cli;
pub mod core;
pub mod error;
