//! # Appservice Bridge Test Suite
//!
//! Cross-crate scenarios. Per-crate unit tests live next to the code.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs   # registration → gateway → bus
//!     └── http.rs    # router and live server, end to end
//! ```
//!
//! ```bash
//! cargo test -p as-tests
//! ```

pub mod integration;
