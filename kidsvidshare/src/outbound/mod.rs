//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local adapters for every port, used by behaviour
//!   tests and by hosts that embed the core without a backing service.
//!
//! Adapters are thin translators between domain types and their storage.
//! They contain no policy or workflow logic.

pub mod memory;
