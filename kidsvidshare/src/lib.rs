//! KidsVidShare content core.
//!
//! Decides who may watch, upload and review family videos, and gates child
//! uploads behind a parental review step. Hosts plug in their own
//! authentication, media storage and database through the ports in
//! [`domain::ports`]; [`outbound::memory`] provides working in-memory
//! adapters.

pub mod domain;
pub mod outbound;
pub mod settings;
pub mod telemetry;
