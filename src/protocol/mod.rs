//! Wire protocol of the external agent backend.
//!
//! The backend owns the session state machine and the audio pipeline; this
//! crate only registers a pipeline, reacts to session events, and issues
//! speech. The event enums here are the full surface it consumes.

pub mod client_events;
pub mod models;
pub mod server_events;
