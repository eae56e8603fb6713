// emodul-api: Async Rust client for the TECH eModul cloud backend

pub mod client;
pub mod error;
pub mod models;
pub mod module;
pub mod session;
pub mod transport;

pub use client::ModuleClient;
pub use error::Error;
pub use models::{ControlRecord, ModuleData, Tile};
pub use session::{Credentials, SessionManager};
pub use transport::{TlsMode, TransportConfig};
