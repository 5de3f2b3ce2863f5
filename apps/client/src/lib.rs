//! LUMI client: data-access hooks over a remote store, the focus timer
//! driver and the view controller that ties them together.

pub mod app;
pub mod config;
pub mod error;
pub mod focus;
pub mod hooks;
pub mod store;

pub use app::{Action, LumiApp, Screen};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use focus::{FocusEvent, FocusEvents, FocusTimer};
pub use store::{HttpStore, MemoryStore, RemoteStore};
