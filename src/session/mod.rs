//! Session lifecycle: restore, probe, login, persist
//!
//! [`controller`] is the entry point; [`http`] is the transport seam,
//! [`probe`] the login-state detector and [`snapshot`] the serialized form.

pub mod controller;
pub mod http;
pub mod probe;
pub mod snapshot;

pub use controller::{Session, SessionGeneric, SessionState};
pub use http::{HttpCapability, ReqwestCapability};
pub use probe::{LoginProbe, ProbeStrategy};
pub use snapshot::{SNAPSHOT_KIND, SNAPSHOT_VERSION, SessionSnapshot};
