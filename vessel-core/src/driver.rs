use crate::{Connection, Result, WireType};
use std::fmt::Debug;

/// Entry point of a backend, opens connections to the store it was configured for.
///
/// Drivers are shared across threads by the `Database`, every connection they
/// open is confined to the thread that requested it.
pub trait Driver: Debug + Send + Sync {
    /// Human readable backend name, used in logs.
    fn name(&self) -> &'static str;

    /// Open a new connection, the caller owns it until `Connection::close`.
    fn connect(&self) -> Result<Box<dyn Connection>>;

    /// Wire types this driver knows how to bind and extract.
    fn wire_types(&self) -> &[WireType] {
        WireType::ALL
    }
}
