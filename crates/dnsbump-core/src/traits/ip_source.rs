// # IP Source Trait
//
// Defines how the engine learns the caller's current public address.
//
// ## Implementations
//
// - HTTP "what is my IP" endpoint: `dnsbump-ip-http` crate

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for public IP discovery
///
/// The engine calls [`IpSource::current`] exactly once per run and reuses the
/// result for every zone and record, so one invocation never writes two
/// different addresses.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error::IpDiscovery)`: If the address could not be determined
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Short name for logging
    fn source_name(&self) -> &'static str;
}
