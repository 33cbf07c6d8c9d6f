pub mod checkin;
pub mod config;
pub mod daycheck;
pub mod punishment;
pub mod stats;
pub mod time;

use forge_core::remote::TimeAuthorityClient;
use forge_core::storage::Config;
use forge_core::time::TimeState;

/// Fetch the canonical time from the authority endpoint.
///
/// Day-number decisions must come from the server, so there is no local
/// fallback here: if the authority is unreachable the caller reports the
/// error instead of guessing from the local clock.
pub fn fetch_canonical_time(config: &Config) -> Result<TimeState, Box<dyn std::error::Error>> {
    let client = TimeAuthorityClient::new(&config.endpoints.time_authority_url)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let state = runtime.block_on(client.fetch())?;
    Ok(state)
}
