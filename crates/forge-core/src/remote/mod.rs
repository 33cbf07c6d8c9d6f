//! Clients for the two serverless endpoints the core depends on:
//! the unauthenticated time authority and the bearer-token day-timer check.

pub mod authority;
pub mod daycheck;

pub use authority::{CanonicalTimeResponse, TimeAuthorityClient};
pub use daycheck::{DayCheckClient, DayCheckResponse};
