/// Remote service module
///
/// This module handles:
/// - The typed wire model of the planetary/apod response (response.rs)
/// - The async service trait and its reqwest client (client.rs)

pub mod client;
pub mod response;

pub use client::{ApiError, ApodClient, ApodService, BASE_URL};
pub use response::ApodResponse;
