use thiserror::Error;

/// Failure classification for provider calls.
///
/// The variants are mutually exclusive and checked in order: an error
/// response from the provider, a request that produced no response at
/// all, then everything local. The display text is part of the wire
/// contract; the HTTP layer serializes it verbatim into the error
/// envelope.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider answered with a non-success status.
    #[error("Error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The request went out but no response came back.
    #[error("could not connect to the weather API")]
    Connection(#[source] reqwest::Error),

    /// Any other local failure: request construction, undecodable body.
    #[error("{0}")]
    Internal(String),
}
