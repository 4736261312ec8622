//! reelgate: a media source lookup API and a streaming CORS proxy.
//!
//! `GET /api/stream` turns a movie or episode query into a typed
//! [`media::ScrapeMedia`] and asks the configured [`sources::MediaResolver`]
//! for a playable source. `/proxy?url=...` forwards requests to arbitrary
//! stream origins and rewrites the CORS headers on the way back.

pub mod common;
pub mod configs;
pub mod media;
pub mod server;
pub mod sources;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;
