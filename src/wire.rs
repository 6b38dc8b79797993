//! Wire-type remapping: a response value can be deserialized off the wire in
//! a different shape than the caller-visible result type, then converted.
//! We express the "intermediate carrier, then convert to the final type"
//! idea as a small trait, `WireCarrier`, rather than a runtime-tagged tree:
//! the carrier <-> final relationship is known at the call site (the service
//! method declares both), so Rust's type system can check it instead of us
//! re-deriving it from a value at runtime.
//!
//! `Vec<C>` and `HashMap<String, C>` carry the remapping through list/map
//! containers recursively (map keys pass through unchanged).

use crate::error::ClientError;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// A value deserialized straight off the wire (the *carrier*) that converts,
/// possibly fallibly, into the caller-visible *final* type.
pub trait WireCarrier: for<'de> Deserialize<'de> {
    type Final;

    fn into_final(self) -> Result<Self::Final, ClientError>;
}

/// Carrier for `bytes` with wire type `BASE64URL`: a base64url(no-pad) string.
#[derive(Deserialize)]
#[serde(transparent)]
pub struct Base64UrlBytes(pub String);

impl WireCarrier for Base64UrlBytes {
    type Final = Vec<u8>;

    fn into_final(self) -> Result<Vec<u8>, ClientError> {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL;
        use base64::Engine;
        BASE64URL
            .decode(self.0.as_bytes())
            .map_err(|e| ClientError::serialization("wire::base64url", e))
    }
}

/// Carrier for `datetime` with wire type `RFC1123`, e.g.
/// `"Sun, 06 Nov 1994 08:49:37 GMT"`.
#[derive(Deserialize)]
#[serde(transparent)]
pub struct Rfc1123DateTime(pub String);

impl WireCarrier for Rfc1123DateTime {
    type Final = DateTime<Utc>;

    fn into_final(self) -> Result<DateTime<Utc>, ClientError> {
        DateTime::parse_from_rfc2822(&self.0)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ClientError::serialization("wire::rfc1123", e))
    }
}

/// Carrier for `datetime` with wire type `UNIX-EPOCH`: an integer number of
/// seconds since the epoch.
#[derive(Deserialize)]
#[serde(transparent)]
pub struct UnixEpochDateTime(pub i64);

impl WireCarrier for UnixEpochDateTime {
    type Final = DateTime<Utc>;

    fn into_final(self) -> Result<DateTime<Utc>, ClientError> {
        Utc.timestamp_opt(self.0, 0)
            .single()
            .ok_or_else(|| ClientError::serialization("wire::unix_epoch", InvalidEpoch(self.0)))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0} is not a valid unix epoch second count")]
struct InvalidEpoch(i64);

/// `list<E>` with wire `W`: deserialize as `list<remap(E,W)>`, then map each
/// element to `E`.
impl<C: WireCarrier> WireCarrier for Vec<C> {
    type Final = Vec<C::Final>;

    fn into_final(self) -> Result<Vec<C::Final>, ClientError> {
        self.into_iter().map(WireCarrier::into_final).collect()
    }
}

/// `map<K,V>` with wire `W`: same as `list`, over values only; keys pass
/// through.
impl<C: WireCarrier> WireCarrier for HashMap<String, C> {
    type Final = HashMap<String, C::Final>;

    fn into_final(self) -> Result<HashMap<String, C::Final>, ClientError> {
        self.into_iter()
            .map(|(k, v)| Ok((k, v.into_final()?)))
            .collect()
    }
}
