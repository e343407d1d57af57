// lib/src/storage_engine/storage_utils.rs

use bincode::config::{self, BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use models::{Bookmark, NetId, Ride, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::Result;

/// Separates the net id from the ride id in bookmark keys. Net ids never
/// contain a NUL byte.
const KEY_SEPARATOR: u8 = 0;

/// Provides a standard bincode configuration.
pub fn bincode_config() -> Configuration<BigEndian, Fixint> {
    config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(encode_to_vec(value, bincode_config())?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _read) = decode_from_slice(bytes, bincode_config())?;
    Ok(value)
}

pub fn serialize_ride(ride: &Ride) -> Result<Vec<u8>> {
    encode(ride)
}

pub fn deserialize_ride(bytes: &[u8]) -> Result<Ride> {
    decode(bytes)
}

pub fn serialize_user(user: &User) -> Result<Vec<u8>> {
    encode(user)
}

pub fn deserialize_user(bytes: &[u8]) -> Result<User> {
    decode(bytes)
}

pub fn serialize_bookmark(bookmark: &Bookmark) -> Result<Vec<u8>> {
    encode(bookmark)
}

pub fn deserialize_bookmark(bytes: &[u8]) -> Result<Bookmark> {
    decode(bytes)
}

pub fn ride_key(ride_id: &Uuid) -> Vec<u8> {
    ride_id.as_bytes().to_vec()
}

pub fn user_key(net_id: &NetId) -> Vec<u8> {
    net_id.as_bytes().to_vec()
}

/// Prefix of every bookmark key owned by `net_id`.
pub fn bookmark_prefix(net_id: &NetId) -> Vec<u8> {
    let mut key = Vec::with_capacity(net_id.len() + 1);
    key.extend_from_slice(net_id.as_bytes());
    key.push(KEY_SEPARATOR);
    key
}

/// `net_id \0 ride_id`, so a user's bookmarks share a prefix.
pub fn bookmark_key(net_id: &NetId, ride_id: &Uuid) -> Vec<u8> {
    let mut key = bookmark_prefix(net_id);
    key.extend_from_slice(ride_id.as_bytes());
    key
}

/// `ride_id net_id`, so a ride's bookmarks can be found when it is deleted.
pub fn ride_bookmark_key(ride_id: &Uuid, net_id: &NetId) -> Vec<u8> {
    let mut key = ride_key(ride_id);
    key.extend_from_slice(net_id.as_bytes());
    key
}

/// Orders rides by start time, then by id so listings are stable.
pub fn sort_by_start(rides: &mut [Ride]) {
    rides.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.ride_id.cmp(&b.ride_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn bookmark_keys_share_the_owner_prefix() {
        let net_id = NetId::new("abc12".to_string()).unwrap();
        let ride_id = Uuid::new_v4();
        let key = bookmark_key(&net_id, &ride_id);
        assert!(key.starts_with(&bookmark_prefix(&net_id)));
        assert_eq!(&key[key.len() - 16..], ride_id.as_bytes());

        // "abc1" must not match bookmarks of "abc12".
        let shorter = NetId::new("abc1".to_string()).unwrap();
        assert!(!key.starts_with(&bookmark_prefix(&shorter)));
    }

    #[test]
    fn user_survives_bincode() {
        let user = User {
            net_id: NetId::new("ts123".to_string()).unwrap(),
            name: "Test User".to_string(),
            email: "test.user@yale.edu".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        };
        let bytes = serialize_user(&user).unwrap();
        assert_eq!(deserialize_user(&bytes).unwrap(), user);
        assert!(deserialize_user(&bytes[..3]).is_err());
    }
}
