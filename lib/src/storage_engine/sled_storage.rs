// lib/src/storage_engine/sled_storage.rs

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use models::{Bookmark, NetId, Ride, RideFilter, RideUpdate, User};
use sled::transaction::{abort, ConflictableTransactionResult, TransactionalTree};
use sled::{Db, IVec, Transactional, Tree};
use uuid::Uuid;

use super::storage_engine::{
    BookmarkStorageEngine, RideStorageEngine, StorageEngine, UserStorageEngine,
};
use super::storage_utils::{
    bookmark_key, bookmark_prefix, deserialize_bookmark, deserialize_ride, deserialize_user,
    ride_bookmark_key, ride_key, serialize_bookmark, serialize_ride, serialize_user,
    sort_by_start, user_key,
};
use crate::errors::{Result, StorageError};

const RIDES_TREE: &str = "rides";
const USERS_TREE: &str = "users";
const BOOKMARKS_TREE: &str = "bookmarks";
const BOOKMARKS_BY_RIDE_TREE: &str = "bookmarks_by_ride";

/// Opens (or creates) the sled database at `path`.
pub fn open_sled_db<P: AsRef<Path>>(path: P) -> Result<Db> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)?;
    info!("Opening Sled database at {:?}", path);
    sled::open(path).map_err(|e| {
        StorageError::DatabaseError(format!("Failed to open Sled database at {:?}: {}", path, e))
    })
}

/// Persistent storage with one sled tree per record type.
///
/// Bookmarks are indexed twice: by owner in `bookmarks`, and by ride in
/// `bookmarks_by_ride` so deleting a ride can drop its bookmarks without a
/// full scan. Writes touching more than one tree run as a single sled
/// transaction.
#[derive(Debug, Clone)]
pub struct SledStorage {
    db: Db,
    rides: Tree,
    users: Tree,
    bookmarks: Tree,
    bookmarks_by_ride: Tree,
}

impl SledStorage {
    pub fn new(db: Db) -> Result<Self> {
        Ok(SledStorage {
            rides: db.open_tree(RIDES_TREE)?,
            users: db.open_tree(USERS_TREE)?,
            bookmarks: db.open_tree(BOOKMARKS_TREE)?,
            bookmarks_by_ride: db.open_tree(BOOKMARKS_BY_RIDE_TREE)?,
            db,
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(open_sled_db(path)?)
    }

    fn scan_rides<F>(&self, mut keep: F) -> Result<Vec<Ride>>
    where
        F: FnMut(&Ride) -> bool,
    {
        let mut rides = Vec::new();
        for item in self.rides.iter() {
            let (_key, value) = item?;
            let ride = deserialize_ride(&value)?;
            if keep(&ride) {
                rides.push(ride);
            }
        }
        Ok(rides)
    }

    /// Rewrites the stored ride with a compare-and-swap loop, retrying when
    /// another writer got in first. `change` returns `None` to leave the ride
    /// untouched. Returns the written ride, or `None` if the ride is missing or
    /// was left untouched.
    fn modify_ride<F>(&self, ride_id: &Uuid, mut change: F) -> Result<Option<Ride>>
    where
        F: FnMut(&Ride) -> Result<Option<Ride>>,
    {
        let key = ride_key(ride_id);
        loop {
            let Some(current) = self.rides.get(&key)? else {
                return Ok(None);
            };
            let Some(changed) = change(&deserialize_ride(&current)?)? else {
                return Ok(None);
            };
            let bytes = serialize_ride(&changed)?;
            match self.rides.compare_and_swap(&key, Some(&current), Some(bytes))? {
                Ok(()) => return Ok(Some(changed)),
                Err(_) => debug!("Ride {} changed concurrently, retrying", ride_id),
            }
        }
    }

    /// Index and owner keys of every bookmark currently pointing at `ride_id`.
    fn bookmark_keys_for(&self, ride_id: &Uuid) -> Result<Vec<(IVec, Vec<u8>)>> {
        let mut keys = Vec::new();
        for item in self.bookmarks_by_ride.scan_prefix(ride_key(ride_id)) {
            let (index_key, value) = item?;
            let bookmark = deserialize_bookmark(&value)?;
            keys.push((index_key, bookmark_key(&bookmark.net_id, ride_id)));
        }
        Ok(keys)
    }
}

fn remove_bookmarks(
    owners: &TransactionalTree,
    by_ride: &TransactionalTree,
    keys: &[(IVec, Vec<u8>)],
) -> ConflictableTransactionResult<(), StorageError> {
    for (index_key, owner_key) in keys {
        by_ride.remove(index_key.clone())?;
        owners.remove(owner_key.as_slice())?;
    }
    Ok(())
}

#[async_trait]
impl RideStorageEngine for SledStorage {
    async fn create_ride(&self, ride: &Ride) -> Result<()> {
        let bytes = serialize_ride(ride)?;
        self.rides
            .compare_and_swap(ride_key(&ride.ride_id), None as Option<&[u8]>, Some(bytes))?
            .map_err(|_| StorageError::AlreadyExists(format!("ride {}", ride.ride_id)))?;
        debug!("Stored ride {}", ride.ride_id);
        Ok(())
    }

    async fn get_ride(&self, ride_id: &Uuid) -> Result<Option<Ride>> {
        self.rides
            .get(ride_key(ride_id))?
            .map(|bytes| deserialize_ride(&bytes))
            .transpose()
    }

    async fn update_ride(&self, ride_id: &Uuid, update: &RideUpdate) -> Result<Ride> {
        self.modify_ride(ride_id, |ride| Ok(Some(ride.with_update(update.clone())?)))?
            .ok_or_else(|| StorageError::NotFound(format!("ride {}", ride_id)))
    }

    async fn delete_ride(&self, ride_id: &Uuid) -> Result<bool> {
        let key = ride_key(ride_id);
        let keys = self.bookmark_keys_for(ride_id)?;
        let existed = (&self.rides, &self.bookmarks, &self.bookmarks_by_ride).transaction(
            |(rides, owners, by_ride)| -> ConflictableTransactionResult<bool, StorageError> {
                remove_bookmarks(owners, by_ride, &keys)?;
                Ok(rides.remove(key.as_slice())?.is_some())
            },
        )?;

        // Bookmarks added between the scan and the delete. None can follow it,
        // since adding one checks for the ride inside its own transaction.
        let stragglers = self.bookmark_keys_for(ride_id)?;
        if !stragglers.is_empty() {
            debug!("Removing {} late bookmarks of ride {}", stragglers.len(), ride_id);
            (&self.bookmarks, &self.bookmarks_by_ride)
                .transaction(|(owners, by_ride)| remove_bookmarks(owners, by_ride, &stragglers))?;
        }
        Ok(existed)
    }

    async fn list_open_rides(&self, limit: usize) -> Result<Vec<Ride>> {
        let mut open = self.scan_rides(|ride| !ride.is_closed)?;
        sort_by_start(&mut open);
        open.truncate(limit);
        Ok(open)
    }

    async fn list_rides_by_owner(&self, net_id: &NetId) -> Result<Vec<Ride>> {
        let mut owned = self.scan_rides(|ride| !ride.is_closed && ride.is_owned_by(net_id))?;
        sort_by_start(&mut owned);
        owned.reverse();
        Ok(owned)
    }

    async fn find_filtered_rides(&self, filter: &RideFilter) -> Result<Vec<Ride>> {
        let mut matching = self.scan_rides(|ride| filter.matches(ride))?;
        sort_by_start(&mut matching);
        Ok(matching)
    }

    async fn close_ride(&self, ride_id: &Uuid) -> Result<bool> {
        let closed = self.modify_ride(ride_id, |ride| {
            let mut ride = ride.clone();
            ride.is_closed = true;
            Ok(Some(ride))
        })?;
        Ok(closed.is_some())
    }

    async fn close_expired_rides(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self.scan_rides(|ride| !ride.is_closed && ride.is_expired(now))?;
        let mut closed = 0;
        for candidate in &expired {
            let written = self.modify_ride(&candidate.ride_id, |ride| {
                if ride.is_closed || !ride.is_expired(now) {
                    return Ok(None);
                }
                let mut ride = ride.clone();
                ride.is_closed = true;
                Ok(Some(ride))
            })?;
            if written.is_some() {
                closed += 1;
            }
        }
        Ok(closed)
    }
}

#[async_trait]
impl UserStorageEngine for SledStorage {
    async fn get_user(&self, net_id: &NetId) -> Result<Option<User>> {
        self.users
            .get(user_key(net_id))?
            .map(|bytes| deserialize_user(&bytes))
            .transpose()
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let bytes = serialize_user(user)?;
        self.users
            .compare_and_swap(user_key(&user.net_id), None as Option<&[u8]>, Some(bytes))?
            .map_err(|_| StorageError::AlreadyExists(format!("user {}", user.net_id)))
    }
}

#[async_trait]
impl BookmarkStorageEngine for SledStorage {
    async fn toggle_bookmark(&self, net_id: &NetId, ride_id: &Uuid) -> Result<bool> {
        let key = ride_key(ride_id);
        let owner_key = bookmark_key(net_id, ride_id);
        let index_key = ride_bookmark_key(ride_id, net_id);
        let bytes = serialize_bookmark(&Bookmark::new(net_id.clone(), *ride_id))?;
        let added = (&self.rides, &self.bookmarks, &self.bookmarks_by_ride).transaction(
            |(rides, owners, by_ride)| -> ConflictableTransactionResult<bool, StorageError> {
                if owners.remove(owner_key.as_slice())?.is_some() {
                    by_ride.remove(index_key.as_slice())?;
                    return Ok(false);
                }
                if rides.get(key.as_slice())?.is_none() {
                    return abort(StorageError::NotFound(format!("ride {}", ride_id)));
                }
                owners.insert(owner_key.as_slice(), bytes.as_slice())?;
                by_ride.insert(index_key.as_slice(), bytes.as_slice())?;
                Ok(true)
            },
        )?;
        Ok(added)
    }

    async fn list_bookmarked_ride_ids(&self, net_id: &NetId) -> Result<Vec<Uuid>> {
        let mut bookmarks = Vec::new();
        for item in self.bookmarks.scan_prefix(bookmark_prefix(net_id)) {
            let (_key, value) = item?;
            bookmarks.push(deserialize_bookmark(&value)?);
        }
        bookmarks.sort_by_key(|bookmark| bookmark.created_at);
        Ok(bookmarks.into_iter().map(|bookmark| bookmark.ride_id).collect())
    }

    async fn list_bookmarked_rides(&self, net_id: &NetId) -> Result<Vec<Ride>> {
        let mut rides = Vec::new();
        for ride_id in self.list_bookmarked_ride_ids(net_id).await? {
            if let Some(ride) = self.get_ride(&ride_id).await? {
                rides.push(ride);
            }
        }
        sort_by_start(&mut rides);
        Ok(rides)
    }
}

#[async_trait]
impl StorageEngine for SledStorage {
    fn get_type(&self) -> &'static str {
        "Sled"
    }

    async fn flush(&self) -> Result<()> {
        let bytes = self.db.flush_async().await?;
        debug!("Flushed {} bytes to disk", bytes);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.bookmarks_by_ride.clear()?;
        self.bookmarks.clear()?;
        self.rides.clear()?;
        self.users.clear()?;
        self.flush().await?;
        info!("Sled storage reset");
        Ok(())
    }
}
