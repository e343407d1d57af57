// lib/src/storage_engine/storage_engine.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use models::{NetId, Ride, RideFilter, RideUpdate, User};
use uuid::Uuid;

use crate::errors::{Result, StorageError};

#[async_trait]
pub trait RideStorageEngine: Send + Sync + 'static {
    /// Stores a new ride. Fails with `AlreadyExists` if the id is taken.
    async fn create_ride(&self, ride: &Ride) -> Result<()>;
    async fn get_ride(&self, ride_id: &Uuid) -> Result<Option<Ride>>;
    /// Applies `update` to the ride as currently stored and returns the
    /// result. Fields the update leaves out, including `is_closed`, keep their
    /// stored value. Fails with `NotFound` if the ride does not exist.
    async fn update_ride(&self, ride_id: &Uuid, update: &RideUpdate) -> Result<Ride>;
    /// Deletes a ride together with every bookmark pointing at it.
    /// Returns whether the ride existed.
    async fn delete_ride(&self, ride_id: &Uuid) -> Result<bool>;
    /// Up to `limit` open rides, earliest start first.
    async fn list_open_rides(&self, limit: usize) -> Result<Vec<Ride>>;
    /// Open rides posted by `net_id`, latest start first.
    async fn list_rides_by_owner(&self, net_id: &NetId) -> Result<Vec<Ride>>;
    /// Open rides passing the coarse filter, earliest start first.
    async fn find_filtered_rides(&self, filter: &RideFilter) -> Result<Vec<Ride>>;
    /// Marks a ride closed. Returns whether the ride existed.
    async fn close_ride(&self, ride_id: &Uuid) -> Result<bool>;
    /// Closes every open ride whose end time is before `now`.
    async fn close_expired_rides(&self, now: DateTime<Utc>) -> Result<usize>;
}

#[async_trait]
pub trait UserStorageEngine: Send + Sync + 'static {
    async fn get_user(&self, net_id: &NetId) -> Result<Option<User>>;
    /// Fails with `AlreadyExists` if a user with the same net id exists.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Returns the stored user for `user.net_id`, creating it on first sight.
    async fn find_or_create_user(&self, user: User) -> Result<User> {
        if let Some(existing) = self.get_user(&user.net_id).await? {
            return Ok(existing);
        }
        match self.create_user(&user).await {
            Ok(()) => {
                debug!("Created user {}", user.net_id);
                Ok(user)
            }
            // Lost a race with a concurrent first login.
            Err(StorageError::AlreadyExists(_)) => self
                .get_user(&user.net_id)
                .await?
                .ok_or_else(|| StorageError::NotFound(format!("user {}", user.net_id))),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
pub trait BookmarkStorageEngine: Send + Sync + 'static {
    /// Adds the bookmark if absent, removes it otherwise. Returns whether
    /// the ride is bookmarked afterwards. Adding a bookmark to a ride that
    /// does not exist fails with `NotFound`.
    async fn toggle_bookmark(&self, net_id: &NetId, ride_id: &Uuid) -> Result<bool>;
    async fn list_bookmarked_ride_ids(&self, net_id: &NetId) -> Result<Vec<Uuid>>;
    /// Bookmarked rides, closed ones included, earliest start first.
    async fn list_bookmarked_rides(&self, net_id: &NetId) -> Result<Vec<Ride>>;
}

#[async_trait]
pub trait StorageEngine: RideStorageEngine + UserStorageEngine + BookmarkStorageEngine {
    fn get_type(&self) -> &'static str;
    async fn flush(&self) -> Result<()>;
    /// Removes all rides, users and bookmarks.
    async fn reset(&self) -> Result<()>;
}
