// lib/src/storage_engine/inmemory_storage.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use models::{Bookmark, NetId, Ride, RideFilter, RideUpdate, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::storage_engine::{
    BookmarkStorageEngine, RideStorageEngine, StorageEngine, UserStorageEngine,
};
use super::storage_utils::sort_by_start;
use crate::errors::{Result, StorageError};

/// Volatile storage for tests and local development.
///
/// Methods needing both maps lock `rides` before `bookmarks`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    rides: Arc<RwLock<HashMap<Uuid, Ride>>>,
    users: Arc<RwLock<HashMap<NetId, User>>>,
    bookmarks: Arc<RwLock<HashMap<(NetId, Uuid), Bookmark>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RideStorageEngine for InMemoryStorage {
    async fn create_ride(&self, ride: &Ride) -> Result<()> {
        let mut rides = self.rides.write().await;
        if rides.contains_key(&ride.ride_id) {
            return Err(StorageError::AlreadyExists(format!("ride {}", ride.ride_id)));
        }
        rides.insert(ride.ride_id, ride.clone());
        Ok(())
    }

    async fn get_ride(&self, ride_id: &Uuid) -> Result<Option<Ride>> {
        Ok(self.rides.read().await.get(ride_id).cloned())
    }

    async fn update_ride(&self, ride_id: &Uuid, update: &RideUpdate) -> Result<Ride> {
        let mut rides = self.rides.write().await;
        let stored = rides
            .get_mut(ride_id)
            .ok_or_else(|| StorageError::NotFound(format!("ride {}", ride_id)))?;
        *stored = stored.with_update(update.clone())?;
        Ok(stored.clone())
    }

    async fn delete_ride(&self, ride_id: &Uuid) -> Result<bool> {
        let mut rides = self.rides.write().await;
        let mut bookmarks = self.bookmarks.write().await;
        bookmarks.retain(|(_, bookmarked), _| bookmarked != ride_id);
        Ok(rides.remove(ride_id).is_some())
    }

    async fn list_open_rides(&self, limit: usize) -> Result<Vec<Ride>> {
        let mut open: Vec<Ride> = self
            .rides
            .read()
            .await
            .values()
            .filter(|ride| !ride.is_closed)
            .cloned()
            .collect();
        sort_by_start(&mut open);
        open.truncate(limit);
        Ok(open)
    }

    async fn list_rides_by_owner(&self, net_id: &NetId) -> Result<Vec<Ride>> {
        let mut owned: Vec<Ride> = self
            .rides
            .read()
            .await
            .values()
            .filter(|ride| !ride.is_closed && ride.is_owned_by(net_id))
            .cloned()
            .collect();
        sort_by_start(&mut owned);
        owned.reverse();
        Ok(owned)
    }

    async fn find_filtered_rides(&self, filter: &RideFilter) -> Result<Vec<Ride>> {
        let mut matching: Vec<Ride> = self
            .rides
            .read()
            .await
            .values()
            .filter(|ride| filter.matches(ride))
            .cloned()
            .collect();
        sort_by_start(&mut matching);
        Ok(matching)
    }

    async fn close_ride(&self, ride_id: &Uuid) -> Result<bool> {
        let mut rides = self.rides.write().await;
        Ok(match rides.get_mut(ride_id) {
            Some(ride) => {
                ride.is_closed = true;
                true
            }
            None => false,
        })
    }

    async fn close_expired_rides(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut rides = self.rides.write().await;
        let mut closed = 0;
        for ride in rides.values_mut() {
            if !ride.is_closed && ride.is_expired(now) {
                ride.is_closed = true;
                closed += 1;
            }
        }
        Ok(closed)
    }
}

#[async_trait]
impl UserStorageEngine for InMemoryStorage {
    async fn get_user(&self, net_id: &NetId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(net_id).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.net_id) {
            return Err(StorageError::AlreadyExists(format!("user {}", user.net_id)));
        }
        users.insert(user.net_id.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl BookmarkStorageEngine for InMemoryStorage {
    async fn toggle_bookmark(&self, net_id: &NetId, ride_id: &Uuid) -> Result<bool> {
        let rides = self.rides.read().await;
        let mut bookmarks = self.bookmarks.write().await;
        let key = (net_id.clone(), *ride_id);
        if bookmarks.remove(&key).is_some() {
            return Ok(false);
        }
        if !rides.contains_key(ride_id) {
            return Err(StorageError::NotFound(format!("ride {}", ride_id)));
        }
        bookmarks.insert(key, Bookmark::new(net_id.clone(), *ride_id));
        Ok(true)
    }

    async fn list_bookmarked_ride_ids(&self, net_id: &NetId) -> Result<Vec<Uuid>> {
        let bookmarks = self.bookmarks.read().await;
        let mut owned: Vec<&Bookmark> = bookmarks
            .values()
            .filter(|bookmark| &bookmark.net_id == net_id)
            .collect();
        owned.sort_by_key(|bookmark| bookmark.created_at);
        Ok(owned.into_iter().map(|bookmark| bookmark.ride_id).collect())
    }

    async fn list_bookmarked_rides(&self, net_id: &NetId) -> Result<Vec<Ride>> {
        let ids = self.list_bookmarked_ride_ids(net_id).await?;
        let rides = self.rides.read().await;
        let mut bookmarked: Vec<Ride> = ids.iter().filter_map(|id| rides.get(id).cloned()).collect();
        sort_by_start(&mut bookmarked);
        Ok(bookmarked)
    }
}

#[async_trait]
impl StorageEngine for InMemoryStorage {
    fn get_type(&self) -> &'static str {
        "InMemory"
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.bookmarks.write().await.clear();
        self.rides.write().await.clear();
        self.users.write().await.clear();
        info!("In-memory storage reset");
        Ok(())
    }
}
