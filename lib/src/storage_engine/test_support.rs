// lib/src/storage_engine/test_support.rs

use chrono::{TimeZone, Utc};
use models::{NetId, Ride, RideFilter, RideUpdate, User};
use uuid::Uuid;

use super::storage_engine::StorageEngine;
use crate::errors::StorageError;

pub fn net_id(value: &str) -> NetId {
    NetId::new(value.to_string()).unwrap()
}

/// An open ride on 2030-01-15 between the given UTC hours.
pub fn ride_for(owner: &str, beginning: &str, destination: &str, start_hour: u32, end_hour: u32) -> Ride {
    Ride {
        ride_id: Uuid::new_v4(),
        owner_net_id: net_id(owner),
        owner_name: format!("{} Name", owner),
        owner_email: format!("{}@example.edu", owner),
        owner_phone: String::new(),
        beginning: beginning.to_string(),
        destination: destination.to_string(),
        description: String::new(),
        start_time: Utc.with_ymd_and_hms(2030, 1, 15, start_hour, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2030, 1, 15, end_hour, 0, 0).unwrap(),
        total_seats: 4,
        current_taken_seats: 0,
        is_closed: false,
        has_car: false,
        created_at: Utc::now(),
    }
}

fn ids(rides: &[Ride]) -> Vec<Uuid> {
    rides.iter().map(|ride| ride.ride_id).collect()
}

/// Behavior every storage engine must share.
pub async fn exercise_storage_engine<S: StorageEngine>(storage: &S) {
    let alice = net_id("alice");
    let bob = net_id("bob");

    let early = ride_for("alice", "New Haven", "JFK Airport", 9, 10);
    let late = ride_for("alice", "New Haven", "Boston", 12, 13);
    let other = ride_for("bob", "Hartford", "jfk", 7, 8);
    for ride in [&late, &other, &early] {
        storage.create_ride(ride).await.unwrap();
    }

    assert_eq!(storage.get_ride(&early.ride_id).await.unwrap(), Some(early.clone()));
    assert_eq!(storage.get_ride(&Uuid::new_v4()).await.unwrap(), None);

    assert_eq!(
        ids(&storage.list_open_rides(500).await.unwrap()),
        vec![other.ride_id, early.ride_id, late.ride_id]
    );
    assert_eq!(ids(&storage.list_open_rides(1).await.unwrap()), vec![other.ride_id]);

    let to_jfk = RideFilter {
        to: Some("JFK".to_string()),
        ..Default::default()
    };
    assert_eq!(
        ids(&storage.find_filtered_rides(&to_jfk).await.unwrap()),
        vec![other.ride_id, early.ride_id]
    );

    assert_eq!(
        ids(&storage.list_rides_by_owner(&alice).await.unwrap()),
        vec![late.ride_id, early.ride_id]
    );

    let edited = storage
        .update_ride(
            &late.ride_id,
            &RideUpdate {
                description: Some("two bags max".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.description, "two bags max");
    assert_eq!(storage.get_ride(&late.ride_id).await.unwrap(), Some(edited));
    assert!(matches!(
        storage.update_ride(&Uuid::new_v4(), &RideUpdate::default()).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        storage
            .update_ride(
                &late.ride_id,
                &RideUpdate {
                    total_seats: Some(0),
                    ..Default::default()
                },
            )
            .await,
        Err(StorageError::Validation(_))
    ));

    // Bookmarks toggle and follow ride deletion.
    assert!(storage.toggle_bookmark(&bob, &early.ride_id).await.unwrap());
    assert!(storage.toggle_bookmark(&bob, &late.ride_id).await.unwrap());
    assert!(storage.toggle_bookmark(&alice, &early.ride_id).await.unwrap());
    assert!(!storage.toggle_bookmark(&bob, &late.ride_id).await.unwrap());
    assert_eq!(
        storage.list_bookmarked_ride_ids(&bob).await.unwrap(),
        vec![early.ride_id]
    );
    assert!(matches!(
        storage.toggle_bookmark(&bob, &Uuid::new_v4()).await,
        Err(StorageError::NotFound(_))
    ));

    assert!(storage.close_ride(&early.ride_id).await.unwrap());
    assert!(!storage.close_ride(&Uuid::new_v4()).await.unwrap());
    assert_eq!(
        ids(&storage.list_rides_by_owner(&alice).await.unwrap()),
        vec![late.ride_id]
    );
    // Closed rides remain visible among bookmarks.
    assert_eq!(
        ids(&storage.list_bookmarked_rides(&bob).await.unwrap()),
        vec![early.ride_id]
    );

    assert!(storage.delete_ride(&early.ride_id).await.unwrap());
    assert!(!storage.delete_ride(&early.ride_id).await.unwrap());
    assert!(storage.list_bookmarked_ride_ids(&bob).await.unwrap().is_empty());
    assert!(storage.list_bookmarked_ride_ids(&alice).await.unwrap().is_empty());

    // Rides ending before "now" are closed once.
    let now = Utc.with_ymd_and_hms(2030, 1, 15, 10, 0, 0).unwrap();
    assert_eq!(storage.close_expired_rides(now).await.unwrap(), 1);
    assert_eq!(storage.close_expired_rides(now).await.unwrap(), 0);
    assert!(storage.get_ride(&other.ride_id).await.unwrap().unwrap().is_closed);
    assert_eq!(ids(&storage.list_open_rides(500).await.unwrap()), vec![late.ride_id]);

    // Users.
    let user = User::new(net_id("ts123"), "Test", "User", "test.user@yale.edu");
    storage.create_user(&user).await.unwrap();
    assert!(matches!(
        storage.create_user(&user).await,
        Err(StorageError::AlreadyExists(_))
    ));
    let renamed = User::new(net_id("ts123"), "Other", "Name", "x@yale.edu");
    assert_eq!(storage.find_or_create_user(renamed).await.unwrap(), user);
    let fresh = User::new(net_id("new1"), "New", "Person", "new@yale.edu");
    assert_eq!(storage.find_or_create_user(fresh.clone()).await.unwrap(), fresh);
    assert_eq!(storage.get_user(&net_id("new1")).await.unwrap(), Some(fresh));

    storage.flush().await.unwrap();
    storage.reset().await.unwrap();
    assert!(storage.list_open_rides(500).await.unwrap().is_empty());
    assert_eq!(storage.get_user(&net_id("ts123")).await.unwrap(), None);
}

fn description(text: &str) -> RideUpdate {
    RideUpdate {
        description: Some(text.to_string()),
        ..Default::default()
    }
}

/// Writers racing on the same ride must not lose each other's changes or
/// leave bookmarks behind a deleted ride.
pub async fn exercise_concurrent_writes<S: StorageEngine + Clone + 'static>(storage: S) {
    let bob = net_id("bob");

    // Delete racing an edit and a bookmark toggle.
    for round in 0..100 {
        let ride = ride_for("alice", "New Haven", "Boston", 9, 10);
        let ride_id = ride.ride_id;
        storage.create_ride(&ride).await.unwrap();
        assert!(storage.toggle_bookmark(&bob, &ride_id).await.unwrap());

        let deleter = {
            let storage = storage.clone();
            tokio::spawn(async move { storage.delete_ride(&ride_id).await })
        };
        let editor = {
            let storage = storage.clone();
            let update = description(&format!("edit {}", round));
            tokio::spawn(async move { storage.update_ride(&ride_id, &update).await })
        };
        let toggler = {
            let storage = storage.clone();
            let bob = bob.clone();
            tokio::spawn(async move { storage.toggle_bookmark(&bob, &ride_id).await })
        };

        assert!(deleter.await.unwrap().unwrap());
        match editor.await.unwrap() {
            Ok(_) | Err(StorageError::NotFound(_)) => {}
            Err(e) => panic!("unexpected edit failure: {}", e),
        }
        match toggler.await.unwrap() {
            Ok(_) | Err(StorageError::NotFound(_)) => {}
            Err(e) => panic!("unexpected toggle failure: {}", e),
        }
        assert_eq!(storage.get_ride(&ride_id).await.unwrap(), None);
        assert!(storage.list_bookmarked_ride_ids(&bob).await.unwrap().is_empty());
    }

    // Closing racing an edit keeps both changes.
    for _ in 0..50 {
        let ride = ride_for("alice", "New Haven", "Boston", 9, 10);
        let ride_id = ride.ride_id;
        storage.create_ride(&ride).await.unwrap();

        let closer = {
            let storage = storage.clone();
            tokio::spawn(async move { storage.close_ride(&ride_id).await })
        };
        let editor = {
            let storage = storage.clone();
            tokio::spawn(async move { storage.update_ride(&ride_id, &description("edited")).await })
        };
        assert!(closer.await.unwrap().unwrap());
        editor.await.unwrap().unwrap();

        let stored = storage.get_ride(&ride_id).await.unwrap().unwrap();
        assert!(stored.is_closed);
        assert_eq!(stored.description, "edited");
    }

    // Two toggles by the same user cancel out.
    let ride = ride_for("alice", "New Haven", "Boston", 9, 10);
    let ride_id = ride.ride_id;
    storage.create_ride(&ride).await.unwrap();
    for _ in 0..50 {
        let toggles: Vec<_> = (0..2)
            .map(|_| {
                let storage = storage.clone();
                let bob = bob.clone();
                tokio::spawn(async move { storage.toggle_bookmark(&bob, &ride_id).await })
            })
            .collect();
        let mut added = 0;
        for toggle in toggles {
            if toggle.await.unwrap().unwrap() {
                added += 1;
            }
        }
        assert_eq!(added, 1);
        assert!(storage.list_bookmarked_ride_ids(&bob).await.unwrap().is_empty());
    }
    assert!(storage.toggle_bookmark(&bob, &ride_id).await.unwrap());
    assert!(storage.delete_ride(&ride_id).await.unwrap());
    assert!(storage.list_bookmarked_ride_ids(&bob).await.unwrap().is_empty());
}
