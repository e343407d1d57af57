// models/src/lib.rs

pub mod bookmarks;
pub mod errors;
pub mod identifiers;
pub mod queries;
pub mod rides;
pub mod users;

pub use bookmarks::Bookmark;
pub use identifiers::NetId;
pub use queries::{DateTimeRange, RideFilter};
pub use rides::{ActiveInterval, NewRide, Ride, RideUpdate};
pub use users::{AuthenticatedUser, User};
