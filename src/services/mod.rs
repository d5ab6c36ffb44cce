//! Service layer.
//!
//! External collaborators live here: the App Store lookup client with its
//! region prober, and the notification transports.

pub mod lookup;
pub mod notify;

pub use lookup::{AppStoreClient, RegionProber, ReleaseLookup};
pub use notify::{Notification, NotificationSender};
