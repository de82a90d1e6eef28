//! Room hosting: the store boundary, clocks, and the host session.

pub mod clock;
pub mod store;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use session::{Host, HostError, Intent};
pub use store::{InMemoryRoomStore, RoomStore, StatePatch, StoreError, Subscriber, SubscriptionId};
