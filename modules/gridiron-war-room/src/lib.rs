pub mod content;
pub mod delivery;
pub mod film_flag;
pub mod grading;
pub mod jitter;
pub mod ledger;
pub mod retention;
pub mod routes;
pub mod stats;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod war_room;

pub use war_room::{WarRoom, WarRoomDeps};
