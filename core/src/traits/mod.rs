pub mod clock;
pub mod ids;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use storage::Storage;
