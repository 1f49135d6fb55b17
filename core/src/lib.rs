mod backward;
mod clock;
mod generator;
mod logline;

pub use backward::{BackwardLineReader, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_LINE_LEN};
pub use clock::{Clock, FixedClock, SystemClock};
pub use generator::*;
pub use logline::*;
