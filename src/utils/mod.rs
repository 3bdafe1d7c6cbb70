pub mod clock;
pub mod logging;
pub mod string_utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use string_utils::{token_preview, truncate_safe};
