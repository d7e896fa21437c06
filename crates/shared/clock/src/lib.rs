//! Vigil Clock Infrastructure
//!
//! - [`SystemClock`]: wall-clock time for production
//! - [`ManualClock`]: time that only moves when told to, for deterministic
//!   day-transition and cooldown tests
//!
//! ```ignore
//! use vigil_clock::ManualClock;
//! use chrono::Duration;
//!
//! let clock = ManualClock::new(friday_close);
//! clock.advance(Duration::days(3)); // Monday
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use vigil_ports::Clock;
