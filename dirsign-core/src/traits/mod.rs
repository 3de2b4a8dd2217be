//! Platform abstraction traits so protocol code can run against the OS,
//! a loopback server, or deterministic test doubles.

pub mod transport;
pub mod random;
pub mod clock;

pub use clock::Clock;
pub use random::SecureRandom;
pub use transport::{Endpoint, Reply, Transport};
