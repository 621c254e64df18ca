pub mod hash;
pub mod random;

pub use self::hash::{HashFunction, SHA256};
pub use self::random::{AutoSeededPool, DeterministicRng, ExternGenerator, NativeGenerator};
