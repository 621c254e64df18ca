pub mod c_ffi;
pub mod crypto;
pub mod driver;
pub mod logging;
pub mod rng;
