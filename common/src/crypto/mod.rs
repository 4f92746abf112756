mod address;
mod hash;
mod keypair;

pub use address::*;
pub use hash::*;
pub use keypair::*;
