mod dynsized;
mod flatmap;
mod hash;
mod ownedslice;
#[cfg(test)]
mod tests;
mod thinarc;

pub use dynsized::*;
pub use flatmap::*;
pub use hash::*;
pub use ownedslice::*;
pub use thinarc::*;
