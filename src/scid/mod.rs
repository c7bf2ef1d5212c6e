pub mod buffer;
pub mod codec;
pub mod games;
pub mod moves;
pub mod tags;

pub use codec::{decode, encode, DecodeMode, DecodedGame};
pub use games::GameFile;
