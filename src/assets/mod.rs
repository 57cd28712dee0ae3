//! Media resolution, decoding and the memoizing resource cache.

pub mod cache;
pub mod decode;
pub mod resolver;
