pub mod coin_source;

pub use coin_source::*;
