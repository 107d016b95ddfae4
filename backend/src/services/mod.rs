pub mod coin_source;
pub mod symbols;

pub use coin_source::CoinSourceService;
