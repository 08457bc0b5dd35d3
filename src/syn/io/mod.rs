pub mod per;

pub use per::PerDecoder;
pub use per::PerEncoder;
pub use per::ZERO_SIZED_ITEMS_LIMIT;
