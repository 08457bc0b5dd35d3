pub mod buffer;
pub mod per;
