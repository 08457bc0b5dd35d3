pub use crate::io::buffer::BitBuffer;
pub use crate::io::buffer::Bits;
pub use crate::io::per::aligned::BitRead;
pub use crate::io::per::aligned::BitWrite;
pub use crate::io::per::Alignment;
pub use crate::io::per::Error;
pub use crate::io::per::ErrorKind;
pub use crate::io::per::PackedRead;
pub use crate::io::per::PackedWrite;
pub use crate::io::per::Violation;
pub use crate::syn::info::*;
pub use crate::syn::io::PerDecoder;
pub use crate::syn::io::PerEncoder;
pub use crate::syn::io::ZERO_SIZED_ITEMS_LIMIT;
pub use crate::syn::*;
