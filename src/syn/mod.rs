//! The runtime value model: every node of a message is an [`AbstractType`] that references
//! the static [`Info`] describing it.

pub mod bitstring;
pub mod choice;
pub mod info;
pub mod io;
pub mod opentype;
pub mod printablestring;
pub mod sequence;
pub mod value;

pub use bitstring::BitVec;
pub use choice::Choice;
pub use info::Info;
pub use opentype::OpenType;
pub use sequence::Sequence;
pub use value::AbstractType;
pub use value::Value;
