#![deny(rustdoc::broken_intra_doc_links)]
#![warn(unused_extern_crates)]

#[macro_use]
pub extern crate serde_derive;

pub mod io;
pub mod prelude;
pub mod s1ap;
pub mod syn;
