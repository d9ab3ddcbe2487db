//! ID type wrappers for type safety.

mod id_macro;

pub mod booker_id;
pub mod clipper_id;

pub use booker_id::BookerId;
pub use clipper_id::ClipperId;
