pub mod annot;
pub mod convert;
pub mod inspect;
