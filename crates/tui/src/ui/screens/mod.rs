pub mod entries;
pub mod form;
