pub mod content;
pub mod entity;
pub mod markup;
pub mod ops;
