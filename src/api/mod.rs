mod inline;

pub use inline::inline_scope;
