mod batch_test;
mod content_test;
mod entity_test;
