mod common;

mod merge_tests;
mod overrides_tests;
mod pipeline_tests;
mod source_tests;
