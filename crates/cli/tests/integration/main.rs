mod build_tests;
mod common;
mod list_tests;
mod print_tests;
