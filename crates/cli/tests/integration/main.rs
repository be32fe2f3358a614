mod common;
mod env_tests;
mod run_tests;
mod status_tests;
