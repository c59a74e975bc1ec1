//! Client library for running Pony documentation snippets on the Pony
//! Playground: resolution by reference or by fetch-then-submit, a page
//! model for the docs-site run buttons, and the binding runner that
//! drives one evaluation task per click.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod page;
pub mod playground;
pub mod printer;
pub mod runner;
