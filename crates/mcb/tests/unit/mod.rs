//! Integration tests — `cargo test -p mcb --test unit`

mod cli_tests;
