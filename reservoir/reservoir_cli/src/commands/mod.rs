//! Command implementations for the `reservoir` binary.

pub mod bench;
pub mod check;

pub use bench::{execute_bench, execute_bench_unpooled, BenchArgs, BenchUnpooledArgs};
pub use check::{execute_check_config, CheckConfigArgs};
