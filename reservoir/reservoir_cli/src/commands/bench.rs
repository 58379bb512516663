//! Benchmark commands
//!
//! Run many concurrent one-statement tasks, either sharing a pool of
//! connections or opening a fresh connection per task, and report how long
//! the whole batch took.

use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use reservoir_core::ConnectionFactory;
use reservoir_pool::{Connection, Pool, PoolState, PoolStats};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::simulated::SimulatedFactory;

/// Statement each task runs
const STATEMENT: &str = "SELECT SLEEP(0.01);";

/// Default task count for the unpooled benchmark
const UNPOOLED_TASKS: usize = 20;

/// Arguments for the bench command
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// TOML workload file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Pool size (overrides the config file)
    #[clap(long)]
    pub connections: Option<usize>,

    /// Number of concurrent tasks
    #[clap(long)]
    pub tasks: Option<usize>,

    /// Statement duration in milliseconds
    #[clap(long)]
    pub query_ms: Option<u64>,

    /// Connection open duration in milliseconds
    #[clap(long)]
    pub connect_ms: Option<u64>,

    /// Print the report as JSON
    #[clap(long)]
    pub json: bool,
}

/// Arguments for the bench-unpooled command
#[derive(Args, Debug)]
pub struct BenchUnpooledArgs {
    /// Number of concurrent tasks
    #[clap(long, default_value_t = UNPOOLED_TASKS)]
    pub tasks: usize,

    /// Statement duration in milliseconds
    #[clap(long)]
    pub query_ms: Option<u64>,

    /// Connection open duration in milliseconds
    #[clap(long)]
    pub connect_ms: Option<u64>,

    /// Print the report as JSON
    #[clap(long)]
    pub json: bool,
}

/// Outcome of one benchmark run
#[derive(Debug, Serialize)]
pub struct BenchReport {
    /// "pooled" or "unpooled"
    pub mode: &'static str,

    /// Tasks run
    pub tasks: usize,

    /// Pool size, absent for unpooled runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<usize>,

    /// Wall-clock time for the whole batch
    pub elapsed_ms: f64,

    /// Most connections in use at the same time
    pub peak_in_use: usize,

    /// Connections opened during the run
    pub opened: usize,

    /// Connections closed by the end of the run
    pub closed: usize,

    /// Statements executed
    pub statements: u64,

    /// Pool counters at the end of a pooled run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PoolStats>,

    /// Pool state after shutdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PoolState>,
}

impl BenchReport {
    fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        match self.connections {
            Some(connections) => println!(
                "Benchmark connection pool: {:.2}ms ({} tasks, {} connections, peak {} in use)",
                self.elapsed_ms, self.tasks, connections, self.peak_in_use
            ),
            None => println!(
                "Benchmark non-pool connections: {:.2}ms ({} tasks, peak {} open)",
                self.elapsed_ms, self.tasks, self.peak_in_use
            ),
        }
        Ok(())
    }
}

/// Implementation of the bench command
pub fn execute_bench(args: &BenchArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => BenchConfig::default(),
    };
    if let Some(connections) = args.connections {
        config.pool.max_connections = connections;
    }
    if let Some(tasks) = args.tasks {
        config.tasks = tasks;
    }
    if let Some(query_ms) = args.query_ms {
        config.query_ms = query_ms;
    }
    if let Some(connect_ms) = args.connect_ms {
        config.connect_ms = connect_ms;
    }
    config.validate().context("invalid benchmark configuration")?;

    run_pooled(&config)?.print(args.json)
}

/// Implementation of the bench-unpooled command
pub fn execute_bench_unpooled(args: &BenchUnpooledArgs) -> Result<()> {
    let mut config = BenchConfig {
        tasks: args.tasks,
        ..BenchConfig::default()
    };
    if let Some(query_ms) = args.query_ms {
        config.query_ms = query_ms;
    }
    if let Some(connect_ms) = args.connect_ms {
        config.connect_ms = connect_ms;
    }
    config.validate().context("invalid benchmark configuration")?;

    run_unpooled(&config)?.print(args.json)
}

/// Run `config.tasks` acquire → execute → release cycles against one pool.
pub fn run_pooled(config: &BenchConfig) -> Result<BenchReport> {
    let factory = SimulatedFactory::new(config.connect_delay(), config.query_delay());
    let ledger = factory.ledger();
    let pool = Pool::connect(config.pool.clone(), factory).context("failed to build pool")?;

    info!(
        tasks = config.tasks,
        connections = pool.size(),
        "starting pooled benchmark"
    );
    let started = Instant::now();

    thread::scope(|scope| -> Result<()> {
        let workers: Vec<_> = (0..config.tasks)
            .map(|_| {
                let pool = &pool;
                scope.spawn(move || -> Result<()> {
                    let mut conn = pool.acquire()?;
                    conn.execute(STATEMENT);
                    conn.release();
                    Ok(())
                })
            })
            .collect();

        for worker in workers {
            worker
                .join()
                .map_err(|_| anyhow!("benchmark task panicked"))??;
        }
        Ok(())
    })?;

    let elapsed = started.elapsed();
    let stats = pool.stats();
    debug!(?stats, "pooled benchmark finished");
    pool.shutdown();
    let state = pool.state();

    if ledger.closed() != ledger.opened() {
        bail!(
            "pool left {} connection(s) open after shutdown",
            ledger.opened() - ledger.closed()
        );
    }

    Ok(BenchReport {
        mode: "pooled",
        tasks: config.tasks,
        connections: Some(pool.size()),
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        peak_in_use: stats.peak_held,
        opened: ledger.opened(),
        closed: ledger.closed(),
        statements: ledger.statements(),
        stats: Some(stats),
        state: Some(state),
    })
}

/// Run `config.tasks` tasks that each open, use and close their own connection.
pub fn run_unpooled(config: &BenchConfig) -> Result<BenchReport> {
    let factory = SimulatedFactory::new(config.connect_delay(), config.query_delay());
    let ledger = factory.ledger();

    info!(tasks = config.tasks, "starting unpooled benchmark");
    let started = Instant::now();

    thread::scope(|scope| -> Result<()> {
        let workers: Vec<_> = (0..config.tasks)
            .map(|_| {
                let factory = &factory;
                scope.spawn(move || -> Result<()> {
                    let mut conn = factory.open()?;
                    conn.execute(STATEMENT);
                    conn.close();
                    Ok(())
                })
            })
            .collect();

        for worker in workers {
            worker
                .join()
                .map_err(|_| anyhow!("benchmark task panicked"))??;
        }
        Ok(())
    })?;

    Ok(BenchReport {
        mode: "unpooled",
        tasks: config.tasks,
        connections: None,
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        peak_in_use: ledger.peak_open(),
        opened: ledger.opened(),
        closed: ledger.closed(),
        statements: ledger.statements(),
        stats: None,
        state: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reservoir_core::PoolConfig;

    fn quick(tasks: usize, connections: usize) -> BenchConfig {
        BenchConfig {
            tasks,
            query_ms: 1,
            connect_ms: 0,
            pool: PoolConfig::new(connections),
        }
    }

    #[test]
    fn test_pooled_run_is_bounded() {
        let report = run_pooled(&quick(100, 4)).unwrap();

        assert_eq!(report.mode, "pooled");
        assert!(report.peak_in_use <= 4);
        assert_eq!(report.opened, 4);
        assert_eq!(report.closed, 4);
        assert_eq!(report.statements, 100);
        assert_eq!(report.state, Some(PoolState::Closed));

        let stats = report.stats.unwrap();
        assert_eq!(stats.acquired, 100);
        assert_eq!(stats.released, 100);
        assert_eq!(stats.closed, 4);
        assert_eq!(stats.peak_held, report.peak_in_use);
    }

    #[test]
    fn test_unpooled_run_opens_per_task() {
        let report = run_unpooled(&quick(8, 1)).unwrap();

        assert_eq!(report.mode, "unpooled");
        assert_eq!(report.opened, 8);
        assert_eq!(report.closed, 8);
        assert!(report.connections.is_none());
        assert!(report.stats.is_none());
    }
}
