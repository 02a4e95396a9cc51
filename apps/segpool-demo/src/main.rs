//! segpool demo
//!
//! Drives the process-wide allocator through a fixed sequence and prints the
//! free-list probe between steps:
//!
//! 1. allocate 15 bytes, then 180 bytes
//! 2. release both
//! 3. allocate a batch of small blocks, printing each address
//! 4. release the batch

use std::ptr::NonNull;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use segpool::{REQ_LARGE, REQ_SMALL, global};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LOG_FILTER: &str = "info";

/// Walkthrough of the segregated pool allocator
#[derive(Parser, Debug)]
#[command(name = "segpool-demo", version, about)]
struct Cli {
    /// Log filter directive (e.g. `info`, `segpool=debug`); takes
    /// precedence over `RUST_LOG`
    #[arg(long, env = "SEGPOOL_LOG")]
    log_level: Option<String>,

    /// Number of small blocks allocated in the batch step
    #[arg(long, default_value_t = 10)]
    batch: usize,
}

fn init_logging(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn probe() {
    // SAFETY: the demo is single-threaded.
    unsafe { global::debug_print() };
}

fn allocate(size: usize) -> Result<NonNull<u8>> {
    // SAFETY: the demo is single-threaded.
    let block = unsafe { global::try_allocate(size) }
        .with_context(|| format!("allocating {size} bytes"))?;
    println!("allocated {size} bytes at {:p}", block.as_ptr());
    Ok(block)
}

fn release(block: NonNull<u8>, size: usize) -> Result<()> {
    // SAFETY: single-threaded; block came from `allocate` and is released once.
    let class = unsafe { global::try_release(block.as_ptr()) }
        .with_context(|| format!("releasing {:p}", block.as_ptr()))?;
    debug!(%class, size, "block released");
    println!("released {size} bytes");
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    println!("---------- segregated allocator demo ----------");
    probe();

    let small = allocate(REQ_SMALL)?;
    probe();

    let large = allocate(REQ_LARGE)?;
    probe();

    release(small, REQ_SMALL)?;
    release(large, REQ_LARGE)?;
    probe();

    info!(batch = cli.batch, "allocating small batch");
    let mut batch = Vec::with_capacity(cli.batch);
    for index in 0..cli.batch {
        // SAFETY: the demo is single-threaded.
        match unsafe { global::allocate(REQ_SMALL) } {
            Some(block) => {
                println!("batch[{index}] = {:p}", block.as_ptr());
                batch.push(block);
            }
            None => {
                println!("batch[{index}] = null");
                warn!(index, "small pool exhausted");
            }
        }
    }
    println!("allocated {} blocks of {REQ_SMALL} bytes", batch.len());
    probe();

    for block in batch.drain(..) {
        // SAFETY: single-threaded; each block is released once.
        unsafe { global::release(block.as_ptr()) };
    }
    println!("released the batch");
    probe();

    // SAFETY: the demo is single-threaded.
    let snapshot = unsafe { global::snapshot() };
    ensure!(snapshot.is_pristine(), "blocks leaked:\n{snapshot}");
    // SAFETY: the demo is single-threaded.
    unsafe { global::validate() }.context("free lists are corrupted")?;

    println!("demo finished");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    info!(?cli, "starting segpool demo");
    run(&cli)
}
