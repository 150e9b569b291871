use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row length must be valid.
    #[error("row length must be > 0 and divide the buffer length ({0})")]
    InvalidRowLength(usize),
}

/// Controls how row-parallel operations are executed.
///
/// Rows of the destination buffer are disjoint tiles: each one is written by a
/// single worker, while all sources are shared read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    ParallelRows,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

/// Apply `op(row_index, row)` to every row of `dst` with the given strategy.
///
/// # Arguments
///
/// * `strategy` - The execution strategy.
/// * `dst` - The destination buffer, row major.
/// * `row_len` - The number of elements in one row (width * channels).
/// * `op` - The operation to perform on each row.
///
/// # Errors
///
/// If the row length does not tile the buffer, or the local thread pool cannot be built.
pub fn for_each_row<T, F>(
    strategy: ExecutionStrategy,
    dst: &mut [T],
    row_len: usize,
    op: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if row_len == 0 || dst.len() % row_len != 0 {
        return Err(ParallelError::InvalidRowLength(row_len));
    }

    match strategy {
        ExecutionStrategy::Serial => {
            dst.chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(r, row)| op(r, row));
        }
        ExecutionStrategy::ParallelRows => {
            dst.par_chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(r, row)| op(r, row));
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_chunks_exact_mut(row_len)
                    .enumerate()
                    .for_each(|(r, row)| op(r, row));
            });
        }
    }
    Ok(())
}
