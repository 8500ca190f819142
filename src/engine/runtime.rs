// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::errors::EvaluationError;

/// Drives one future at a time to completion on a current-thread runtime,
/// created on first use. Refuses to run from inside another tokio runtime.
#[derive(Default)]
pub(crate) struct BlockingRuntime {
    runtime: Option<Runtime>,
}

impl BlockingRuntime {
    pub(crate) fn block_on<F: Future>(&mut self, future: F) -> Result<F::Output, EvaluationError> {
        if Handle::try_current().is_ok() {
            return Err(EvaluationError::NestedRuntime);
        }
        let runtime = match self.runtime.take() {
            Some(runtime) => runtime,
            None => Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| EvaluationError::Runtime(Arc::new(e)))?,
        };
        let output = runtime.block_on(future);
        self.runtime = Some(runtime);
        Ok(output)
    }
}

impl Drop for BlockingRuntime {
    fn drop(&mut self) {
        // Dropping a runtime blocks, which panics inside an async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_runs_to_completion() {
        let mut runtime = BlockingRuntime::default();
        let value = runtime
            .block_on(async {
                tokio::task::yield_now().await;
                7
            })
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(runtime.block_on(async { 8 }).unwrap(), 8);
    }

    #[test]
    fn test_refuses_to_nest_inside_a_runtime() {
        let outer = Builder::new_current_thread().build().unwrap();
        let mut runtime = BlockingRuntime::default();
        let result = outer.block_on(async { runtime.block_on(async { 7 }) });
        assert!(matches!(result, Err(EvaluationError::NestedRuntime)));

        drop(outer);
        assert_eq!(runtime.block_on(async { 8 }).unwrap(), 8);
    }
}
