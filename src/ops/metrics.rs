//! Per-call bookkeeping of geometry operations.

use crate::error::FogError;
use crate::geojson::Feature;
use crate::polygon::Complexity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// The geometry operation a metrics record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Union,
    Difference,
    Buffer,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Union => "union",
            OperationKind::Difference => "difference",
            OperationKind::Buffer => "buffer",
        };
        f.write_str(name)
    }
}

/// Timing and size statistics of one operation call.
///
/// Produced on every path, including failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationMetrics {
    pub operation: OperationKind,
    pub execution_time: Duration,
    /// Combined complexity of the inputs that passed sanitization.
    pub input_complexity: Complexity,
    /// Complexity of the result, default when there is none.
    pub output_complexity: Complexity,
    pub had_error: bool,
    /// Some input was skipped or a partial result was kept.
    pub fallback_used: bool,
}

/// Everything an operation call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    /// The resulting geometry, `None` on failure or when nothing is left.
    pub result: Option<Feature>,
    pub metrics: OperationMetrics,
    pub errors: Vec<FogError>,
    pub warnings: Vec<String>,
    /// A difference whose subtrahend covered the minuend entirely.
    pub fully_covered: bool,
}

impl OperationOutcome {
    /// Returns `true` if the call recorded no error.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Accumulates an outcome while an operation runs.
pub(crate) struct Recorder {
    operation: OperationKind,
    started: Instant,
    pub input_complexity: Complexity,
    pub errors: Vec<FogError>,
    pub warnings: Vec<String>,
    pub fallback_used: bool,
}

impl Recorder {
    pub fn start(operation: OperationKind) -> Self {
        Self {
            operation,
            started: Instant::now(),
            input_complexity: Complexity::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
            fallback_used: false,
        }
    }

    /// Records a recoverable problem: an error plus a matching warning.
    pub fn skip(&mut self, error: FogError) {
        self.warnings.push(error.to_string());
        self.errors.push(error);
        self.fallback_used = true;
    }

    pub fn fail(mut self, error: FogError) -> OperationOutcome {
        self.errors.push(error);
        self.finish(None, Complexity::default(), false)
    }

    pub fn finish(
        self,
        result: Option<Feature>,
        output_complexity: Complexity,
        fully_covered: bool,
    ) -> OperationOutcome {
        let metrics = OperationMetrics {
            operation: self.operation,
            execution_time: self.started.elapsed(),
            input_complexity: self.input_complexity,
            output_complexity,
            had_error: !self.errors.is_empty(),
            fallback_used: self.fallback_used,
        };

        tracing::debug!(
            operation = %metrics.operation,
            elapsed_us = metrics.execution_time.as_micros() as u64,
            input_vertices = metrics.input_complexity.total_vertices,
            output_vertices = metrics.output_complexity.total_vertices,
            errors = self.errors.len(),
            "geometry operation finished"
        );

        OperationOutcome {
            result,
            metrics,
            errors: self.errors,
            warnings: self.warnings,
            fully_covered,
        }
    }
}
