//! Union, difference and buffer over sanitized polygon features.

use super::buffer::{geodesic_circle, Units};
use super::metrics::{OperationKind, OperationOutcome, Recorder};
use crate::config::{FogConfig, OperationConfig, ValidationConfig};
use crate::error::{FogError, Result};
use crate::geojson::{from_multi_polygon, to_multi_polygon, Feature, Geometry, Position};
use crate::polygon::{
    complexity_with, geometry_complexity, sanitize_with, validate_with, Complexity,
};
use geo::{Area, BooleanOps};
use geo_types::MultiPolygon;
use std::panic::{self, AssertUnwindSafe};

/// Runs a boolean operation, converting a panic inside it into an error.
fn guarded<T>(operation: OperationKind, f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        FogError::Operation(format!("{operation} panicked: {message}"))
    })
}

/// Rejects boolean results carrying non-finite coordinates.
fn check_finite(operation: OperationKind, multi: &MultiPolygon<f64>) -> Result<()> {
    let finite = multi.0.iter().all(|polygon| {
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .flat_map(|ring| ring.coords())
            .all(|c| c.x.is_finite() && c.y.is_finite())
    });
    if finite {
        Ok(())
    } else {
        Err(FogError::Operation(format!(
            "{operation} produced non-finite coordinates"
        )))
    }
}

/// Polygon boolean operations with validation on both ends.
///
/// Inputs are sanitized before they reach the boolean routine and results
/// are sanitized before they are returned, so every feature leaving the
/// engine passes [`crate::polygon::validate`].
///
/// # Example
///
/// ```
/// use fogmap::geojson::{Feature, Viewport};
/// use fogmap::ops::GeometryEngine;
///
/// let engine = GeometryEngine::default();
/// let viewport = Viewport::new(-1.0, -1.0, 1.0, 1.0).unwrap().to_feature();
/// let visited = Feature::polygon(vec![vec![
///     [0.0, 0.0], [0.0, 0.5], [0.5, 0.5], [0.5, 0.0], [0.0, 0.0],
/// ]]);
///
/// let outcome = engine.difference(&viewport, &visited);
/// assert!(outcome.is_ok());
/// assert!(outcome.result.is_some());
/// assert!(!outcome.fully_covered);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeometryEngine {
    validation: ValidationConfig,
    operations: OperationConfig,
}

impl GeometryEngine {
    pub fn new(validation: ValidationConfig, operations: OperationConfig) -> Self {
        Self {
            validation,
            operations,
        }
    }

    pub fn from_config(config: &FogConfig) -> Self {
        Self::new(config.validation.clone(), config.operations.clone())
    }

    pub fn validation_config(&self) -> &ValidationConfig {
        &self.validation
    }

    /// Sanitizes an operand, explaining a rejection with the validation issues.
    fn prepare(&self, feature: &Feature, role: &str) -> Result<Feature> {
        sanitize_with(feature, &self.validation).ok_or_else(|| {
            let report = validate_with(feature, &self.validation);
            let reason = if report.issues.is_empty() {
                "nothing left after sanitization".to_string()
            } else {
                report.issues.join("; ")
            };
            FogError::Validation(format!("{role}: {reason}"))
        })
    }

    /// Turns a boolean result into a sanitized feature, `None` when empty.
    fn finish_geometry(&self, multi: &MultiPolygon<f64>) -> Option<Feature> {
        let geometry = from_multi_polygon(multi)?;
        sanitize_with(&Feature::new(geometry), &self.validation)
    }

    fn output_complexity(&self, result: &Option<Feature>) -> Complexity {
        result
            .as_ref()
            .map(|f| complexity_with(f, &self.validation))
            .unwrap_or_default()
    }

    /// Unions all features into one.
    ///
    /// Invalid features are skipped with a warning. A feature whose union
    /// with the running result fails is skipped too and the last good
    /// result is kept, so one bad polygon never costs the whole union.
    /// Returns `None` with an error when no feature survives.
    pub fn union(&self, features: &[Feature]) -> OperationOutcome {
        self.union_with(features, |accumulator, next| accumulator.union(next))
    }

    /// Union folding the sanitized inputs with `step`, which merges the
    /// running result with the next input.
    fn union_with<S>(&self, features: &[Feature], mut step: S) -> OperationOutcome
    where
        S: FnMut(&MultiPolygon<f64>, &MultiPolygon<f64>) -> MultiPolygon<f64>,
    {
        let mut recorder = Recorder::start(OperationKind::Union);

        if features.is_empty() {
            return recorder.fail(FogError::Validation("union of zero features".into()));
        }

        let mut prepared = Vec::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            match self.prepare(feature, &format!("union input {i}")) {
                Ok(clean) => prepared.push(clean),
                Err(e) => recorder.skip(e),
            }
        }

        let complexities: Vec<Complexity> = prepared
            .iter()
            .map(|f| complexity_with(f, &self.validation))
            .collect();
        recorder.input_complexity = Complexity::combine(&complexities, &self.validation);

        let mut inputs = prepared.into_iter();
        let Some(first) = inputs.next() else {
            return recorder.fail(FogError::Validation("no valid union input".into()));
        };

        if inputs.len() == 0 {
            let output = self.output_complexity(&Some(first.clone()));
            return recorder.finish(Some(first), output, false);
        }

        let mut accumulator = to_multi_polygon(&first.geometry);
        for (i, feature) in inputs.enumerate() {
            let next = to_multi_polygon(&feature.geometry);
            let merged = guarded(OperationKind::Union, || step(&accumulator, &next))
                .and_then(|merged| {
                    check_finite(OperationKind::Union, &merged)?;
                    if merged.0.is_empty() {
                        return Err(FogError::Operation("union produced no polygons".into()));
                    }
                    Ok(merged)
                });

            match merged {
                Ok(merged) => accumulator = merged,
                Err(e) => {
                    tracing::debug!(input = i + 1, error = %e, "skipping polygon in union");
                    recorder.skip(e);
                }
            }
        }

        let result = self.finish_geometry(&accumulator);
        if result.is_none() {
            return recorder.fail(FogError::Operation(
                "union result failed validation".into(),
            ));
        }
        let output = self.output_complexity(&result);
        recorder.finish(result, output, false)
    }

    /// Subtracts `subtrahend` from `minuend`.
    ///
    /// When nothing of `minuend` remains the result is `None` with
    /// `fully_covered` set and no error.
    pub fn difference(&self, minuend: &Feature, subtrahend: &Feature) -> OperationOutcome {
        let mut recorder = Recorder::start(OperationKind::Difference);

        let operands = self
            .prepare(minuend, "difference minuend")
            .and_then(|a| Ok((a, self.prepare(subtrahend, "difference subtrahend")?)));
        let (a, b) = match operands {
            Ok(pair) => pair,
            Err(e) => return recorder.fail(e),
        };

        recorder.input_complexity = Complexity::combine(
            &[
                complexity_with(&a, &self.validation),
                complexity_with(&b, &self.validation),
            ],
            &self.validation,
        );

        let lhs = to_multi_polygon(&a.geometry);
        let rhs = to_multi_polygon(&b.geometry);
        let remainder = match guarded(OperationKind::Difference, || lhs.difference(&rhs))
            .and_then(|r| check_finite(OperationKind::Difference, &r).map(|_| r))
        {
            Ok(r) => r,
            Err(e) => return recorder.fail(e),
        };

        if remainder.unsigned_area() < self.operations.min_result_area {
            return recorder.finish(None, Complexity::default(), true);
        }

        let mut result = self.finish_geometry(&remainder);
        if let Some(feature) = result.as_mut() {
            feature.properties = a.properties;
        } else {
            // Only slivers below the coordinate precision were left.
            return recorder.finish(None, Complexity::default(), true);
        }
        let output = self.output_complexity(&result);
        recorder.finish(result, output, false)
    }

    /// Builds a geodesic circle of radius `distance` around `center`.
    pub fn buffer(&self, center: Position, distance: f64, units: Units) -> OperationOutcome {
        let recorder = Recorder::start(OperationKind::Buffer);

        let ring = match geodesic_circle(center, distance, units, self.operations.buffer_steps) {
            Ok(ring) => ring,
            Err(e) => return recorder.fail(e),
        };

        match sanitize_with(&Feature::polygon(vec![ring]), &self.validation) {
            Some(feature) => {
                let output = self.output_complexity(&Some(feature.clone()));
                recorder.finish(Some(feature), output, false)
            }
            None => recorder.fail(FogError::Operation(format!(
                "buffer of {distance} {units:?} around {center:?} collapsed"
            ))),
        }
    }

    /// Simplifies geometry whose complexity is High, leaving the rest as is.
    pub fn bound_complexity(&self, feature: Feature) -> Feature {
        let complexity = geometry_complexity(&feature.geometry, &self.validation);
        if complexity.level < crate::polygon::ComplexityLevel::High {
            return feature;
        }

        let geometry: Geometry =
            crate::simplify::simplify_geometry(&feature.geometry, self.operations.simplify_tolerance);
        let simplified = Feature {
            geometry,
            ..feature.clone()
        };
        match sanitize_with(&simplified, &self.validation) {
            Some(clean) => {
                tracing::debug!(
                    before = complexity.total_vertices,
                    after = clean.geometry.vertex_count(),
                    "simplified high-complexity geometry"
                );
                clean
            }
            None => feature,
        }
    }
}
