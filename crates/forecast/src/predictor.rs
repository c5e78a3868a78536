use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictorError {
    /// No forecasting model is configured.
    #[error("no forecasting model is available")]
    Unavailable,

    #[error("invalid predictor configuration: {0}")]
    InvalidConfig(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Opaque numeric model: fixed-size input in, numeric sequence out.
///
/// Backends (ONNX, CoreML, ...) live behind this trait; the restock engine
/// never sees the runtime.
pub trait Predictor: Send + Sync + 'static {
    /// `(input_name, output_name)` of the model graph.
    fn io_names(&self) -> (String, String);

    fn predict_float(
        &self,
        input: &[f32],
        shape: &[usize],
        input_name: &str,
        output_name: &str,
    ) -> Result<Vec<f32>, PredictorError>;
}

/// Predictor that always returns the same series (development and tests).
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSeriesPredictor {
    series: Vec<f32>,
}

impl FixedSeriesPredictor {
    pub fn new(series: Vec<f32>) -> Self {
        Self { series }
    }
}

impl Predictor for FixedSeriesPredictor {
    fn io_names(&self) -> (String, String) {
        ("input".to_string(), "output".to_string())
    }

    fn predict_float(
        &self,
        input: &[f32],
        shape: &[usize],
        _input_name: &str,
        _output_name: &str,
    ) -> Result<Vec<f32>, PredictorError> {
        let expected: usize = shape.iter().product();
        if expected != input.len() {
            return Err(PredictorError::Inference(format!(
                "input has {} values but shape {:?} needs {}",
                input.len(),
                shape,
                expected
            )));
        }
        Ok(self.series.clone())
    }
}

/// Select a predictor backend from a configuration string.
///
/// - `None`, `""` or `"none"`: no model (restock falls back to the synthetic ramp)
/// - `"fixed:1,2.5,3"`: [`FixedSeriesPredictor`] with that series
pub fn load_predictor(setting: Option<&str>) -> Result<Option<Arc<dyn Predictor>>, PredictorError> {
    let setting = setting.map(str::trim).unwrap_or_default();
    if setting.is_empty() || setting.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    match setting.split_once(':') {
        Some(("fixed", values)) => {
            let series = values
                .split(',')
                .map(|v| {
                    v.trim()
                        .parse::<f32>()
                        .map_err(|e| PredictorError::InvalidConfig(format!("{v:?}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Arc::new(FixedSeriesPredictor::new(series))))
        }
        _ => Err(PredictorError::InvalidConfig(format!("unknown predictor backend: {setting}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_fixed_series_backend() {
        let predictor = load_predictor(Some("fixed: 1, 2.5 ,3")).unwrap().unwrap();
        let (input, output) = predictor.io_names();
        let out = predictor.predict_float(&[0.0; 4], &[1, 4], &input, &output).unwrap();
        assert_eq!(out, vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn none_means_no_model() {
        assert!(load_predictor(None).unwrap().is_none());
        assert!(load_predictor(Some("none")).unwrap().is_none());
        assert!(matches!(
            load_predictor(Some("onnx:/models/demand.onnx")),
            Err(PredictorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn shape_mismatch_is_an_inference_error() {
        let p = FixedSeriesPredictor::new(vec![1.0]);
        assert!(matches!(
            p.predict_float(&[1.0, 2.0], &[1, 4], "input", "output"),
            Err(PredictorError::Inference(_))
        ));
    }
}
