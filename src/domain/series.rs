// Ordered series points and their derivations
use serde::{Deserialize, Deserializer, Serialize};

/// One point of an ordered series, e.g. revenue for one day or one product.
/// Order is chronological (or rank) and is preserved by every transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A series point carrying its trailing moving average
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragedPoint {
    #[serde(flatten)]
    pub point: SeriesPoint,
    #[serde(rename = "ma7")]
    pub moving_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub subject: String,
    pub value: f64,
    pub norm: f64,
}

/// Numbers arrive as JSON numbers, numeric strings or garbage; garbage is 0.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let value = match raw {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if value.is_finite() { value } else { 0.0 })
}

/// Trailing moving average over `window` points.
///
/// Near the start the window shrinks to the points seen so far, so the
/// first point averages over itself. A zero window behaves as 1.
pub fn moving_average(series: &[SeriesPoint], window: usize) -> Vec<AveragedPoint> {
    let window = window.max(1);

    series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let start = (i + 1).saturating_sub(window);
            let slice = &series[start..=i];
            let sum: f64 = slice.iter().map(|p| p.value).sum();
            AveragedPoint {
                point: point.clone(),
                moving_average: sum / slice.len() as f64,
            }
        })
        .collect()
}

/// Scale values to a 0..100 range against the series maximum.
/// The maximum is floored to 1, so an all-zero series normalizes to 0.
pub fn normalize_to_percentage(series: &[SeriesPoint]) -> Vec<NormalizedPoint> {
    let max = series.iter().map(|p| p.value).fold(1.0_f64, f64::max);

    series
        .iter()
        .map(|p| NormalizedPoint {
            subject: p.label.clone(),
            value: p.value,
            norm: p.value / max * 100.0,
        })
        .collect()
}

/// Last `count` points of the series, in order
pub fn tail(series: &[SeriesPoint], count: usize) -> &[SeriesPoint] {
    &series[series.len().saturating_sub(count)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint::new(format!("day {}", i + 1), *v))
            .collect()
    }

    #[test]
    fn test_moving_average_of_empty_series() {
        assert!(moving_average(&[], 7).is_empty());
        assert!(moving_average(&[], 1).is_empty());
    }

    #[test]
    fn test_moving_average_shrinks_window_at_start() {
        let points = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let averaged = moving_average(&points, 7);

        assert_eq!(averaged.len(), 10);
        assert_eq!(averaged[0].moving_average, 1.0);
        assert_eq!(averaged[1].moving_average, 1.5);
        assert_eq!(averaged[6].moving_average, 4.0);
        assert_eq!(averaged[9].moving_average, 7.0);
        assert_eq!(averaged[9].point, points[9]);
    }

    #[test]
    fn test_zero_window_behaves_as_one() {
        let points = series(&[3.0, 9.0]);
        let averaged = moving_average(&points, 0);
        assert_eq!(averaged[1].moving_average, 9.0);
    }

    #[test]
    fn test_averaged_point_wire_shape() {
        let averaged = moving_average(&series(&[4.0, 8.0]), 7);
        let json = serde_json::to_value(&averaged[1]).unwrap();

        assert_eq!(json["label"], "day 2");
        assert_eq!(json["value"], 8.0);
        assert_eq!(json["ma7"], 6.0);
        assert!(json.get("moving_average").is_none());
    }

    #[test]
    fn test_normalize_all_zero_series() {
        let normalized = normalize_to_percentage(&series(&[0.0, 0.0]));
        assert!(normalized.iter().all(|p| p.norm == 0.0));
    }

    #[test]
    fn test_normalize_against_max() {
        let normalized = normalize_to_percentage(&series(&[50.0, 200.0, 0.5]));
        assert_eq!(normalized[0].norm, 25.0);
        assert_eq!(normalized[1].norm, 100.0);
        assert_eq!(normalized[0].subject, "day 1");
    }

    #[test]
    fn test_non_numeric_values_become_zero() {
        let json = r#"[{"label":"Mon","value":"12.5"},{"label":"Tue","value":"n/a"},{"label":"Wed","value":null},{"label":"Thu"}]"#;
        let points: Vec<SeriesPoint> = serde_json::from_str(json).unwrap();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![12.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_tail_keeps_order() {
        let points = series(&[1.0, 2.0, 3.0]);
        assert_eq!(tail(&points, 2), &points[1..]);
        assert_eq!(tail(&points, 10).len(), 3);
    }
}
