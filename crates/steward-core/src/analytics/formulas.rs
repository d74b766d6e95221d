//! Shared math for the prediction family of analytics tools. Kept separate
//! from `executor.rs` so `auto_scale_if_needed` (a Kubernetes executor tool)
//! can reuse the same replica-target arithmetic as `predict_scaling_needs`.

use steward_tools::result::PredictionVerdict;

use super::history::MetricHistory;

/// Minimum sample count below which a trend is reported but flagged
/// low-confidence rather than withheld outright.
pub const MIN_CONFIDENT_SAMPLES: usize = 5;

/// Least-squares slope of `values` against their index, expressed as a
/// percent change between the fitted window-start and window-end values.
/// Returns 0.0 for fewer than two samples or a near-zero start value.
pub fn trend_pct(values: &[u64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let ys: Vec<f64> = values.iter().map(|v| *v as f64).collect();

    let n_f = n as f64;
    let mean_x = xs.iter().sum::<f64>() / n_f;
    let mean_y = ys.iter().sum::<f64>() / n_f;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        numerator += dx * (ys[i] - mean_y);
        denominator += dx * dx;
    }
    if denominator == 0.0 {
        return 0.0;
    }
    let slope = numerator / denominator;
    let intercept = mean_y - slope * mean_x;

    let fitted_start = intercept;
    let fitted_end = slope * (n_f - 1.0) + intercept;

    if fitted_start.abs() < f64::EPSILON {
        return 0.0;
    }
    (fitted_end - fitted_start) / fitted_start.abs() * 100.0
}

pub fn verdict_for_trend(pct: f64) -> PredictionVerdict {
    if pct > 60.0 {
        PredictionVerdict::Critical
    } else if pct > 30.0 {
        PredictionVerdict::Warning
    } else {
        PredictionVerdict::Stable
    }
}

/// Suggested replica target for `deployment`, or `None` when the trend does
/// not warrant a change. Shared by `predict_scaling_needs` (report-only) and
/// `auto_scale_if_needed` (applies the suggestion).
pub async fn suggest_scaling(
    history: &MetricHistory,
    namespace: &str,
    deployment_pod_prefix: &str,
    current_replicas: i32,
    ceiling: i32,
) -> Option<i32> {
    if current_replicas <= 0 {
        return None;
    }

    let pods = history.all_pods(Some(namespace)).await;
    let matching: Vec<_> = pods
        .into_iter()
        .filter(|(_, pod)| pod.starts_with(deployment_pod_prefix))
        .collect();
    if matching.is_empty() {
        return None;
    }

    let mut cpu_samples_per_pod = Vec::new();
    for (ns, pod) in &matching {
        let samples = history.history(ns, pod).await;
        if samples.len() >= 2 {
            cpu_samples_per_pod.push(samples.iter().map(|s| s.cpu_millicores).collect::<Vec<_>>());
        }
    }
    if cpu_samples_per_pod.is_empty() {
        return None;
    }

    let avg_trend = cpu_samples_per_pod.iter().map(|s| trend_pct(s)).sum::<f64>() / cpu_samples_per_pod.len() as f64;
    let verdict = verdict_for_trend(avg_trend);
    if matches!(verdict, PredictionVerdict::Stable) {
        return None;
    }

    let growth_factor = 1.0 + (avg_trend / 100.0);
    let target = ((current_replicas as f64) * growth_factor).ceil() as i32;
    let target = target.clamp(1, ceiling.max(1));
    if target == current_replicas {
        None
    } else {
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_has_zero_trend() {
        assert_eq!(trend_pct(&[100, 100, 100, 100]), 0.0);
    }

    #[test]
    fn rising_series_has_positive_trend() {
        let pct = trend_pct(&[100, 120, 140, 160, 180]);
        assert!(pct > 0.0);
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(verdict_for_trend(10.0), PredictionVerdict::Stable);
        assert_eq!(verdict_for_trend(45.0), PredictionVerdict::Warning);
        assert_eq!(verdict_for_trend(90.0), PredictionVerdict::Critical);
    }
}
