pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Milliseconds as seconds with three decimals, the way times are shown
pub fn format_secs(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}
