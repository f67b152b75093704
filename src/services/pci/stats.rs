use super::types::{NumericSample, SummaryRow, SummaryStats};
use calamine::Data;

/// Coerces a single cell to a finite number.
///
/// Text is trimmed and parsed; blanks, booleans, dates and error cells are
/// treated as missing.
pub fn coerce_cell(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

pub fn coerce(raw: &[Data]) -> NumericSample {
    let values: Vec<f64> = raw.iter().filter_map(coerce_cell).collect();
    NumericSample {
        dropped: raw.len() - values.len(),
        values,
    }
}

/// Mean, extrema and median of a raw column, or `None` when no cell coerces.
pub fn summarize(raw: &[Data]) -> Option<SummaryStats> {
    summarize_sample(&coerce(raw))
}

pub fn summarize_sample(sample: &NumericSample) -> Option<SummaryStats> {
    if sample.is_empty() {
        return None;
    }

    let mut sorted = sample.values.clone();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    // Summing in sorted order keeps the mean independent of row order.
    let sum: f64 = sorted.iter().sum();
    let average = (sum / n as f64).clamp(min, max);

    Some(SummaryStats { average, max, min, median })
}

/// Rounds half-to-even at the second decimal.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / 100.0
}

impl SummaryRow {
    pub fn from_stats(file_name: impl Into<String>, stats: &SummaryStats) -> Self {
        Self {
            file_name: file_name.into(),
            average: round2(stats.average),
            max: round2(stats.max),
            min: round2(stats.min),
            median: round2(stats.median),
        }
    }
}
