//! Dashboard aggregation over fetched entries: windowing, per-metric
//! averages, chart series and a Pearson correlation matrix.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::mood_entry::{MetricField, MoodEntry, MoodMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRange {
    Week,
    Month,
    Quarter,
}

impl DashboardRange {
    /// Accepts `7d`, `30d` and `90d`. Missing means `30d`.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw {
            Some("7d") => Ok(Self::Week),
            Some("30d") | None => Ok(Self::Month),
            Some("90d") => Ok(Self::Quarter),
            Some(other) => Err(format!("range must be 7d, 30d or 90d (got {})", other)),
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metrics: MoodMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricAverage {
    pub metric: MetricField,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<MetricField>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub range_days: i64,
    pub entry_count: usize,
    pub averages: Vec<MetricAverage>,
    pub series: Vec<SeriesPoint>,
    pub correlations: CorrelationMatrix,
}

pub fn build_dashboard(entries: &[MoodEntry], range: DashboardRange, now: DateTime<Utc>) -> Dashboard {
    let since = now - Duration::days(range.days());

    let mut window: Vec<&MoodEntry> = entries.iter().filter(|e| e.created_at >= since).collect();
    window.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let columns: Vec<Vec<f64>> = MetricField::ALL
        .iter()
        .map(|f| window.iter().map(|e| e.metrics.get(*f) as f64).collect())
        .collect();

    let averages = MetricField::ALL
        .iter()
        .zip(&columns)
        .map(|(metric, values)| MetricAverage {
            metric: *metric,
            mean: mean(values),
        })
        .collect();

    let values = columns
        .iter()
        .map(|x| columns.iter().map(|y| pearson(x, y)).collect())
        .collect();

    let series = window
        .iter()
        .map(|e| SeriesPoint {
            created_at: e.created_at,
            date: e.created_at.date_naive(),
            metrics: e.metrics,
        })
        .collect();

    Dashboard {
        range_days: range.days(),
        entry_count: window.len(),
        averages,
        series,
        correlations: CorrelationMatrix {
            metrics: MetricField::ALL.to_vec(),
            values,
        },
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `None` with fewer than two points or when either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some((cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0))
}
