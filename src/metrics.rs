use crate::data::{BomboData, Cohort, MonthlyPoint, Segment, UnitEconomics};
use ndarray::{Array1, Array2, Axis, Zip};
use tracing::debug;

/// Figures derived from the data table at render time.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    /// Month-over-month GTV change in percent, aligned with `monthly`.
    pub gtv_growth: Vec<Option<f64>>,
    /// DAU/MAU in percent, aligned with `monthly`.
    pub stickiness: Vec<f64>,
    pub ltv_to_cac: Option<f64>,
    /// Mean retention by months since signup across all cohorts.
    pub retention_curve: Vec<f64>,
    pub segment_shares: Vec<(&'static str, f64)>,
}

impl DashboardMetrics {
    #[must_use]
    pub fn from_data(data: &BomboData) -> Self {
        let metrics = Self {
            gtv_growth: gtv_growth_series(data.monthly),
            stickiness: stickiness_series(data.monthly),
            ltv_to_cac: ltv_to_cac(&data.unit_economics),
            retention_curve: retention_curve(data.cohorts),
            segment_shares: segment_shares(data.segments),
        };
        debug!(
            months = data.monthly.len(),
            cohorts = data.cohorts.len(),
            ltv_to_cac = ?metrics.ltv_to_cac,
            "derived dashboard metrics"
        );
        metrics
    }

    #[must_use]
    pub fn latest_growth(&self) -> Option<f64> {
        self.gtv_growth.last().copied().flatten()
    }

    #[must_use]
    pub fn latest_stickiness(&self) -> Option<f64> {
        self.stickiness.last().copied()
    }
}

/// Percentage change from `previous` to `current`; `None` without a positive base.
#[must_use]
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous > 0.0 && previous.is_finite() && current.is_finite() {
        Some((current / previous - 1.0) * 100.0)
    } else {
        None
    }
}

#[must_use]
pub fn gtv_growth_series(points: &[MonthlyPoint]) -> Vec<Option<f64>> {
    let mut growth = Vec::with_capacity(points.len());
    if points.is_empty() {
        return growth;
    }
    growth.push(None);
    growth.extend(
        points
            .windows(2)
            .map(|pair| percent_change(pair[0].gtv, pair[1].gtv)),
    );
    growth
}

#[must_use]
pub fn stickiness_series(points: &[MonthlyPoint]) -> Vec<f64> {
    let dau: Array1<f64> = points.iter().map(|p| f64::from(p.dau)).collect();
    let mau: Array1<f64> = points.iter().map(|p| f64::from(p.mau)).collect();
    Zip::from(&dau)
        .and(&mau)
        .map_collect(|&d, &m| if m > 0.0 { d / m * 100.0 } else { 0.0 })
        .to_vec()
}

#[must_use]
pub fn ltv_to_cac(economics: &UnitEconomics) -> Option<f64> {
    (economics.cac > 0.0).then(|| economics.ltv / economics.cac)
}

#[must_use]
pub fn segment_shares(segments: &[Segment]) -> Vec<(&'static str, f64)> {
    let total: f64 = segments.iter().map(|s| f64::from(s.users)).sum();
    segments
        .iter()
        .map(|s| {
            let share = if total > 0.0 {
                f64::from(s.users) / total * 100.0
            } else {
                0.0
            };
            (s.name, share)
        })
        .collect()
}

/// Cohorts as rows, months since signup as columns; cells a cohort has not
/// reached yet are NaN.
#[must_use]
pub fn retention_matrix(cohorts: &[Cohort]) -> Array2<f64> {
    let width = cohorts
        .iter()
        .map(|c| c.retention.len())
        .max()
        .unwrap_or(0);
    let mut matrix = Array2::from_elem((cohorts.len(), width), f64::NAN);
    for (mut row, cohort) in matrix.axis_iter_mut(Axis(0)).zip(cohorts) {
        for (cell, &value) in row.iter_mut().zip(cohort.retention) {
            *cell = value;
        }
    }
    matrix
}

#[must_use]
pub fn retention_curve(cohorts: &[Cohort]) -> Vec<f64> {
    let matrix = retention_matrix(cohorts);
    matrix
        .axis_iter(Axis(1))
        .map(|column| {
            let (sum, count) = column
                .iter()
                .filter(|v| v.is_finite())
                .fold((0.0, 0.0), |(sum, count), &v| (sum + v, count + 1.0));
            if count > 0.0 { sum / count } else { 0.0 }
        })
        .collect()
}
