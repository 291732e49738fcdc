//! 12-point hourly temperature line chart.

use crate::{
    model::HourlyPoint,
    view::{ChartId, HOURLY_ROWS, Surface},
};

/// Curve tension of the drawn line; 0 draws straight segments.
pub const DEFAULT_TENSION: f64 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureChart {
    pub labels: Vec<String>,
    pub temperatures: Vec<f64>,
    pub tension: f64,
}

impl Default for TemperatureChart {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            temperatures: Vec::new(),
            tension: DEFAULT_TENSION,
        }
    }
}

impl TemperatureChart {
    pub fn from_hourly(hourly: &[HourlyPoint]) -> Self {
        let points = hourly.iter().take(HOURLY_ROWS);
        Self {
            labels: points.clone().map(|h| h.time.format("%H:%M").to_string()).collect(),
            temperatures: points.map(|h| h.temperature).collect(),
            tension: DEFAULT_TENSION,
        }
    }

    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    /// Lowest and highest temperature, `None` for an empty chart.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.temperatures.iter().copied().fold(None, |acc, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
    }

    /// Sample the smoothed curve through every point, `steps` samples per
    /// segment, with x running over the point indices.
    ///
    /// Uses a cardinal spline with uniform parameterisation; interior
    /// tangents are `1.5 * tension * (next - prev)`, end tangents
    /// `3 * tension * (neighbour - end)`.
    pub fn smoothed(&self, steps: usize) -> Vec<(f64, f64)> {
        let y = &self.temperatures;
        match y.len() {
            0 => return Vec::new(),
            1 => return vec![(0.0, y[0])],
            _ => {}
        }

        let steps = steps.max(1);
        let last = y.len() - 1;
        let tangent = |i: usize| -> f64 {
            if i == 0 {
                3.0 * self.tension * (y[1] - y[0])
            } else if i == last {
                3.0 * self.tension * (y[last] - y[last - 1])
            } else {
                1.5 * self.tension * (y[i + 1] - y[i - 1])
            }
        };

        let mut out = Vec::with_capacity(last * steps + 1);
        for i in 0..last {
            let (p0, p1) = (y[i], y[i + 1]);
            let (m0, m1) = (tangent(i), tangent(i + 1));
            for s in 0..steps {
                let t = s as f64 / steps as f64;
                let t2 = t * t;
                let t3 = t2 * t;
                let value = (2.0 * t3 - 3.0 * t2 + 1.0) * p0
                    + (t3 - 2.0 * t2 + t) * m0
                    + (-2.0 * t3 + 3.0 * t2) * p1
                    + (t3 - t2) * m1;
                out.push((i as f64 + t, value));
            }
        }
        out.push((last as f64, y[last]));
        out
    }
}

/// Holds the handle of the chart currently on screen.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<ChartId>,
}

impl ChartSlot {
    /// Destroy the previous chart, if any, then draw `chart`.
    pub fn redraw<S: Surface + ?Sized>(&mut self, surface: &mut S, chart: &TemperatureChart) {
        if let Some(old) = self.current.take() {
            surface.destroy_chart(old);
        }
        self.current = Some(surface.create_chart(chart));
    }

    pub fn current(&self) -> Option<ChartId> {
        self.current
    }
}
