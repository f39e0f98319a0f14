//! Monthly macro data model consumed by the forecast engine
//!
//! The engine receives an already-expanded monthly grid: every series at
//! monthly frequency, rates as decimals, no gaps. Validation here enforces
//! that contract and fails loudly (naming field and month) instead of
//! letting a silent zero or a raw percentage propagate into the recursion.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A calendar month, the unit of the forecast grid.
///
/// Fiscal years run Oct-Sep and are labeled by the calendar year in which
/// they end, so `2019-10` through `2020-09` are all FY 2020.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, ModelError> {
        if !(1..=12).contains(&month) {
            return Err(ModelError::config(format!(
                "month must be 1-12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month `n` steps later.
    pub fn add_months(&self, n: usize) -> Month {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + n as i64;
        Month {
            year: (zero_based.div_euclid(12)) as i32,
            month: (zero_based.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn next(&self) -> Month {
        self.add_months(1)
    }

    pub fn calendar_year(&self) -> i32 {
        self.year
    }

    /// Fiscal year label: Oct-Sep, named for the ending calendar year.
    pub fn fiscal_year(&self) -> i32 {
        if self.month >= 10 {
            self.year + 1
        } else {
            self.year
        }
    }

    pub fn from_date(date: NaiveDate) -> Month {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = ModelError;

    /// Accepts `YYYY-MM` or a full `YYYY-MM-DD` date (the day is dropped).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Month::from_date(date));
        }
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| ModelError::config(format!("invalid month '{s}', expected YYYY-MM")))?;
        let year: i32 = y
            .parse()
            .map_err(|_| ModelError::config(format!("invalid month '{s}', expected YYYY-MM")))?;
        let month: u32 = m
            .parse()
            .map_err(|_| ModelError::config(format!("invalid month '{s}', expected YYYY-MM")))?;
        Month::new(year, month)
    }
}

impl TryFrom<String> for Month {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Month> for String {
    fn from(m: Month) -> String {
        m.to_string()
    }
}

/// One month of macro inputs.
///
/// All rate fields are annual decimals except `inflation_m`, which is the
/// monthly inflation rate. `nominal_gdp` is an annual-level series repeated
/// monthly; `primary_deficit` is a monthly currency flow (the %GDP-to-level
/// conversion happens upstream, in the macro-expansion collaborator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroPoint {
    pub r_3m: f64,
    pub r_2y: f64,
    pub r_5y: f64,
    pub r_10y: f64,
    pub inflation_m: f64,
    pub nominal_gdp: f64,
    pub primary_deficit: f64,
}

impl MacroPoint {
    /// Every field with its name, the single source of truth for validation.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("r_3m", self.r_3m),
            ("r_2y", self.r_2y),
            ("r_5y", self.r_5y),
            ("r_10y", self.r_10y),
            ("inflation_m", self.inflation_m),
            ("nominal_gdp", self.nominal_gdp),
            ("primary_deficit", self.primary_deficit),
        ]
    }

    /// Field names subject to the decimal-units sanity bound.
    const RATE_FIELDS: [&'static str; 5] = ["r_3m", "r_2y", "r_5y", "r_10y", "inflation_m"];

    fn is_rate_field(name: &str) -> bool {
        Self::RATE_FIELDS.contains(&name)
    }
}

/// A gap-free monthly sequence of macro points starting at a known month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroSeries {
    start: Month,
    points: Vec<MacroPoint>,
}

impl MacroSeries {
    pub fn new(start: Month, points: Vec<MacroPoint>) -> Self {
        Self { start, points }
    }

    pub fn start(&self) -> Month {
        self.start
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[MacroPoint] {
        &self.points
    }

    pub fn month_at(&self, index: usize) -> Month {
        self.start.add_months(index)
    }

    pub fn index_of(&self, month: Month) -> Option<usize> {
        let base = self.start.year() as i64 * 12 + self.start.month() as i64;
        let target = month.year() as i64 * 12 + month.month() as i64;
        let offset = target - base;
        if offset < 0 || offset as usize >= self.points.len() {
            None
        } else {
            Some(offset as usize)
        }
    }

    /// A copy of the `months`-long window starting at `start`.
    pub fn window(&self, start: Month, months: usize) -> Result<MacroSeries, ModelError> {
        let begin = self.index_of(start).ok_or_else(|| {
            ModelError::config(format!("window start {start} is outside the macro series"))
        })?;
        let end = begin + months;
        if end > self.points.len() {
            return Err(ModelError::config(format!(
                "window of {months} months from {start} runs past the end of the macro series \
                 ({} months from {})",
                self.points.len(),
                self.start
            )));
        }
        Ok(MacroSeries::new(start, self.points[begin..end].to_vec()))
    }

    /// Enforce the engine's input contract: every field finite, every rate
    /// a decimal. The first violation aborts with field and month named.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, point) in self.points.iter().enumerate() {
            let month = self.month_at(i);
            for (field, value) in point.fields() {
                if !value.is_finite() {
                    return Err(ModelError::DataGap { field, month });
                }
                if MacroPoint::is_rate_field(field) && value.abs() > 1.0 {
                    return Err(ModelError::SuspectUnits {
                        field,
                        month,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Historical observed monthly total-interest amounts, used only by the
/// calibrator as ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedSeries {
    start: Month,
    totals: Vec<f64>,
}

impl ObservedSeries {
    pub fn new(start: Month, totals: Vec<f64>) -> Self {
        Self { start, totals }
    }

    pub fn start(&self) -> Month {
        self.start
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    pub fn month_at(&self, index: usize) -> Month {
        self.start.add_months(index)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, value) in self.totals.iter().enumerate() {
            if !value.is_finite() {
                return Err(ModelError::DataGap {
                    field: "observed_total",
                    month: self.month_at(i),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_point() -> MacroPoint {
        MacroPoint {
            r_3m: 0.03,
            r_2y: 0.032,
            r_5y: 0.035,
            r_10y: 0.04,
            inflation_m: 0.002,
            nominal_gdp: 1.0e12,
            primary_deficit: 0.0,
        }
    }

    #[test]
    fn test_month_arithmetic_and_labels() {
        let m = Month::new(2019, 10).unwrap();
        assert_eq!(m.next(), Month::new(2019, 11).unwrap());
        assert_eq!(m.add_months(12), Month::new(2020, 10).unwrap());
        assert_eq!(m.add_months(15), Month::new(2021, 1).unwrap());

        // FY boundary: Sep belongs to the ending FY, Oct starts the next one
        assert_eq!(Month::new(2020, 9).unwrap().fiscal_year(), 2020);
        assert_eq!(Month::new(2020, 10).unwrap().fiscal_year(), 2021);
        assert_eq!(Month::new(2020, 9).unwrap().calendar_year(), 2020);
    }

    #[test]
    fn test_month_parse_and_display() {
        let m: Month = "2021-03".parse().unwrap();
        assert_eq!(m, Month::new(2021, 3).unwrap());
        let m: Month = "2021-03-31".parse().unwrap();
        assert_eq!(m, Month::new(2021, 3).unwrap());
        assert_eq!(m.to_string(), "2021-03");
        assert!("2021-13".parse::<Month>().is_err());
        assert!("garbage".parse::<Month>().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_with_field_and_month() {
        let mut points = vec![flat_point(); 6];
        points[3].inflation_m = f64::NAN;
        let series = MacroSeries::new(Month::new(2020, 1).unwrap(), points);

        match series.validate() {
            Err(ModelError::DataGap { field, month }) => {
                assert_eq!(field, "inflation_m");
                assert_eq!(month, Month::new(2020, 4).unwrap());
            }
            other => panic!("expected DataGap, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_raw_percentage() {
        let mut points = vec![flat_point(); 3];
        points[1].r_3m = 4.4; // a percentage that crossed the boundary unconverted
        let series = MacroSeries::new(Month::new(2020, 1).unwrap(), points);

        match series.validate() {
            Err(ModelError::SuspectUnits { field, month, value }) => {
                assert_eq!(field, "r_3m");
                assert_eq!(month, Month::new(2020, 2).unwrap());
                assert_eq!(value, 4.4);
            }
            other => panic!("expected SuspectUnits, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_allows_negative_rates() {
        let mut points = vec![flat_point(); 2];
        points[0].r_3m = -0.005;
        points[1].inflation_m = -0.001; // deflation is valid input
        let series = MacroSeries::new(Month::new(2020, 1).unwrap(), points);
        assert!(series.validate().is_ok());
    }

    #[test]
    fn test_window_extraction() {
        let series = MacroSeries::new(Month::new(2020, 1).unwrap(), vec![flat_point(); 24]);
        let window = series.window(Month::new(2020, 7).unwrap(), 12).unwrap();
        assert_eq!(window.len(), 12);
        assert_eq!(window.start(), Month::new(2020, 7).unwrap());
        assert_eq!(window.month_at(11), Month::new(2021, 6).unwrap());

        assert!(series.window(Month::new(2019, 1).unwrap(), 6).is_err());
        assert!(series.window(Month::new(2020, 7).unwrap(), 24).is_err());
    }

    #[test]
    fn test_index_of() {
        let series = MacroSeries::new(Month::new(2020, 11).unwrap(), vec![flat_point(); 4]);
        assert_eq!(series.index_of(Month::new(2020, 11).unwrap()), Some(0));
        assert_eq!(series.index_of(Month::new(2021, 2).unwrap()), Some(3));
        assert_eq!(series.index_of(Month::new(2021, 3).unwrap()), None);
        assert_eq!(series.index_of(Month::new(2020, 10).unwrap()), None);
    }
}
