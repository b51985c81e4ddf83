//! CSV rendering for generated reports.

use chrono::NaiveDate;

use crate::{Result, promotion::PromotionReport};

/// Fixed header row of the promotion report.
pub const PROMOTION_HEADERS: [&str; 6] = [
  "characteristic",
  "number substantively promoted",
  "percentage substantively promoted",
  "number temporarily promoted",
  "percentage temporarily promoted",
  "total in group",
];

/// Render a rate as a whole-number percent string, e.g. `0.25` → `"25%"`.
pub fn format_percent(rate: f64) -> String {
  format!("{:.0}%", rate * 100.0)
}

/// Download filename for a promotion report generated on `generated_on`.
pub fn promotion_filename(
  report: &PromotionReport,
  generated_on: NaiveDate,
) -> String {
  format!(
    "promotions-by-{}-{}-{}-generated-{}",
    report.dimension,
    report.scheme,
    report.year,
    generated_on.format("%d-%m-%Y"),
  )
}

/// Render the report as CSV: the fixed header row, then one row per
/// dimension value.
pub fn promotion_csv(report: &PromotionReport) -> Result<String> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(PROMOTION_HEADERS)?;

  for row in &report.rows {
    writer.write_record([
      row.label.as_str(),
      &row.substantive.count.to_string(),
      &format_percent(row.substantive.rate),
      &row.temporary.count.to_string(),
      &format_percent(row.temporary.rate),
      &row.total.to_string(),
    ])?;
  }

  let bytes = writer
    .into_inner()
    .map_err(|e| csv::Error::from(e.into_error()))?;
  Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
  use tracker_core::lookup::ReportDimension;

  use super::*;
  use crate::promotion::{GroupCount, PromotionReportRow};

  fn report() -> PromotionReport {
    PromotionReport {
      scheme:       "FLS".into(),
      year:         2019,
      dimension:    ReportDimension::Ethnicity,
      window_start: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
      window_end:   NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
      rows:         vec![
        PromotionReportRow {
          label:       "Arab".into(),
          substantive: GroupCount { count: 1, rate: 0.25 },
          temporary:   GroupCount { count: 0, rate: 0.0 },
          total:       4,
        },
        PromotionReportRow {
          label:       "Prefer not to say".into(),
          substantive: GroupCount { count: 0, rate: 0.0 },
          temporary:   GroupCount { count: 0, rate: 0.0 },
          total:       0,
        },
      ],
    }
  }

  #[test]
  fn percentages_render_as_whole_numbers() {
    assert_eq!(format_percent(0.25), "25%");
    assert_eq!(format_percent(0.0), "0%");
    assert_eq!(format_percent(1.0), "100%");
    assert_eq!(format_percent(1.0 / 3.0), "33%");
  }

  #[test]
  fn csv_has_the_fixed_header_and_one_row_per_value() {
    let csv = promotion_csv(&report()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
      lines.next().unwrap(),
      "characteristic,number substantively promoted,\
       percentage substantively promoted,number temporarily promoted,\
       percentage temporarily promoted,total in group"
    );
    assert_eq!(lines.next().unwrap(), "Arab,1,25%,0,0%,4");
    // A zero-total group renders 0% without a division fault.
    assert_eq!(lines.next().unwrap(), "Prefer not to say,0,0%,0,0%,0");
    assert!(lines.next().is_none());
  }

  #[test]
  fn filename_names_dimension_scheme_and_year() {
    let name = promotion_filename(
      &report(),
      NaiveDate::from_ymd_opt(2020, 4, 2).unwrap(),
    );
    assert_eq!(name, "promotions-by-ethnicity-FLS-2019-generated-02-04-2020");
  }
}
