//! Heuristic years-of-experience estimates from free-text dates.
//!
//! The results only seed generation requests; they are never stored in the
//! document.

use chrono::Datelike;

use crate::document::WorkExperience;

/// Returned by [`estimate_total_years`] when no entry yields a usable range.
pub const FALLBACK_TOTAL_YEARS: i32 = 3;

/// The first run of four ASCII digits in `text`, e.g. `"Jan 2020"` → 2020.
/// A run of `0000` counts as no year.
pub fn first_year(text: &str) -> Option<i32> {
  let year = text
    .as_bytes()
    .windows(4)
    .find(|w| w.iter().all(u8::is_ascii_digit))
    .map(|w| {
      w.iter()
        .fold(0, |acc, digit| acc * 10 + i32::from(digit - b'0'))
    })?;
  (year != 0).then_some(year)
}

/// End year of a range: `"present"` (any case, nothing around it) is
/// `current_year`.
pub fn end_year(text: &str, current_year: i32) -> Option<i32> {
  if text.eq_ignore_ascii_case("present") {
    Some(current_year)
  } else {
    first_year(text)
  }
}

fn span(job: &WorkExperience, current_year: i32) -> Option<i32> {
  let start = first_year(&job.start_date)?;
  let end = end_year(&job.end_date, current_year)?;
  Some(end - start)
}

/// Total years across all jobs.
///
/// Jobs whose start or end year cannot be read contribute nothing. Reversed
/// ranges contribute a negative amount. A total of zero yields
/// [`FALLBACK_TOTAL_YEARS`].
pub fn estimate_total_years(jobs: &[WorkExperience], current_year: i32) -> i32 {
  let total: i32 = jobs.iter().filter_map(|job| span(job, current_year)).sum();
  if total == 0 { FALLBACK_TOTAL_YEARS } else { total }
}

/// Years spent in a single role, at least one.
pub fn years_in_role(job: &WorkExperience, current_year: i32) -> i32 {
  span(job, current_year).map_or(1, |years| years.max(1))
}

/// The current calendar year in UTC.
pub fn current_year() -> i32 { chrono::Utc::now().year() }

#[cfg(test)]
mod tests {
  use super::*;

  fn job(start: &str, end: &str) -> WorkExperience {
    WorkExperience {
      start_date: start.into(),
      end_date: end.into(),
      ..WorkExperience::blank()
    }
  }

  #[test]
  fn first_year_takes_first_four_digit_run() {
    assert_eq!(first_year("January 2020"), Some(2020));
    assert_eq!(first_year("2018-2021"), Some(2018));
    assert_eq!(first_year("12345"), Some(1234));
    assert_eq!(first_year("Q3 '19"), None);
    assert_eq!(first_year(""), None);
    assert_eq!(first_year("0000"), None);
  }

  #[test]
  fn present_is_current_year_in_any_case() {
    assert_eq!(end_year("Present", 2024), Some(2024));
    assert_eq!(end_year("PRESENT", 2024), Some(2024));
    assert_eq!(end_year(" Present ", 2024), None);
    assert_eq!(end_year("Dec 2022", 2024), Some(2022));
    assert_eq!(end_year("now", 2024), None);
  }

  #[test]
  fn sums_all_parsable_ranges() {
    let jobs = [job("2018", "2021"), job("2021", "Present")];
    assert_eq!(estimate_total_years(&jobs, 2024), 6);
  }

  #[test]
  fn unparsable_entries_contribute_nothing() {
    let jobs = [job("2015", "2019"), job("sometime", "2020"), job("2019", "")];
    assert_eq!(estimate_total_years(&jobs, 2024), 4);
  }

  #[test]
  fn falls_back_when_nothing_parses() {
    let jobs = [job("", ""), job("last spring", "now")];
    assert_eq!(estimate_total_years(&jobs, 2024), FALLBACK_TOTAL_YEARS);
    assert_eq!(estimate_total_years(&[], 2024), FALLBACK_TOTAL_YEARS);
  }

  #[test]
  fn zero_total_also_falls_back() {
    let jobs = [job("2020", "2020")];
    assert_eq!(estimate_total_years(&jobs, 2024), FALLBACK_TOTAL_YEARS);
  }

  #[test]
  fn negative_ranges_are_not_clamped() {
    // Reversed dates subtract from the total rather than being ignored.
    let jobs = [job("2022", "2018"), job("2010", "2020")];
    assert_eq!(estimate_total_years(&jobs, 2024), 6);

    let reversed_only = [job("2022", "2018")];
    assert_eq!(estimate_total_years(&reversed_only, 2024), -4);
  }

  #[test]
  fn years_in_role_has_a_floor_of_one() {
    assert_eq!(years_in_role(&job("2019", "2023"), 2024), 4);
    assert_eq!(years_in_role(&job("2023", "2023"), 2024), 1);
    assert_eq!(years_in_role(&job("2023", "2019"), 2024), 1);
    assert_eq!(years_in_role(&job("", "Present"), 2024), 1);
    assert_eq!(years_in_role(&job("2021", "present"), 2024), 3);
  }
}
