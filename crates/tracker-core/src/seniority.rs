//! Grade eligibility and seniority policy.
//!
//! Both rules are business policy over the grade list, not schema: scheme
//! eligibility is a name-prefix convention, and promotion targets are a rank
//! window. They are pure functions so callers can apply them to whatever
//! grade snapshot they hold.

use crate::lookup::Grade;

/// Grades a scheme accepts applications from.
///
/// "FLS" admits grades named with the `Grade` prefix; every other scheme uses
/// the `Deputy` prefix. This is a naming convention, not a foreign key, and
/// the asymmetric else-branch is deliberate.
pub fn eligible_grades(scheme_name: &str, grades: &[Grade]) -> Vec<Grade> {
  let prefix = if scheme_name == "FLS" { "Grade" } else { "Deputy" };
  grades
    .iter()
    .filter(|g| g.value.starts_with(prefix))
    .cloned()
    .collect()
}

/// Grades one below, equal to, or more senior than `current`, ordered most
/// senior first.
///
/// The one-below tolerance exists because a candidate mid-way through a
/// temporary promotion should still see grades at their substantive level.
/// Remember the more senior the grade, the lower the rank value.
pub fn grades_reachable_from(current: &Grade, grades: &[Grade]) -> Vec<Grade> {
  let mut reachable: Vec<Grade> = grades
    .iter()
    .filter(|g| g.rank <= current.rank + 1)
    .cloned()
    .collect();
  reachable.sort_by_key(|g| g.rank);
  reachable
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grade(id: i64, value: &str, rank: i64) -> Grade {
    Grade { id, value: value.into(), rank }
  }

  fn fixture() -> Vec<Grade> {
    vec![
      grade(1, "Admin Assistant (AA)", 7),
      grade(2, "Grade 7", 6),
      grade(3, "Grade 6", 5),
      grade(4, "Deputy Director (SCS1)", 4),
    ]
  }

  #[test]
  fn fls_admits_grade_prefixed_grades() {
    let values: Vec<String> = eligible_grades("FLS", &fixture())
      .into_iter()
      .map(|g| g.value)
      .collect();
    assert_eq!(values, ["Grade 7", "Grade 6"]);
  }

  #[test]
  fn any_other_scheme_admits_deputy_prefixed_grades() {
    for scheme in ["SLS", "anything else"] {
      let values: Vec<String> = eligible_grades(scheme, &fixture())
        .into_iter()
        .map(|g| g.value)
        .collect();
      assert_eq!(values, ["Deputy Director (SCS1)"], "scheme {scheme:?}");
    }
  }

  #[test]
  fn reachable_includes_one_rank_below_and_everything_above() {
    let current = grade(9, "One below SCS", 5);
    let values: Vec<String> = grades_reachable_from(&current, &fixture())
      .into_iter()
      .map(|g| g.value)
      .collect();
    // Ordered most senior first; rank 7 is out of reach.
    assert_eq!(values, ["Deputy Director (SCS1)", "Grade 6", "Grade 7"]);
  }

  #[test]
  fn reachable_includes_the_current_grade_itself() {
    let grades = fixture();
    let current = grades[1].clone();
    let reachable = grades_reachable_from(&current, &grades);
    assert!(reachable.iter().any(|g| g.id == current.id));
    assert!(reachable.iter().all(|g| g.rank <= current.rank + 1));
  }
}
