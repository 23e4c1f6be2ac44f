//! Query-string filters for the list endpoint.
//!
//! # Design
//! A `Filter` is a conjunction of `Condition`s built from recognized query
//! parameters. Each field name adds an equality condition; `window=N` adds an
//! upper bound on `deadline_at` relative to the supplied `now`. The in-memory
//! store evaluates a filter with `Filter::matches`, SQL stores walk
//! `Filter::conditions` and compile them into a `WHERE` clause.
//!
//! A record without a deadline never satisfies a `deadline_at` condition.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::ApiError;
use crate::schema::Field;
use crate::types::Todo;
use crate::validate::parse_datetime;

/// Query parameter for the relative-date window filter.
pub const WINDOW_PARAM: &str = "window";

/// Comparison applied by a `Condition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    AtMost,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::AtMost => "<=",
        }
    }
}

/// A typed value compared against a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Int(i64),
    Text(String),
    Bool(bool),
    Timestamp(NaiveDateTime),
}

/// One `field <op> value` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: Field,
    pub op: Op,
    pub value: FilterValue,
}

impl Condition {
    fn equals(field: Field, value: FilterValue) -> Self {
        Condition {
            field,
            op: Op::Eq,
            value,
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        match (self.field, &self.value) {
            (Field::Id, FilterValue::Int(id)) => self.compare(&todo.id, id),
            (Field::Title, FilterValue::Text(title)) => self.compare(&todo.title, title),
            (Field::Description, FilterValue::Text(text)) => self.compare(&todo.description, text),
            (Field::Completed, FilterValue::Bool(done)) => self.compare(&todo.completed, done),
            (Field::DeadlineAt, FilterValue::Timestamp(at)) => todo
                .deadline_at
                .as_ref()
                .is_some_and(|deadline| self.compare(deadline, at)),
            (Field::CreatedAt, FilterValue::Timestamp(at)) => self.compare(&todo.created_at, at),
            (Field::UpdatedAt, FilterValue::Timestamp(at)) => self.compare(&todo.updated_at, at),
            _ => false,
        }
    }

    fn compare<T: PartialOrd>(&self, actual: &T, expected: &T) -> bool {
        match self.op {
            Op::Eq => actual == expected,
            Op::AtMost => actual <= expected,
        }
    }
}

/// Conjunctive filter over todo records. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Build a filter from query parameters. The first occurrence of a
    /// repeated parameter wins; unrecognized parameters are ignored.
    pub fn from_query(params: &[(String, String)], now: NaiveDateTime) -> Result<Self, ApiError> {
        let lookup = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        let mut conditions = Vec::new();
        for field in Field::ALL {
            if let Some(raw) = lookup(field.as_str()) {
                conditions.push(Condition::equals(field, field_value(field, raw)?));
            }
        }

        if let Some(raw) = lookup(WINDOW_PARAM) {
            conditions.push(Condition {
                field: Field::DeadlineAt,
                op: Op::AtMost,
                value: FilterValue::Timestamp(window_end(raw, now)?),
            });
        }

        Ok(Filter { conditions })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        self.conditions.iter().all(|condition| condition.matches(todo))
    }
}

fn field_value(field: Field, raw: &str) -> Result<FilterValue, ApiError> {
    match field {
        Field::Id => raw
            .trim()
            .parse()
            .map(FilterValue::Int)
            .map_err(|_| ApiError::InvalidFilterValue(field)),
        Field::Completed => Ok(FilterValue::Bool(raw.to_lowercase() == "true")),
        Field::Title | Field::Description => Ok(FilterValue::Text(raw.to_string())),
        Field::DeadlineAt | Field::CreatedAt | Field::UpdatedAt => parse_datetime(raw)
            .map(FilterValue::Timestamp)
            .ok_or(ApiError::InvalidFilterValue(field)),
    }
}

fn window_end(raw: &str, now: NaiveDateTime) -> Result<NaiveDateTime, ApiError> {
    let days: i64 = raw.trim().parse().map_err(|_| ApiError::InvalidWindowValue)?;
    TimeDelta::try_days(days)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or(ApiError::InvalidWindowValue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 3, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn todo(id: i64, completed: bool, deadline_at: Option<NaiveDateTime>) -> Todo {
        Todo {
            id,
            title: format!("todo {id}"),
            description: String::new(),
            completed,
            deadline_at,
            created_at: day(1),
            updated_at: day(1),
        }
    }

    fn filter(pairs: &[(&str, &str)]) -> Filter {
        Filter::from_query(&params(pairs), day(10)).unwrap()
    }

    #[test]
    fn empty_query_matches_everything() {
        let f = filter(&[]);
        assert!(f.is_empty());
        assert!(f.matches(&todo(1, true, None)));
    }

    #[test]
    fn unknown_params_are_ignored() {
        assert!(filter(&[("page", "2"), ("sort", "title")]).is_empty());
    }

    #[test]
    fn id_filter_parses_integers() {
        let f = filter(&[("id", "2")]);
        assert!(f.matches(&todo(2, false, None)));
        assert!(!f.matches(&todo(3, false, None)));
    }

    #[test]
    fn non_numeric_id_is_an_error() {
        let err = Filter::from_query(&params(&[("id", "abc")]), day(10)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilterValue(Field::Id)));
    }

    #[test]
    fn completed_filter_is_case_insensitive() {
        let f = filter(&[("completed", "TRUE")]);
        assert!(f.matches(&todo(1, true, None)));
        assert!(!f.matches(&todo(1, false, None)));
    }

    #[test]
    fn any_other_completed_value_means_false() {
        for raw in ["false", "no", "1", ""] {
            let f = filter(&[("completed", raw)]);
            assert!(f.matches(&todo(1, false, None)), "{raw}");
            assert!(!f.matches(&todo(1, true, None)), "{raw}");
        }
    }

    #[test]
    fn text_filters_use_exact_equality() {
        let f = filter(&[("title", "todo 4")]);
        assert!(f.matches(&todo(4, false, None)));
        let f = filter(&[("title", "todo")]);
        assert!(!f.matches(&todo(4, false, None)));
    }

    #[test]
    fn timestamp_filters_compare_parsed_values() {
        let f = filter(&[("created_at", "2023-03-01 12:00:00")]);
        assert!(f.matches(&todo(1, false, None)));
        let f = filter(&[("deadline_at", "2023-03-05T12:00:00")]);
        assert!(f.matches(&todo(1, false, Some(day(5)))));
        assert!(!f.matches(&todo(1, false, None)));
    }

    #[test]
    fn bad_timestamp_filter_is_an_error() {
        let err = Filter::from_query(&params(&[("updated_at", "yesterday")]), day(10)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilterValue(Field::UpdatedAt)));
    }

    #[test]
    fn window_bounds_deadline_relative_to_now() {
        let f = filter(&[("window", "5")]);
        assert!(f.matches(&todo(1, false, Some(day(15)))));
        assert!(f.matches(&todo(2, false, Some(day(2)))));
        assert!(!f.matches(&todo(3, false, Some(day(16)))));
        assert!(!f.matches(&todo(4, false, None)));
    }

    #[test]
    fn window_accepts_sign_and_whitespace() {
        let f = filter(&[("window", " -2 ")]);
        assert!(f.matches(&todo(1, false, Some(day(8)))));
        assert!(!f.matches(&todo(2, false, Some(day(9)))));
    }

    #[test]
    fn invalid_window_is_an_error() {
        for raw in ["abc", "1.5", "", "99999999999999"] {
            let err = Filter::from_query(&params(&[("window", raw)]), day(10)).unwrap_err();
            assert!(matches!(err, ApiError::InvalidWindowValue), "{raw}");
        }
    }

    #[test]
    fn conditions_combine_with_and() {
        let f = filter(&[("window", "5"), ("completed", "true")]);
        assert_eq!(f.conditions().len(), 2);
        assert!(f.matches(&todo(1, true, Some(day(11)))));
        assert!(!f.matches(&todo(2, false, Some(day(11)))));
        assert!(!f.matches(&todo(3, true, Some(day(20)))));
    }

    #[test]
    fn first_occurrence_of_a_param_wins() {
        let f = filter(&[("id", "1"), ("id", "2")]);
        assert!(f.matches(&todo(1, false, None)));
        assert!(!f.matches(&todo(2, false, None)));
    }
}
