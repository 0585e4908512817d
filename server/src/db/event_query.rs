//! Filtered listing query over events.
//!
//! Filter kinds combine with AND; the free-text search matches any of the
//! searchable columns. Rows always come back ordered by start time.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const EVENT_SELECT: &str = "SELECT e.id, e.title, e.description, e.start_datetime, \
     e.end_datetime, e.location_name, e.street_name, e.street_number, e.postal_code, \
     e.latitude, e.longitude, e.file_path, e.category_id, c.name AS category_name, \
     e.created_at \
     FROM event e LEFT JOIN category c ON c.id = e.category_id";

const SEARCH_COLUMNS: &[&str] = &["e.title", "e.description", "e.location_name", "e.street_name"];

/// Raw listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub search: Option<String>,
    /// Inclusive lower bound on the start time.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the end time, covering the whole day.
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i64>,
}

impl EventFilter {
    /// Parses listing parameters. Values that cannot be parsed are left out
    /// of the filter and reported as warnings instead of failing the request.
    pub fn from_params(params: &ListParams) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let start_date = parse_date(params.start_date.as_deref(), "start", &mut warnings);
        let end_date = parse_date(params.end_date.as_deref(), "end", &mut warnings);

        let category_id = match params.category_id.as_deref().map(str::trim) {
            None | Some("") | Some("0") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warnings.push(format!(
                        "Invalid category '{raw}'; the category filter was ignored"
                    ));
                    None
                }
            },
        };

        (
            Self {
                search,
                start_date,
                end_date,
                category_id,
            },
            warnings,
        )
    }
}

fn parse_date(raw: Option<&str>, label: &str, warnings: &mut Vec<String>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            warnings.push(format!(
                "Invalid {label} date '{raw}', expected YYYY-MM-DD; the {label} date filter was ignored"
            ));
            None
        }
    }
}

fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Search case folding is SQLite's `LOWER`, which only folds ASCII letters.
pub fn build_query(filter: &EventFilter) -> QueryBuilder<'static, Sqlite> {
    let mut query = QueryBuilder::new(EVENT_SELECT);
    let mut keyword = " WHERE ";

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));

        query.push(keyword).push("(");
        for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
            if i > 0 {
                query.push(" OR ");
            }
            query
                .push(format!("LOWER({column}) LIKE LOWER("))
                .push_bind(pattern.clone())
                .push(") ESCAPE '\\'");
        }
        query.push(")");
        keyword = " AND ";
    }

    if let Some(start_date) = filter.start_date {
        query
            .push(keyword)
            .push("e.start_datetime >= ")
            .push_bind(start_of(start_date));
        keyword = " AND ";
    }

    if let Some(end_date) = filter.end_date {
        // Before midnight of the following day, so the whole end day counts
        if let Some(next_day) = end_date.succ_opt() {
            query
                .push(keyword)
                .push("e.end_datetime < ")
                .push_bind(start_of(next_day));
            keyword = " AND ";
        }
    }

    if let Some(category_id) = filter.category_id {
        query
            .push(keyword)
            .push("e.category_id = ")
            .push_bind(category_id);
    }

    query.push(" ORDER BY e.start_datetime ASC");
    query
}
