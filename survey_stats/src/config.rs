// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Separator between the selections of a multiple-choice answer.
pub const MULTI_SELECT_DELIMITER: char = ';';

/// Label of the bucket counting unanswered questions, when requested.
pub const MISSING_LABEL: &str = "(missing)";

/// The raw content of one cell of a survey.
///
/// Text is always trimmed and never empty: blank cells are `Missing`.
#[derive(PartialEq, Debug, Clone)]
pub enum Answer {
    Missing,
    Number(f64),
    Text(String),
}

impl Answer {
    pub fn from_text(s: &str) -> Answer {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Answer::Missing
        } else {
            Answer::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Answer::Missing)
    }

    /// The string under which this answer is counted and filtered.
    pub fn key(&self) -> Option<String> {
        match self {
            Answer::Missing => None,
            Answer::Number(f) => Some(format_number(*f)),
            Answer::Text(s) => Some(s.clone()),
        }
    }

    /// Numbers, and text that reads as a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Missing => None,
            Answer::Number(f) if f.is_finite() => Some(*f),
            Answer::Number(_) => None,
            Answer::Text(s) => s.parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }

    /// The individual selections of a multiple-choice answer, trimmed, without
    /// empty parts and without repeats.
    pub fn selections(&self) -> Vec<String> {
        let raw = match self.key() {
            Some(k) => k,
            None => return Vec::new(),
        };
        let mut res: Vec<String> = Vec::new();
        for part in raw.split(MULTI_SELECT_DELIMITER) {
            let part = part.trim();
            if !part.is_empty() && !res.iter().any(|p| p == part) {
                res.push(part.to_string());
            }
        }
        res
    }
}

/// Integral values are printed without a fractional part, so that `25.0` read from a
/// spreadsheet and `25` read from a CSV file end up in the same bucket.
pub fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Numeric,
    Text,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
        QuestionType::Numeric,
        QuestionType::Text,
    ];

    /// Short code used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "SC",
            QuestionType::MultipleChoice => "MC",
            QuestionType::Numeric => "NUMERIC",
            QuestionType::Text => "TEXT",
        }
    }

    pub fn from_code(code: &str) -> Option<QuestionType> {
        QuestionType::ALL
            .iter()
            .find(|qt| qt.code().eq_ignore_ascii_case(code))
            .cloned()
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Question {
    /// The column name in the source files.
    pub id: String,
    pub label: String,
    pub question_type: QuestionType,
    /// Known options in first-seen order. Only filled for choice questions.
    pub options: Vec<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Respondent {
    pub id: String,
    /// One answer per column of the table, in column order.
    pub answers: Vec<Answer>,
}

/// The respondents of a survey, concatenated from all the input files.
///
/// Only built through [`crate::builder::TableBuilder`], which guarantees that the
/// column names are unique and that every respondent has one answer per column.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyTable {
    pub(crate) columns: Vec<String>,
    pub(crate) respondents: Vec<Respondent>,
}

impl SurveyTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn respondents(&self) -> &[Respondent] {
        &self.respondents
    }

    pub fn len(&self) -> usize {
        self.respondents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.respondents.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// A view over every respondent.
    pub fn all(&self) -> Subset<'_> {
        Subset {
            table: self,
            rows: self.respondents.iter().collect(),
        }
    }
}

/// A read-only selection of the respondents of a table, in table order.
#[derive(PartialEq, Debug, Clone)]
pub struct Subset<'a> {
    pub(crate) table: &'a SurveyTable,
    pub(crate) rows: Vec<&'a Respondent>,
}

impl<'a> Subset<'a> {
    pub fn table(&self) -> &'a SurveyTable {
        self.table
    }

    pub fn rows(&self) -> &[&'a Respondent] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The answers of one column, in row order.
    pub(crate) fn column_answers(&self, col_idx: usize) -> impl Iterator<Item = &'a Answer> + '_ {
        self.rows
            .iter()
            .copied()
            .filter_map(move |r| r.answers.get(col_idx))
    }
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct DistributionEntry {
    pub value: String,
    pub count: u64,
    /// Fraction of the respondents who answered, between 0 and 1.
    pub share: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Distribution {
    pub question: String,
    pub question_type: QuestionType,
    /// Number of respondents in the analysed subset.
    pub total_respondents: usize,
    /// Number of respondents with a non-missing answer.
    pub answered: usize,
    /// Ordered by decreasing count.
    pub entries: Vec<DistributionEntry>,
}

impl Distribution {
    /// Keeps the `n` most frequent answers. The shares are not recomputed.
    pub fn top_n(&self, n: usize) -> Distribution {
        let mut res = self.clone();
        res.entries.truncate(n);
        res
    }

    pub fn response_rate(&self) -> f64 {
        if self.total_respondents == 0 {
            0.0
        } else {
            self.answered as f64 / self.total_respondents as f64
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct NumericSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// Errors that prevent an analysis from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StatsError {
    /// The question is not part of the catalog.
    UnknownQuestion(String),
    DuplicateColumn(String),
    /// A respondent does not have one answer per column.
    RowLength {
        respondent: String,
        expected: usize,
        found: usize,
    },
}

impl Error for StatsError {}

impl Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsError::UnknownQuestion(q) => write!(f, "unknown question {:?}", q),
            StatsError::DuplicateColumn(c) => write!(f, "column {:?} appears more than once", c),
            StatsError::RowLength {
                respondent,
                expected,
                found,
            } => write!(
                f,
                "respondent {} has {} answers, expected {}",
                respondent, found, expected
            ),
        }
    }
}

// ********* Configuration **********

/// Rules for inferring the type of each question.
#[derive(PartialEq, Debug, Clone)]
pub struct CatalogRules {
    /// A column without `;` is single-choice when it has strictly fewer distinct
    /// answers than this value. Otherwise it is free text.
    pub single_choice_max_distinct: usize,
    /// Optional additional bound on `distinct answers / answered respondents`.
    pub single_choice_max_ratio: Option<f64>,
}

impl CatalogRules {
    pub const DEFAULT_RULES: CatalogRules = CatalogRules {
        single_choice_max_distinct: 50,
        single_choice_max_ratio: None,
    };
}

impl Default for CatalogRules {
    fn default() -> Self {
        CatalogRules::DEFAULT_RULES
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct DistributionOptions {
    /// Adds a bucket for the missing answers. The shares are then computed over
    /// all the respondents instead of the ones who answered.
    pub include_missing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(Answer::from_text("   "), Answer::Missing);
        assert_eq!(Answer::from_text(" Go "), Answer::Text("Go".to_string()));
    }

    #[test]
    fn number_keys() {
        assert_eq!(Answer::Number(25.0).key(), Some("25".to_string()));
        assert_eq!(Answer::Number(2.5).key(), Some("2.5".to_string()));
        assert_eq!(Answer::Missing.key(), None);
    }

    #[test]
    fn text_numbers() {
        assert_eq!(Answer::from_text("12.5").as_number(), Some(12.5));
        assert_eq!(Answer::from_text("NaN").as_number(), None);
        assert_eq!(Answer::from_text("Go").as_number(), None);
    }

    #[test]
    fn selections_are_trimmed_and_unique() {
        let a = Answer::from_text("Python; Go;;Python ;");
        assert_eq!(a.selections(), vec!["Python".to_string(), "Go".to_string()]);
        assert!(Answer::Missing.selections().is_empty());
    }

    #[test]
    fn question_type_codes() {
        assert_eq!(QuestionType::from_code("mc"), Some(QuestionType::MultipleChoice));
        assert_eq!(QuestionType::from_code("numeric"), Some(QuestionType::Numeric));
        assert_eq!(QuestionType::from_code("other"), None);
    }

    #[test]
    fn top_n_keeps_shares() {
        let d = Distribution {
            question: "Q".to_string(),
            question_type: QuestionType::SingleChoice,
            total_respondents: 4,
            answered: 4,
            entries: vec![
                DistributionEntry {
                    value: "a".to_string(),
                    count: 3,
                    share: 0.75,
                },
                DistributionEntry {
                    value: "b".to_string(),
                    count: 1,
                    share: 0.25,
                },
            ],
        };
        let top = d.top_n(1);
        assert_eq!(top.entries.len(), 1);
        assert_eq!(top.entries[0].share, 0.75);
        assert_eq!(top.response_rate(), 1.0);
    }
}
