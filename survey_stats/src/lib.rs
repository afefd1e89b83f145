pub mod builder;
mod config;
pub mod manual;

use log::{debug, info};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;

/// The questions of a survey, one per column of the table, in column order.
#[derive(PartialEq, Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Derives the type and the options of every column of the table.
    pub fn infer(table: &SurveyTable, rules: &CatalogRules) -> Catalog {
        info!(
            "Inferring catalog for {:?} columns over {:?} respondents, rules: {:?}",
            table.columns().len(),
            table.len(),
            rules
        );
        let all = table.all();
        let questions: Vec<Question> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let answers: Vec<&Answer> = all
                    .column_answers(idx)
                    .filter(|a| !a.is_missing())
                    .collect();
                let question_type = infer_question_type(&answers, rules);
                let options = extract_options(&answers, question_type);
                debug!(
                    "Catalog::infer: column {:?}: {:?} with {:?} options",
                    name,
                    question_type,
                    options.len()
                );
                Question {
                    id: name.clone(),
                    label: generate_label(name),
                    question_type,
                    options,
                }
            })
            .collect();
        Catalog::from_questions(questions)
    }

    fn from_questions(questions: Vec<Question>) -> Catalog {
        let by_id = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| (q.id.clone(), idx))
            .collect();
        Catalog { questions, by_id }
    }

    /// Returns a new catalog in which the labels of the given questions are replaced.
    /// Identifiers that are not in the catalog are ignored.
    pub fn with_labels(&self, labels: &HashMap<String, String>) -> Catalog {
        let questions = self
            .questions
            .iter()
            .map(|q| match labels.get(&q.id) {
                Some(label) => Question {
                    label: label.clone(),
                    ..q.clone()
                },
                None => q.clone(),
            })
            .collect();
        Catalog::from_questions(questions)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&Question, StatsError> {
        self.by_id
            .get(id)
            .map(|idx| &self.questions[*idx])
            .ok_or_else(|| StatsError::UnknownQuestion(id.to_string()))
    }

    pub fn questions_by_type(&self, question_type: QuestionType) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.question_type == question_type)
            .collect()
    }

    /// Number of questions of each type, for the types that are present.
    pub fn type_counts(&self) -> Vec<(QuestionType, usize)> {
        QuestionType::ALL
            .iter()
            .map(|qt| (*qt, self.questions_by_type(*qt).len()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

fn infer_question_type(answers: &[&Answer], rules: &CatalogRules) -> QuestionType {
    // Nothing to look at: default to single-choice.
    if answers.is_empty() {
        return QuestionType::SingleChoice;
    }
    if answers.iter().all(|a| a.as_number().is_some()) {
        return QuestionType::Numeric;
    }
    let has_delimiter = answers
        .iter()
        .any(|a| matches!(a, Answer::Text(s) if s.contains(MULTI_SELECT_DELIMITER)));
    if has_delimiter {
        return QuestionType::MultipleChoice;
    }
    let distinct: HashSet<String> = answers.iter().filter_map(|a| a.key()).collect();
    let below_count = distinct.len() < rules.single_choice_max_distinct;
    let below_ratio = match rules.single_choice_max_ratio {
        Some(ratio) => (distinct.len() as f64) / (answers.len() as f64) < ratio,
        None => true,
    };
    if below_count && below_ratio {
        QuestionType::SingleChoice
    } else {
        QuestionType::Text
    }
}

fn extract_options(answers: &[&Answer], question_type: QuestionType) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    match question_type {
        QuestionType::SingleChoice => {
            for k in answers.iter().filter_map(|a| a.key()) {
                if seen.insert(k.clone()) {
                    res.push(k);
                }
            }
        }
        QuestionType::MultipleChoice => {
            for a in answers.iter() {
                for s in a.selections() {
                    if seen.insert(s.clone()) {
                        res.push(s);
                    }
                }
            }
        }
        QuestionType::Numeric | QuestionType::Text => {}
    }
    res
}

/// Builds a readable label out of a column name: punctuation becomes spaces, the
/// whitespace is collapsed and a question mark is added.
pub fn generate_label(column_name: &str) -> String {
    let cleaned: String = column_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    let mut label = cleaned.split_whitespace().collect::<Vec<&str>>().join(" ");
    if !label.ends_with('?') {
        label.push('?');
    }
    label
}

// ********* Search **********

/// A choice question and those of its options that matched a search.
#[derive(PartialEq, Debug, Clone)]
pub struct OptionMatch<'a> {
    pub question: &'a Question,
    pub options: Vec<&'a str>,
}

/// Case-insensitive search in the identifiers and the labels of the questions.
pub fn search_questions<'a>(catalog: &'a Catalog, term: &str) -> Vec<&'a Question> {
    let term = term.to_lowercase();
    catalog
        .questions()
        .iter()
        .filter(|q| q.id.to_lowercase().contains(&term) || q.label.to_lowercase().contains(&term))
        .collect()
}

/// Case-insensitive search in the options of the choice questions.
pub fn search_options<'a>(catalog: &'a Catalog, term: &str) -> Vec<OptionMatch<'a>> {
    let term = term.to_lowercase();
    catalog
        .questions()
        .iter()
        .filter(|q| q.question_type.is_choice())
        .filter_map(|q| {
            let options: Vec<&str> = q
                .options
                .iter()
                .filter(|o| o.to_lowercase().contains(&term))
                .map(|o| o.as_str())
                .collect();
            if options.is_empty() {
                None
            } else {
                Some(OptionMatch {
                    question: q,
                    options,
                })
            }
        })
        .collect()
}

// ********* Subsets **********

fn resolve_column(
    catalog: &Catalog,
    table: &SurveyTable,
    column: &str,
) -> Result<(QuestionType, usize), StatsError> {
    let question = catalog.get(column)?;
    let col_idx = table
        .column_index(column)
        .ok_or_else(|| StatsError::UnknownQuestion(column.to_string()))?;
    Ok((question.question_type, col_idx))
}

/// The string under which an answer is counted and matched. The answers to numeric
/// questions are compared as numbers: `25`, `25.0` and a spreadsheet `25` are one value.
fn answer_key(answer: &Answer, question_type: QuestionType) -> Option<String> {
    match question_type {
        QuestionType::Numeric => answer
            .as_number()
            .map(format_number)
            .or_else(|| answer.key()),
        _ => answer.key(),
    }
}

/// Same as `answer_key`, for a value given by the user.
fn value_key(value: &str, question_type: QuestionType) -> String {
    let answer = Answer::from_text(value);
    answer_key(&answer, question_type).unwrap_or_default()
}

/// Keeps the respondents whose answer to `column` is one of `values`.
///
/// For multiple-choice questions, a respondent is kept as soon as one of the
/// selections is in `values`. Missing answers never match.
pub fn create_subset<'a>(
    catalog: &Catalog,
    rows: &Subset<'a>,
    column: &str,
    values: &[String],
) -> Result<Subset<'a>, StatsError> {
    let (question_type, col_idx) = resolve_column(catalog, rows.table(), column)?;
    let wanted: HashSet<String> = values
        .iter()
        .map(|v| value_key(v, question_type))
        .collect();
    debug!(
        "create_subset: column {:?} ({:?}) values {:?} over {:?} rows",
        column,
        question_type,
        wanted,
        rows.len()
    );

    let kept: Vec<&'a Respondent> = rows
        .rows()
        .iter()
        .copied()
        .filter(|r| match r.answers.get(col_idx) {
            None | Some(Answer::Missing) => false,
            Some(a) if question_type == QuestionType::MultipleChoice => a
                .selections()
                .iter()
                .any(|s| wanted.contains(s.as_str())),
            Some(a) => answer_key(a, question_type).map_or(false, |k| wanted.contains(&k)),
        })
        .collect();
    info!(
        "create_subset: {:?} of {:?} respondents kept for {:?}",
        kept.len(),
        rows.len(),
        column
    );
    Ok(Subset {
        table: rows.table(),
        rows: kept,
    })
}

// ********* Distributions **********

/// Counts the answers to `column` over the given respondents.
pub fn compute_distribution(
    catalog: &Catalog,
    rows: &Subset,
    column: &str,
    options: &DistributionOptions,
) -> Result<Distribution, StatsError> {
    let (question_type, col_idx) = resolve_column(catalog, rows.table(), column)?;
    let known_options = &catalog.get(column)?.options;

    // Buckets in first-seen order.
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut bump = |value: String| {
        if let Some(pos) = positions.get(&value) {
            counts[*pos].1 += 1;
        } else {
            positions.insert(value.clone(), counts.len());
            counts.push((value, 1));
        }
    };

    let mut answered: usize = 0;
    let mut missing: u64 = 0;
    for a in rows.column_answers(col_idx) {
        if a.is_missing() {
            missing += 1;
            continue;
        }
        answered += 1;
        if question_type == QuestionType::MultipleChoice {
            for s in a.selections() {
                bump(s);
            }
        } else if let Some(k) = answer_key(a, question_type) {
            bump(k);
        }
    }

    let denominator = if options.include_missing {
        if missing > 0 {
            counts.push((MISSING_LABEL.to_string(), missing));
        }
        rows.len()
    } else {
        answered
    };

    // Ties: catalog order first, then the order in which the values showed up.
    let rank = |idx: usize, value: &str| -> usize {
        known_options
            .iter()
            .position(|o| o == value)
            .unwrap_or(known_options.len() + idx)
    };
    let mut ranked: Vec<(usize, String, u64)> = counts
        .into_iter()
        .enumerate()
        .map(|(idx, (value, count))| (rank(idx, &value), value, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    let entries: Vec<DistributionEntry> = ranked
        .into_iter()
        .map(|(_, value, count)| DistributionEntry {
            value,
            count,
            share: if denominator == 0 {
                0.0
            } else {
                count as f64 / denominator as f64
            },
        })
        .collect();

    debug!(
        "compute_distribution: {:?}: {:?} answered out of {:?}, {:?} buckets",
        column,
        answered,
        rows.len(),
        entries.len()
    );
    Ok(Distribution {
        question: column.to_string(),
        question_type,
        total_respondents: rows.len(),
        answered,
        entries,
    })
}

/// Summary statistics over the answers to `column` that read as numbers.
pub fn numeric_summary(
    catalog: &Catalog,
    rows: &Subset,
    column: &str,
) -> Result<Option<NumericSummary>, StatsError> {
    let (_, col_idx) = resolve_column(catalog, rows.table(), column)?;
    let mut values: Vec<f64> = rows
        .column_answers(col_idx)
        .filter_map(|a| a.as_number())
        .collect();
    if values.is_empty() {
        return Ok(None);
    }
    // All the values are finite.
    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        values[count / 2]
    } else {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    };
    Ok(Some(NumericSummary {
        count,
        min: values[0],
        max: values[count - 1],
        mean,
        median,
    }))
}

// ********* Loaded survey **********

/// A table together with the catalog derived from it.
///
/// Both are read-only. Loading new data means building a new `Survey`.
#[derive(PartialEq, Debug, Clone)]
pub struct Survey {
    table: SurveyTable,
    catalog: Catalog,
}

impl Survey {
    pub fn new(table: SurveyTable, rules: &CatalogRules) -> Survey {
        let catalog = Catalog::infer(&table, rules);
        Survey { table, catalog }
    }

    pub fn with_labels(self, labels: &HashMap<String, String>) -> Survey {
        let catalog = self.catalog.with_labels(labels);
        Survey {
            table: self.table,
            catalog,
        }
    }

    pub fn table(&self) -> &SurveyTable {
        &self.table
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn respondent_count(&self) -> usize {
        self.table.len()
    }

    pub fn all(&self) -> Subset<'_> {
        self.table.all()
    }

    pub fn search_question(&self, term: &str) -> Vec<&Question> {
        search_questions(&self.catalog, term)
    }

    pub fn search_option(&self, term: &str) -> Vec<OptionMatch<'_>> {
        search_options(&self.catalog, term)
    }

    pub fn create_subset(&self, column: &str, values: &[String]) -> Result<Subset<'_>, StatsError> {
        create_subset(&self.catalog, &self.table.all(), column, values)
    }

    pub fn compute_distribution(
        &self,
        column: &str,
        rows: &Subset,
        options: &DistributionOptions,
    ) -> Result<Distribution, StatsError> {
        compute_distribution(&self.catalog, rows, column, options)
    }
}
