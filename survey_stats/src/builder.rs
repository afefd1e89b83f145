pub use crate::config::*;

/// A builder for assembling a survey table, one respondent at a time.
///
/// ```
/// pub use survey_stats::builder::TableBuilder;
/// # use survey_stats::StatsError;
///
/// let mut builder = TableBuilder::new(&["Country".to_string(), "Lang".to_string()])?;
///
/// builder.add_respondent_simple(&["USA", "Python;Go"])?;
/// builder.add_respondent_simple(&["India", ""])?;
///
/// let table = builder.build();
/// assert_eq!(table.len(), 2);
///
/// # Ok::<(), StatsError>(())
/// ```
pub struct TableBuilder {
    pub(crate) _columns: Vec<String>,
    pub(crate) _respondents: Vec<Respondent>,
}

impl TableBuilder {
    pub fn new(columns: &[String]) -> Result<TableBuilder, StatsError> {
        for (idx, c) in columns.iter().enumerate() {
            if columns[..idx].contains(c) {
                return Err(StatsError::DuplicateColumn(c.clone()));
            }
        }
        Ok(TableBuilder {
            _columns: columns.to_vec(),
            _respondents: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self._columns
    }

    pub fn len(&self) -> usize {
        self._respondents.len()
    }

    pub fn is_empty(&self) -> bool {
        self._respondents.is_empty()
    }

    /// Adds a respondent from plain text cells.
    ///
    /// It is the simplest use case for most cases. The respondent receives a
    /// sequential identifier.
    pub fn add_respondent_simple(&mut self, cells: &[&str]) -> Result<(), StatsError> {
        let id = format!("respondent-{:08}", self._respondents.len() + 1);
        let answers: Vec<Answer> = cells.iter().map(|s| Answer::from_text(s)).collect();
        self.add_respondent(&id, answers)
    }

    /// Adds a respondent. There must be exactly one answer per column, in column order.
    pub fn add_respondent(&mut self, id: &str, answers: Vec<Answer>) -> Result<(), StatsError> {
        if answers.len() != self._columns.len() {
            return Err(StatsError::RowLength {
                respondent: id.to_string(),
                expected: self._columns.len(),
                found: answers.len(),
            });
        }
        self._respondents.push(Respondent {
            id: id.to_string(),
            answers,
        });
        Ok(())
    }

    pub fn build(self) -> SurveyTable {
        SurveyTable {
            columns: self._columns,
            respondents: self._respondents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_duplicate_columns() {
        let res = TableBuilder::new(&cols(&["A", "B", "A"]));
        assert_eq!(res.err(), Some(StatsError::DuplicateColumn("A".to_string())));
    }

    #[test]
    fn rejects_short_rows() {
        let mut builder = TableBuilder::new(&cols(&["A", "B"])).unwrap();
        let res = builder.add_respondent("r1", vec![Answer::Missing]);
        assert_eq!(
            res,
            Err(StatsError::RowLength {
                respondent: "r1".to_string(),
                expected: 2,
                found: 1
            })
        );
        assert!(builder.is_empty());
    }

    #[test]
    fn keeps_insertion_order() {
        let mut builder = TableBuilder::new(&cols(&["A"])).unwrap();
        builder.add_respondent_simple(&["x"]).unwrap();
        builder.add_respondent_simple(&[" "]).unwrap();
        builder
            .add_respondent("file-00000003", vec![Answer::Number(3.0)])
            .unwrap();
        let table = builder.build();
        let ids: Vec<&str> = table.respondents().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["respondent-00000001", "respondent-00000002", "file-00000003"]
        );
        assert_eq!(table.respondents()[1].answers[0], Answer::Missing);
        assert_eq!(table.column_index("A"), Some(0));
    }
}
