/*!

This is the long-form manual for `survey_stats` and the `survey` command line tool.

## Input files

Each input file holds one table: the first row contains the question identifiers
(one column per question), and every following row is one respondent.

* `.xlsx`, `.xlsm` Excel workbooks. The first worksheet is read unless a worksheet
  name is given in the configuration.
* `.csv` Comma separated values.

When several files are given, they must all have the same columns. The columns may
appear in a different order: they are realigned to the order of the first file.

Answers to multiple-choice questions are stored in a single cell, with the selected
options separated by `;`, for example `Python;Go;Rust`.

## Question types

The type of every question is inferred from its answers:

* `NUMERIC` all the answers are numbers.
* `MC` (multiple choice) at least one answer contains `;`.
* `SC` (single choice) there are fewer distinct answers than the configured
  threshold (50 by default).
* `TEXT` everything else.

A column without any answer is treated as single choice.

By default only the number of distinct answers matters. A bound on the ratio
`distinct answers / answered respondents` can be added with `singleChoiceMaxRatio`.
It is not set by default because on small surveys almost every column would fail
it: with 10 respondents, a question with 3 possible answers already has a ratio of
0.3. On large exports, a ratio of `0.2` keeps free-text columns with fewer than 50
distinct answers out of the single-choice questions. A column of 40 respondents
with 40 different comments is single choice under the default rules and text under
a ratio of `0.2`.

Numeric answers are compared as numbers: `25`, `25.0` and a spreadsheet cell
holding 25 are the same answer, both when counting and when filtering.

## Distributions

For single-choice, numeric and text questions, every answer is counted once. For
multiple-choice questions, every selection is counted, so a respondent who selected
three options contributes to three answers. The percentages are computed over the
respondents who answered the question, which means that the percentages of a
multiple-choice question usually add up to more than 100%.

Missing answers are not counted, unless explicitly requested. In that case they are
reported in a separate `(missing)` answer and the percentages are computed over all
the respondents.

## Configuration

The command line tool accepts a JSON configuration file:

```json
{
  "singleChoiceMaxDistinct": 20,
  "singleChoiceMaxRatio": 0.2,
  "excelWorksheetName": "Responses",
  "labels": {
    "YearsCodePro": "How many years have you coded professionally?"
  }
}
```

All the fields are optional.

*/
