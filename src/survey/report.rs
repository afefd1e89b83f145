// Text and JSON renderings of the results of the commands.

use serde_json::json;

use crate::survey::*;

/// Answers longer than this are truncated in the distribution table.
const ANSWER_WIDTH: usize = 40;
/// Number of options shown for each question in the question list.
const OPTIONS_PREVIEW: usize = 5;

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

fn to_text(lines: Vec<String>) -> String {
    let mut res = lines.join("\n");
    res.push('\n');
    res
}

fn question_js(q: &Question) -> JSValue {
    json!({
        "id": q.id,
        "label": q.label,
        "type": q.question_type.code(),
        "options": q.options,
    })
}

fn options_preview(q: &Question) -> Option<String> {
    if !q.question_type.is_choice() || q.options.is_empty() {
        return None;
    }
    if q.options.len() <= OPTIONS_PREVIEW {
        Some(format!("Options: {}", q.options.join(", ")))
    } else {
        Some(format!(
            "Options: {}, ... ({} in total)",
            q.options[..OPTIONS_PREVIEW].join(", "),
            q.options.len()
        ))
    }
}

fn type_counts_js(survey: &Survey) -> JSValue {
    let mut counts = serde_json::Map::new();
    for (qt, n) in survey.catalog().type_counts() {
        counts.insert(qt.code().to_string(), json!(n));
    }
    JSValue::Object(counts)
}

pub fn load_js(files: &[String], survey: &Survey) -> JSValue {
    json!({
        "files": files,
        "respondents": survey.respondent_count(),
        "questions": survey.catalog().len(),
        "questionTypes": type_counts_js(survey),
    })
}

pub fn load_text(files: &[String], survey: &Survey) -> String {
    to_text(vec![format!(
        "Successfully loaded {} respondents and {} questions from {} files.",
        survey.respondent_count(),
        survey.catalog().len(),
        files.len()
    )])
}

pub fn summary_js(survey: &Survey) -> JSValue {
    json!({
        "respondents": survey.respondent_count(),
        "questions": survey.catalog().len(),
        "questionTypes": type_counts_js(survey),
    })
}

pub fn summary_text(survey: &Survey) -> String {
    let mut lines = vec![
        format!("Total Respondents: {}", survey.respondent_count()),
        format!("Total Questions: {}", survey.catalog().len()),
    ];
    for (qt, n) in survey.catalog().type_counts() {
        lines.push(format!("  {}: {}", qt, n));
    }
    to_text(lines)
}

fn selected_types(filter: Option<QuestionType>) -> Vec<QuestionType> {
    match filter {
        Some(qt) => vec![qt],
        None => QuestionType::ALL.to_vec(),
    }
}

pub fn questions_js(survey: &Survey, filter: Option<QuestionType>) -> JSValue {
    let questions: Vec<JSValue> = survey
        .catalog()
        .questions()
        .iter()
        .filter(|q| filter.map(|qt| qt == q.question_type).unwrap_or(true))
        .map(question_js)
        .collect();
    json!({ "questions": questions })
}

pub fn questions_text(survey: &Survey, filter: Option<QuestionType>) -> String {
    let mut lines = vec![
        "=== SURVEY STRUCTURE ===".to_string(),
        format!("Total Respondents: {}", survey.respondent_count()),
    ];
    for qt in selected_types(filter) {
        let questions = survey.catalog().questions_by_type(qt);
        if questions.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{} Questions ({}):", qt, questions.len()));
        for (i, q) in questions.iter().enumerate() {
            lines.push(format!("{:2}. {}", i + 1, q.id));
            if q.label != q.id {
                lines.push(format!("    {}", q.label));
            }
            if let Some(preview) = options_preview(q) {
                lines.push(format!("    {}", preview));
            }
        }
    }
    to_text(lines)
}

pub fn question_matches_js(term: &str, found: &[&Question]) -> JSValue {
    let questions: Vec<JSValue> = found.iter().map(|q| question_js(q)).collect();
    json!({ "term": term, "questions": questions })
}

pub fn question_matches_text(term: &str, found: &[&Question]) -> String {
    if found.is_empty() {
        return to_text(vec![format!("No question matches {:?}.", term)]);
    }
    let mut lines = vec![format!("Matching questions ({}):", found.len())];
    for q in found {
        lines.push(format!("  {} ({}): {}", q.id, q.question_type, q.label));
    }
    to_text(lines)
}

pub fn option_matches_js(term: &str, found: &[OptionMatch]) -> JSValue {
    let matches: Vec<JSValue> = found
        .iter()
        .map(|m| {
            json!({
                "question": m.question.id,
                "type": m.question.question_type.code(),
                "options": m.options,
            })
        })
        .collect();
    json!({ "term": term, "matches": matches })
}

pub fn option_matches_text(term: &str, found: &[OptionMatch]) -> String {
    if found.is_empty() {
        return to_text(vec![format!("No option matches {:?}.", term)]);
    }
    let mut lines = vec![format!("Matching options ({} questions):", found.len())];
    for m in found {
        lines.push(format!("  {}: {}", m.question.id, m.options.join(", ")));
    }
    to_text(lines)
}

pub fn subset_js(question: &str, options: &[String], subset: &Subset, output: Option<&str>) -> JSValue {
    json!({
        "question": question,
        "options": options,
        "respondents": subset.len(),
        "totalRespondents": subset.table().len(),
        "output": output,
    })
}

pub fn subset_text(subset: &Subset, output: Option<&str>) -> String {
    let mut lines = vec![format!(
        "Filtered data: {} respondents out of {}",
        subset.len(),
        subset.table().len()
    )];
    if let Some(p) = output {
        lines.push(format!("Results saved to {}", p));
    }
    to_text(lines)
}

fn numeric_summary_js(s: &NumericSummary) -> JSValue {
    json!({
        "count": s.count,
        "min": s.min,
        "max": s.max,
        "mean": s.mean,
        "median": s.median,
    })
}

pub fn distribution_js(
    dist: &Distribution,
    top: Option<usize>,
    summary: Option<&NumericSummary>,
) -> JSValue {
    let shown = match top {
        Some(n) => dist.top_n(n),
        None => dist.clone(),
    };
    let entries: Vec<JSValue> = shown
        .entries
        .iter()
        .map(|e| json!({"value": e.value, "count": e.count, "share": e.share}))
        .collect();
    json!({
        "question": dist.question,
        "type": dist.question_type.code(),
        "totalRespondents": dist.total_respondents,
        "answered": dist.answered,
        "responseRate": dist.response_rate(),
        "distinctAnswers": dist.entries.len(),
        "entries": entries,
        "numericSummary": summary.map(numeric_summary_js),
    })
}

pub fn distribution_text(
    dist: &Distribution,
    top: Option<usize>,
    summary: Option<&NumericSummary>,
) -> String {
    let shown = match top {
        Some(n) => dist.top_n(n),
        None => dist.clone(),
    };
    let mut lines = vec![
        "=== ANSWER DISTRIBUTION ===".to_string(),
        format!("Question: {}", dist.question),
        format!("Type: {}", dist.question_type),
        format!("Total Responses: {}", dist.total_respondents),
        format!("Valid Responses: {}", dist.answered),
        format!("Response Rate: {}", percent(dist.response_rate())),
        "=".repeat(50),
        String::new(),
        format!("Top {} Answers:", shown.entries.len()),
        "-".repeat(60),
        format!("{:<40} {:<8} {}", "Answer", "Count", "Percentage"),
        "-".repeat(60),
    ];
    for e in shown.entries.iter() {
        lines.push(format!(
            "{:<40} {:<8} {}",
            truncate(&e.value, ANSWER_WIDTH),
            e.count,
            percent(e.share)
        ));
    }
    let remaining = dist.entries.len() - shown.entries.len();
    if remaining > 0 {
        lines.push(format!("... and {} more answers", remaining));
    }
    if let Some(s) = summary {
        lines.push(String::new());
        lines.push(format!(
            "Numeric summary: count {}, min {}, max {}, mean {:.2}, median {}",
            s.count,
            format_number(s.min),
            format_number(s.max),
            s.mean,
            format_number(s.median)
        ));
    }
    to_text(lines)
}
