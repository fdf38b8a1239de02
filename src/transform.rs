use crate::error::ExportError;
use crate::github::issues::RawIssue;
use serde::Serialize;
use serde_json::Value;

/// The reduced issue record written to the reports
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NormalizedIssue {
    pub number: u64,
    pub title: String,
    pub n_comments: u64,
    pub body: String,
    pub updated_at: String,
    pub created_at: String,
    pub state: String,
    /// Label names joined with `,`
    pub labels: String,
    /// Empty when the issue has no milestone
    pub milestone_title: String,
    pub html_url: String,
    pub url: String,
}

impl NormalizedIssue {
    /// Column names, in serialization order
    pub const FIELD_NAMES: [&'static str; 11] = [
        "number",
        "title",
        "n_comments",
        "body",
        "updated_at",
        "created_at",
        "state",
        "labels",
        "milestone_title",
        "html_url",
        "url",
    ];

    /// Field values as text, in [`Self::FIELD_NAMES`] order
    pub fn values(&self) -> [String; 11] {
        [
            self.number.to_string(),
            self.title.clone(),
            self.n_comments.to_string(),
            self.body.clone(),
            self.updated_at.clone(),
            self.created_at.clone(),
            self.state.clone(),
            self.labels.clone(),
            self.milestone_title.clone(),
            self.html_url.clone(),
            self.url.clone(),
        ]
    }
}

/// Maps one raw record to its normalized form.
///
/// `index` is the record's position in the filtered sequence and only used for
/// error reporting.
pub fn normalize_issue(index: usize, raw: &RawIssue) -> Result<NormalizedIssue, ExportError> {
    let record = Record { index, raw };

    Ok(NormalizedIssue {
        number: record.u64_field("number")?,
        title: record.str_field("title")?,
        n_comments: record.u64_field("comments")?,
        body: record.nullable_str_field("body")?,
        updated_at: record.str_field("updated_at")?,
        created_at: record.str_field("created_at")?,
        state: record.str_field("state")?,
        labels: record.label_names()?.join(","),
        milestone_title: record.milestone_title()?,
        html_url: record.str_field("html_url")?,
        url: record.str_field("url")?,
    })
}

/// Normalizes every record, stopping at the first malformed one
pub fn normalize_all(raw: &[RawIssue]) -> Result<Vec<NormalizedIssue>, ExportError> {
    raw.iter()
        .enumerate()
        .map(|(index, issue)| normalize_issue(index, issue))
        .collect()
}

struct Record<'a> {
    index: usize,
    raw: &'a Value,
}

impl Record<'_> {
    fn malformed(&self, field: &str, reason: &str) -> ExportError {
        ExportError::MalformedRecord {
            index: self.index,
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    fn required(&self, field: &str) -> Result<&Value, ExportError> {
        self.raw
            .get(field)
            .ok_or_else(|| self.malformed(field, "is missing"))
    }

    fn str_field(&self, field: &str) -> Result<String, ExportError> {
        self.required(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.malformed(field, "is not a string"))
    }

    fn u64_field(&self, field: &str) -> Result<u64, ExportError> {
        self.required(field)?
            .as_u64()
            .ok_or_else(|| self.malformed(field, "is not a non-negative integer"))
    }

    /// Required key whose value may be null, e.g. an issue without a description
    fn nullable_str_field(&self, field: &str) -> Result<String, ExportError> {
        match self.required(field)? {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s.clone()),
            _ => Err(self.malformed(field, "is neither a string nor null")),
        }
    }

    fn label_names(&self) -> Result<Vec<String>, ExportError> {
        let labels = self
            .required("labels")?
            .as_array()
            .ok_or_else(|| self.malformed("labels", "is not an array"))?;

        labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                label
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| self.malformed(&format!("labels[{i}].name"), "is missing"))
            })
            .collect()
    }

    fn milestone_title(&self) -> Result<String, ExportError> {
        match self.raw.get("milestone") {
            None | Some(Value::Null) => Ok(String::new()),
            Some(milestone) => milestone
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| self.malformed("milestone.title", "is missing")),
        }
    }
}
