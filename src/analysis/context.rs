//! Job context drawn from CRM records.

use serde_json::Value;

use crate::prompts::NOT_PROVIDED;
use crate::salesforce::fields::{field_text, JobField, OpportunityDiscussedField};

/// Accept either a single record or a query result and return the record.
pub fn first_record(value: &Value) -> &Value {
    value
        .get("records")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .unwrap_or(value)
}

/// The job description to feed into `{{jobDescription}}`.
///
/// Uses the standardized description when present, otherwise stitches the
/// individual description fields together.
pub fn job_description(job: &Value) -> Option<String> {
    if let Some(standardized) = field_text(job, JobField::StandardizedJobDescription) {
        return Some(standardized);
    }

    let sections = [
        ("Client", JobField::ClientDescription),
        ("Responsibilities", JobField::Responsibilities),
        ("Experience requirements", JobField::ExperienceRequirements),
        ("Education requirements", JobField::EducationRequirements),
    ];
    let parts: Vec<String> = sections
        .iter()
        .filter_map(|(label, field)| {
            field_text(job, *field).map(|text| format!("{}:\n{}", label, text))
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

/// Short prose header describing the job.
pub fn job_summary(job: &Value) -> String {
    let text = |field: JobField| field_text(job, field).unwrap_or_else(|| NOT_PROVIDED.to_string());

    let title = field_text(job, JobField::ExternalJobTitle)
        .or_else(|| field_text(job, JobField::JobPublicName))
        .unwrap_or_else(|| NOT_PROVIDED.to_string());

    let location: Vec<String> = [JobField::City, JobField::StateArea, JobField::Country]
        .iter()
        .filter_map(|f| field_text(job, *f))
        .collect();
    let location = if location.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        location.join(", ")
    };

    let salary = match (
        field_text(job, JobField::SalaryLow),
        field_text(job, JobField::SalaryHigh),
    ) {
        (Some(low), Some(high)) => format!("{} - {}", low, high),
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => NOT_PROVIDED.to_string(),
    };

    format!(
        "Job title: {}\nIndustry: {}\nLocation: {}\nSalary range: {}\nType of work: {}",
        title,
        text(JobField::Industry),
        location,
        salary,
        text(JobField::TypeOfWork),
    )
}

/// Screening questions stored on the job record, keyed by their 1-based
/// slot. Blank slots are skipped without shifting later ones.
pub fn job_questions(job: &Value) -> Vec<(usize, String)> {
    [
        JobField::OpportunityDiscussedQ1,
        JobField::OpportunityDiscussedQ2,
        JobField::OpportunityDiscussedQ3,
    ]
    .iter()
    .enumerate()
    .filter_map(|(i, f)| field_text(job, *f).map(|q| (i + 1, q)))
    .collect()
}

/// Question and answer recorded on an opportunity-discussed record.
pub fn opportunity_question_answer(record: &Value) -> (Option<String>, Option<String>) {
    (
        field_text(record, OpportunityDiscussedField::InternalQ1),
        field_text(record, OpportunityDiscussedField::InternalAnswer1),
    )
}
