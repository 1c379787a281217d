//! Salesforce object and field API names.
//!
//! Call sites never spell an API name inline; they go through the enums
//! below so a renamed field is a one-line change.

use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};

/// Record types the relay reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SObject {
    Job,
    OpportunityDiscussed,
}

impl SObject {
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Job => "TR1__Job__c",
            Self::OpportunityDiscussed => "TR1__Opportunity_Discussed__c",
        }
    }
}

impl fmt::Display for SObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// A field belonging to one record type.
pub trait SObjectField: Copy {
    const OBJECT: SObject;

    fn api_name(self) -> &'static str;
}

/// Hardcoded record ids the fixed endpoints operate on.
pub mod record_ids {
    pub const JOB_ID: &str = "a0W1R00000ABy0WUAT";
    pub const OPPORTUNITY_DISCUSSED_ID: &str = "a0bPM00000SepV7YAJ";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    Id,
    RecordTypeId,
    OpportunityDiscussedQ1,
    OpportunityDiscussedQ2,
    OpportunityDiscussedQ3,
    Status,
    ConfidentialSearch,
    TodaysPriority,
    OpenDate,
    Division,
    Industry,
    StateArea,
    RegionalArea,
    City,
    Country,
    PostSalary,
    SalaryLow,
    SalaryHigh,
    JobNumber,
    TypeOfWork,
    SourcingRecruiter,
    JobPublicName,
    ExternalJobTitle,
    ClientDescription,
    ExperienceRequirements,
    EducationRequirements,
    Responsibilities,
    LinkedinPostUrl,
    AsapWebsiteLink,
    StandardizedJobDescription,
    VmsLastPayload,
}

impl JobField {
    /// Every job field, in dictionary order.
    pub const ALL: &'static [JobField] = &[
        Self::Id,
        Self::RecordTypeId,
        Self::OpportunityDiscussedQ1,
        Self::OpportunityDiscussedQ2,
        Self::OpportunityDiscussedQ3,
        Self::Status,
        Self::ConfidentialSearch,
        Self::TodaysPriority,
        Self::OpenDate,
        Self::Division,
        Self::Industry,
        Self::StateArea,
        Self::RegionalArea,
        Self::City,
        Self::Country,
        Self::PostSalary,
        Self::SalaryLow,
        Self::SalaryHigh,
        Self::JobNumber,
        Self::TypeOfWork,
        Self::SourcingRecruiter,
        Self::JobPublicName,
        Self::ExternalJobTitle,
        Self::ClientDescription,
        Self::ExperienceRequirements,
        Self::EducationRequirements,
        Self::Responsibilities,
        Self::LinkedinPostUrl,
        Self::AsapWebsiteLink,
        Self::StandardizedJobDescription,
        Self::VmsLastPayload,
    ];

    /// Fields returned by the open-jobs listing. The standardized
    /// description and VMS payload are written by this service and left out.
    pub fn listing() -> &'static [JobField] {
        &Self::ALL[..29]
    }
}

impl SObjectField for JobField {
    const OBJECT: SObject = SObject::Job;

    fn api_name(self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::RecordTypeId => "RecordTypeId",
            Self::OpportunityDiscussedQ1 => "Opportunity_Discussed_Question_1__c",
            Self::OpportunityDiscussedQ2 => "Opportunity_Discussed_Question_2__c",
            Self::OpportunityDiscussedQ3 => "Opportunity_Discussed_Question_3__c",
            Self::Status => "TR1__Status__c",
            Self::ConfidentialSearch => "Confidential_Search__c",
            Self::TodaysPriority => "Today_s_Priority__c",
            Self::OpenDate => "TR1__Open_Date__c",
            Self::Division => "TR1__Division__c",
            Self::Industry => "TR1__Industry__c",
            Self::StateArea => "TR1__State_Area__c",
            Self::RegionalArea => "TR1__Regional_Area__c",
            Self::City => "TR1__City__c",
            Self::Country => "Country__c",
            Self::PostSalary => "Post_Salary__c",
            Self::SalaryLow => "TR1__Salary_Low__c",
            Self::SalaryHigh => "TR1__Salary_High__c",
            Self::JobNumber => "TR1__Job_Number__c",
            Self::TypeOfWork => "Type_of_work__c",
            Self::SourcingRecruiter => "TR1__Sourcing_Recruiter__c",
            Self::JobPublicName => "Job_Public_Name__c",
            Self::ExternalJobTitle => "TR1__External_Job_Title__c",
            Self::ClientDescription => "TR1__Client_Description__c",
            Self::ExperienceRequirements => "TR1__Experience_Requirements__c",
            Self::EducationRequirements => "TR1__Education_Requirements__c",
            Self::Responsibilities => "TR1__Responsibilities__c",
            Self::LinkedinPostUrl => "LinkedIn_Post_URL__c",
            Self::AsapWebsiteLink => "ASAP_Website_Link__c",
            Self::StandardizedJobDescription => "Standardized_Job_Description__c",
            Self::VmsLastPayload => "TR1__VMS_Last_Payload__c",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpportunityDiscussedField {
    Id,
    Job,
    InternalQ1,
    InternalAnswer1,
}

impl OpportunityDiscussedField {
    pub const ALL: &'static [OpportunityDiscussedField] =
        &[Self::Id, Self::Job, Self::InternalQ1, Self::InternalAnswer1];
}

impl SObjectField for OpportunityDiscussedField {
    const OBJECT: SObject = SObject::OpportunityDiscussed;

    fn api_name(self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::Job => "TR1__Job__c",
            Self::InternalQ1 => "Internal_Q_1__c",
            Self::InternalAnswer1 => "Internal_Answer_1__c",
        }
    }
}

/// Read a string field from a raw record returned by the CRM.
///
/// Numbers and booleans are rendered as text; null, missing and blank
/// values yield `None`.
pub fn field_text<F: SObjectField>(record: &Value, field: F) -> Option<String> {
    match record.get(field.api_name())? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn select<F: SObjectField>(fields: &[F], filter: &str) -> String {
    let columns: Vec<&str> = fields.iter().map(|f| f.api_name()).collect();
    format!(
        "SELECT {} FROM {} WHERE {}",
        columns.join(", "),
        F::OBJECT.api_name(),
        filter
    )
}

/// Quote a value for a SOQL string literal.
fn soql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Open, non-confidential jobs.
pub fn open_jobs_query() -> String {
    select(
        JobField::listing(),
        &format!(
            "({} = 'Open' AND {} = false)",
            JobField::Status.api_name(),
            JobField::ConfidentialSearch.api_name()
        ),
    )
}

/// One job with every dictionary field.
pub fn job_by_id_query(id: &str) -> String {
    select(
        JobField::ALL,
        &format!("{} = {}", JobField::Id.api_name(), soql_literal(id)),
    )
}

/// The hardcoded opportunity-discussed record.
pub fn opportunity_discussed_query() -> String {
    select(
        OpportunityDiscussedField::ALL,
        &format!(
            "{} = {}",
            OpportunityDiscussedField::Id.api_name(),
            soql_literal(record_ids::OPPORTUNITY_DISCUSSED_ID)
        ),
    )
}

// ---------------------------------------------------------------------------
// Update payloads
// ---------------------------------------------------------------------------

/// Typed update body for one record.
#[derive(Debug, Clone)]
pub struct UpdatePayload<F: SObjectField> {
    id: String,
    fields: Map<String, Value>,
    _field: PhantomData<F>,
}

impl<F: SObjectField> UpdatePayload<F> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
            _field: PhantomData,
        }
    }

    pub fn set(mut self, field: F, value: impl Into<Value>) -> Self {
        self.fields.insert(field.api_name().to_string(), value.into());
        self
    }

    pub fn object(&self) -> SObject {
        F::OBJECT
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Changed fields only, as sent in a REST PATCH body.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_jobs_query_shape() {
        let q = open_jobs_query();
        assert!(q.starts_with("SELECT Id, RecordTypeId, Opportunity_Discussed_Question_1__c"));
        assert!(q.contains("FROM TR1__Job__c"));
        assert!(q.ends_with("WHERE (TR1__Status__c = 'Open' AND Confidential_Search__c = false)"));
        assert!(q.contains("ASAP_Website_Link__c"));
        assert!(!q.contains("TR1__VMS_Last_Payload__c"));
    }

    #[test]
    fn test_job_by_id_query_includes_all_fields() {
        let q = job_by_id_query(record_ids::JOB_ID);
        for field in JobField::ALL.iter().copied() {
            assert!(q.contains(field.api_name()), "missing {}", field.api_name());
        }
        assert!(q.ends_with("WHERE Id = 'a0W1R00000ABy0WUAT'"));
    }

    #[test]
    fn test_job_by_id_query_escapes_quotes() {
        let q = job_by_id_query("x' OR Id != '");
        assert!(q.ends_with(r"WHERE Id = 'x\' OR Id != \''"));
    }

    #[test]
    fn test_opportunity_discussed_query() {
        assert_eq!(
            opportunity_discussed_query(),
            "SELECT Id, TR1__Job__c, Internal_Q_1__c, Internal_Answer_1__c \
             FROM TR1__Opportunity_Discussed__c WHERE Id = 'a0bPM00000SepV7YAJ'"
        );
    }

    #[test]
    fn test_update_payload() {
        let payload = UpdatePayload::new("a0W000")
            .set(JobField::VmsLastPayload, "looks good");
        assert_eq!(payload.object(), SObject::Job);
        assert_eq!(payload.id(), "a0W000");
        assert_eq!(payload.fields().len(), 1);
        assert_eq!(payload.fields()["TR1__VMS_Last_Payload__c"], "looks good");
    }

    #[test]
    fn test_field_text() {
        let record = serde_json::json!({
            "TR1__City__c": "  Austin ",
            "TR1__Salary_Low__c": 90000,
            "TR1__State_Area__c": null,
            "Job_Public_Name__c": "   ",
        });
        assert_eq!(field_text(&record, JobField::City).as_deref(), Some("Austin"));
        assert_eq!(field_text(&record, JobField::SalaryLow).as_deref(), Some("90000"));
        assert_eq!(field_text(&record, JobField::StateArea), None);
        assert_eq!(field_text(&record, JobField::JobPublicName), None);
        assert_eq!(field_text(&record, JobField::Country), None);
    }
}
