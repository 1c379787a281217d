//! AI relay: compose a prompt from a stored template plus CRM context and
//! forward it to the text generator.

pub mod context;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llms::TextGenerator;
use crate::prompts::types::{
    PromptTemplate, DEFAULT_PROMPT_ID, FIFTH_QUESTION_PROMPT_ID, INTERNAL_ANSWER_PROMPT_ID,
};
use crate::prompts::{render, Placeholder, PromptLibrary, PromptValues};
use crate::utilities::errors::{RelayError, RelayResult};
use crate::utilities::string_utils::non_blank;

use context::{first_record, job_description, job_questions, job_summary, opportunity_question_answer};

/// Body of `POST /processWithGemini`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub job_data: Value,
    #[serde(default)]
    pub opportunity_data: Value,
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub analysis1: Option<String>,
    #[serde(default)]
    pub analysis2: Option<String>,
    #[serde(default)]
    pub analysis3: Option<String>,
}

/// Body of `POST /processInternalAnswerGemini`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalAnswerRequest {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub job_data: Value,
    #[serde(default)]
    pub prompt_id: Option<String>,
}

/// Body of `POST /generateFifthQuestion`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FifthQuestionRequest {
    #[serde(default)]
    pub job_data: Value,
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub analysis1: Option<String>,
    #[serde(default)]
    pub analysis2: Option<String>,
    #[serde(default)]
    pub analysis3: Option<String>,
}

/// Response of every analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

fn with_analyses(values: PromptValues, analyses: [&Option<String>; 3]) -> PromptValues {
    analyses
        .into_iter()
        .enumerate()
        .fold(values, |values, (i, text)| match Placeholder::analysis(i + 1) {
            Some(p) => values.with(p, text.as_deref()),
            None => values,
        })
}

/// Prompt for analysing the recorded opportunity answer.
pub fn compose_analysis_prompt(template: &PromptTemplate, request: &AnalysisRequest) -> String {
    let job = first_record(&request.job_data);
    let opportunity = first_record(&request.opportunity_data);
    let (question, answer) = opportunity_question_answer(opportunity);

    let values = PromptValues::new()
        .with(Placeholder::Answer, answer)
        .with(Placeholder::Question, question)
        .with(Placeholder::JobDescription, job_description(job));
    let values = with_analyses(
        values,
        [&request.analysis1, &request.analysis2, &request.analysis3],
    );

    format!("{}\n\n{}", job_summary(job), render(&template.template, &values))
}

/// Prompt for cleaning up an internal recruiter answer.
pub fn compose_internal_answer_prompt(
    template: &PromptTemplate,
    request: &InternalAnswerRequest,
) -> String {
    let job = first_record(&request.job_data);
    let values = PromptValues::new()
        .with(Placeholder::Answer, request.answer.as_deref())
        .with(Placeholder::Question, request.question.as_deref())
        .with(Placeholder::Field, request.field.as_deref())
        .with(Placeholder::JobDescription, job_description(job));

    format!("{}\n\n{}", job_summary(job), render(&template.template, &values))
}

/// Prompt for drafting the next screening question.
pub fn compose_fifth_question_prompt(
    template: &PromptTemplate,
    request: &FifthQuestionRequest,
) -> String {
    let job = first_record(&request.job_data);
    let values = with_analyses(
        PromptValues::new().with(Placeholder::JobDescription, job_description(job)),
        [&request.analysis1, &request.analysis2, &request.analysis3],
    );

    let mut context = job_summary(job);
    let questions = job_questions(job);
    if !questions.is_empty() {
        context.push_str("\n\nQuestions already asked:");
        for (slot, q) in &questions {
            context.push_str(&format!("\n{}. {}", slot, q));
        }
    }

    format!("{}\n\n{}", context, render(&template.template, &values))
}

/// Template lookup plus generation.
#[derive(Clone)]
pub struct AnalysisRelay {
    prompts: PromptLibrary,
    generator: Arc<dyn TextGenerator>,
}

impl AnalysisRelay {
    pub fn new(prompts: PromptLibrary, generator: Arc<dyn TextGenerator>) -> Self {
        Self { prompts, generator }
    }

    async fn template(&self, requested: Option<&str>, fallback: &str) -> RelayResult<PromptTemplate> {
        let id = non_blank(requested).unwrap_or(fallback);
        self.prompts.get(id).await
    }

    async fn run(&self, template_id: &str, prompt: String) -> RelayResult<AnalysisResponse> {
        tracing::info!(
            provider = self.generator.provider(),
            template = template_id,
            prompt_chars = prompt.len(),
            "Forwarding prompt"
        );
        let analysis = self.generator.generate(&prompt).await?;
        Ok(AnalysisResponse { analysis })
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> RelayResult<AnalysisResponse> {
        let template = self
            .template(request.prompt_id.as_deref(), DEFAULT_PROMPT_ID)
            .await?;
        let prompt = compose_analysis_prompt(&template, request);
        self.run(&template.id, prompt).await
    }

    pub async fn review_internal_answer(
        &self,
        request: &InternalAnswerRequest,
    ) -> RelayResult<AnalysisResponse> {
        if non_blank(request.answer.as_deref()).is_none() {
            return Err(RelayError::BadRequest("answer is required".to_string()));
        }
        let template = self
            .template(request.prompt_id.as_deref(), INTERNAL_ANSWER_PROMPT_ID)
            .await?;
        let prompt = compose_internal_answer_prompt(&template, request);
        self.run(&template.id, prompt).await
    }

    pub async fn fifth_question(
        &self,
        request: &FifthQuestionRequest,
    ) -> RelayResult<AnalysisResponse> {
        let template = self
            .template(request.prompt_id.as_deref(), FIFTH_QUESTION_PROMPT_ID)
            .await?;
        let prompt = compose_fifth_question_prompt(&template, request);
        self.run(&template.id, prompt).await
    }
}
