//! Prompts written to a fresh template file.

use super::types::{
    PromptTemplate, DEFAULT_PROMPT_ID, FIFTH_QUESTION_PROMPT_ID, INTERNAL_ANSWER_PROMPT_ID,
};

const DEFAULT_TEMPLATE: &str = "\
You are assisting a recruiter who is screening a candidate for the role described above.

Job description:
{{jobDescription}}

Screening question:
{{question}}

Candidate answer:
{{answer}}

Previous analyses:
1. {{analysis1}}
2. {{analysis2}}
3. {{analysis3}}

Assess how well the answer addresses the question and the requirements of the role. \
Point out strengths, gaps and anything the recruiter should follow up on. \
Keep the assessment under 200 words.";

const INTERNAL_ANSWER_TEMPLATE: &str = "\
An internal recruiter recorded the following answer for the field \"{{field}}\".

Question:
{{question}}

Recorded answer:
{{answer}}

Job description:
{{jobDescription}}

Rewrite the answer as a clear, professional note suitable for the job record. \
Correct spelling and grammar, keep every fact, and do not invent details.";

const FIFTH_QUESTION_TEMPLATE: &str = "\
Earlier screening questions have already been discussed with the candidate. \
Their analyses so far:

1. {{analysis1}}
2. {{analysis2}}
3. {{analysis3}}

Job description:
{{jobDescription}}

Write one additional screening question that covers the most important requirement \
not yet addressed. Return only the question.";

/// The collection a new template file starts with.
pub fn default_prompts() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate::new(DEFAULT_PROMPT_ID, "Answer analysis", DEFAULT_TEMPLATE),
        PromptTemplate::new(
            INTERNAL_ANSWER_PROMPT_ID,
            "Internal answer review",
            INTERNAL_ANSWER_TEMPLATE,
        ),
        PromptTemplate::new(
            FIFTH_QUESTION_PROMPT_ID,
            "Fifth question",
            FIFTH_QUESTION_TEMPLATE,
        ),
    ]
}
