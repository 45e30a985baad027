use crate::models::{PipelineRequest, StageResult};

/// System prompt for the writing stage
pub const WRITER_SYSTEM_PROMPT: &str = "You are an expert content creator who specializes in \
technology and culture. You know how to break down complex topics into simple, engaging \
narratives that captivate an audience. Your goal is to write an engaging, informative, and \
human-like blog post on a given topic.";

/// System prompt for the brand-review stage
pub const REVIEWER_SYSTEM_PROMPT: &str = "You are the guardian of the brand's voice. Your job \
is to read content and check it for tone, style, and accuracy against the company's brand \
profile. You are meticulous and have a keen eye for detail.";

/// System prompt for the compliance stage
pub const COMPLIANCE_SYSTEM_PROMPT: &str = "You are a detail-oriented compliance expert. Scan \
text for legal, ethical, and copyright risks and give a final GO / NO-GO.";

pub const WRITER_TASK_TEMPLATE: &str = "Write a 300-word blog post about the topic: '{topic}'. \
The post must be engaging and easy to understand.";

pub const WRITER_EXPECTED_OUTPUT: &str = "A formatted blog post (text) of around 300 words.";

pub const REVIEWER_TASK_TEMPLATE: &str = "Review the blog post written by the Creative Content \
Writer. Check it against the following Brand Guidelines: '{guidelines}'. Provide a detailed \
review with either 'APPROVED' or 'REJECTED' status and clear feedback.";

pub const REVIEWER_EXPECTED_OUTPUT: &str =
    "A comprehensive review with 'APPROVED' or 'REJECTED' status and clear revision notes.";

pub const COMPLIANCE_TASK_TEMPLATE: &str = "Perform a final legal and ethical compliance check \
on the blog post. Scan the text for any sensitive topics, potential misinformation, or \
copyright red flags. Provide a final 'GO' or 'NO-GO' with a brief justification.";

pub const COMPLIANCE_EXPECTED_OUTPUT: &str =
    "A final 'GO' or 'NO-GO' verdict with a 1-sentence explanation.";

/// Substitute the ambient task parameters into a stage template
pub fn render_template(template: &str, request: &PipelineRequest) -> String {
    template
        .replace("{topic}", &request.topic)
        .replace("{guidelines}", &request.guidelines)
}

/// Build the user prompt for a stage
///
/// Renders the task template, then appends one section per prior stage the
/// template depends on, each headed by that stage's role label. The labels
/// are what downstream consumers search for when only combined text survives.
pub fn build_task_prompt(
    template: &str,
    request: &PipelineRequest,
    context: &[&StageResult],
) -> String {
    let mut prompt = render_template(template, request);

    for result in context {
        prompt.push_str("\n\n## ");
        prompt.push_str(result.role.label());
        prompt.push('\n');
        prompt.push_str(&result.raw_text);
    }

    prompt
}
