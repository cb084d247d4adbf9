// All LLM prompt templates for the generation tools and job matching.
// Placeholders in `{braces}` are replaced verbatim before sending.

/// Job-match analysis. Replace `{cv_text}` and `{job_text}`.
pub const JOB_MATCH_PROMPT_TEMPLATE: &str = r#"You are an expert recruiter. Compare the candidate's CV with the job posting and rate how well the candidate fits the job.

Return a JSON object with this EXACT schema (no extra fields):
{
  "score": 87,
  "summary": "One sentence explaining the main reason for the score."
}

Rules:
- "score" is an integer from 0 (no fit) to 100 (perfect fit).
- "summary" is exactly one sentence.
- Judge only on the text below; do not assume unstated experience.

CANDIDATE CV:
{cv_text}

JOB POSTING:
{job_text}"#;

/// CV valuation against one job description. Replace `{cv_text}` and `{job_description}`.
pub const CV_VALUATION_PROMPT_TEMPLATE: &str = r#"You are an applicant tracking system and career coach. Evaluate the CV against the job description.

Return a JSON object with this EXACT schema (no extra fields):
{
  "matchScore": 72,
  "matchedKeywords": ["Rust", "PostgreSQL"],
  "missingKeywords": ["Kubernetes"],
  "suggestions": ["Quantify the impact of the payment system migration."]
}

Rules:
- "matchScore" is an integer from 0 to 100.
- Keywords are skills, tools or qualifications named in the job description.
- Give between 1 and 5 concrete, actionable suggestions.

CV:
{cv_text}

JOB DESCRIPTION:
{job_description}"#;

/// Interview question generation. Replace `{cv_text}` and `{job_description}`.
pub const INTERVIEW_QUESTIONS_PROMPT_TEMPLATE: &str = r#"You are a hiring manager preparing an interview. Based on the CV and the job description, write the questions you would most likely ask this candidate.

Return a JSON object with this EXACT schema (no extra fields):
{
  "questions": ["Tell me about a time you ..."]
}

Rules:
- Between 5 and 10 questions.
- Mix behavioral questions with questions on the job's core skills.
- Reference the candidate's actual experience where it is relevant.

CV:
{cv_text}

JOB DESCRIPTION:
{job_description}"#;

/// Feedback on one spoken interview answer. Replace `{question}` and `{answer}`.
pub const INTERVIEW_FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are an interview coach. Review the candidate's answer to the interview question.

Return a JSON object with this EXACT schema (no extra fields):
{
  "positive_feedback": "What the answer did well.",
  "constructive_feedback": "What is missing or could be stronger.",
  "example_improvement": "A short rewritten version of the answer."
}

The answer was transcribed from speech; ignore filler words and transcription noise.

QUESTION:
{question}

ANSWER:
{answer}"#;

/// System prompt for free-text writing tasks.
pub const WRITER_SYSTEM: &str = "You are an expert career writer. \
    Reply with the requested text only: no preamble, no notes, no markdown headings.";

/// Cover letter. Replace `{tone_instruction}`, `{no_fabrication}`,
/// `{job_description}` and `{user_info}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a compelling cover letter tailored to the job below.

{tone_instruction}

Instructions:
1. Identify the key requirements, skills and responsibilities in the job description.
2. Link the candidate's qualifications directly to those requirements, with specific examples where possible.
3. Structure: an introduction naming the position, a body highlighting the match, and a conclusion with a call to action.
4. {no_fabrication}

JOB DESCRIPTION:
{job_description}

CANDIDATE INFORMATION (resume/skills):
{user_info}"#;

/// Professional bio. Replace `{tone_instruction}`, `{no_fabrication}` and `{user_info}`.
pub const BIO_PROMPT_TEMPLATE: &str = r#"Write a professional profile bio (for a LinkedIn "About" section) in the first person, 80 to 150 words.

{tone_instruction}

{no_fabrication}

CANDIDATE INFORMATION:
{user_info}"#;
