// All model prompt templates for the interview stages.
// Placeholders in `{braces}` are filled with `.replace` before sending.

// ── Resume analysis ─────────────────────────────────────────────────────────

pub const RESUME_ANALYSIS_TASK: &str = "You are an expert technical recruiter and resume analyst.";

pub const RESUME_ANALYSIS_PROMPT: &str = r#"Analyze the following resume text and extract a structured candidate profile.

RESUME TEXT:
{resume_text}

Return a JSON object with these fields:
{
  "name": "Candidate's full name",
  "skills": ["technical skills"],
  "experience_years": 5,
  "roles": ["previous job titles"],
  "education": "Highest degree and major",
  "strengths": ["key strengths"],
  "weaknesses": ["potential gaps or areas to probe"],
  "recommended_topics": ["3-5 technical topics to ask about, based on their specific experience"]
}"#;

// ── Introduction / self-introduction ────────────────────────────────────────

pub const OPENING_PROMPT: &str = "Thanks, {name}! I've reviewed your resume. \
To get started, please introduce yourself: tell me about your background, \
the work you're most proud of, and what you're looking for next.";

pub const SELF_INTRO_TASK: &str = "You are an expert technical interviewer. \
You summarize a candidate's self-introduction and assess how well it was delivered.";

pub const SELF_INTRO_PROMPT: &str = r#"The candidate was asked:
{question}

The candidate answered:
{answer}

Known profile:
{profile}

Return a JSON object:
{
  "summary": "two-sentence summary of the introduction",
  "highlights": ["notable achievements they mentioned"],
  "interests": ["areas they want to work on"],
  "skills": ["technical skills they mentioned"],
  "feedback": "2-3 sentences on clarity, structure and relevance of the introduction",
  "score": 7
}
"score" is an integer from 1 to 10."#;

pub const SELF_INTRO_ACK: &str = "Thanks for the introduction, {name}. \
Let's move on to some technical questions.";

// ── Technical questions ─────────────────────────────────────────────────────

pub const TECHNICAL_RULES: &str = "Current stage: TECHNICAL QUESTIONS.\n\
- Ask exactly ONE new technical question grounded in the candidate profile below.\n\
- Do not repeat a question already asked in the conversation.\n\
- If the previous answer was strong, increase the difficulty; if weak, probe fundamentals.\n\
- You may briefly acknowledge the previous answer (one sentence) before the question.\n\
\n\
CANDIDATE PROFILE:\n{profile}";

pub const TECHNICAL_PROMPT: &str =
    "Ask technical question {number} of {limit}. Reply with the question only.";

pub const TECHNICAL_TO_DSA: &str = "Great work on the technical questions. \
Next we'll move to data structures and algorithms. I'll give you a coding problem; \
please answer with your solution in a fenced code block.";

// ── Ambiguity check ─────────────────────────────────────────────────────────

pub const AMBIGUITY_TASK: &str = "You judge whether an interview answer is vague or shallow. \
An answer is vague when it avoids specifics (e.g. \"it depends\", \"I'm not sure\", a single \
generic sentence) or does not address the question asked.";

pub const AMBIGUITY_PROMPT: &str = r#"Question:
{question}

Answer:
{answer}

Return a JSON object:
{
  "ambiguous": true,
  "reason": "why the answer is or is not specific enough",
  "follow_up": "a deeper follow-up question that asks for specifics (empty when not ambiguous)",
  "clarity_score": 3
}
"clarity_score" is an integer from 1 to 10."#;

// ── Feedback ────────────────────────────────────────────────────────────────

pub const FEEDBACK_TASK: &str = "You are an expert technical interviewer providing constructive feedback.";

pub const FEEDBACK_PROMPT: &str = r#"Interview stage: {stage}
Question: {question}
Candidate's answer: {answer}

Score the answer on clarity and completeness, technical accuracy, and depth of understanding.

Return a JSON object:
{
  "feedback": "2-3 sentences of feedback on the answer",
  "score": 6
}
"score" is an integer from 1 to 10."#;

// ── DSA ─────────────────────────────────────────────────────────────────────

pub const DSA_RULES: &str = "Current stage: DATA STRUCTURES & ALGORITHMS.\n\
- Pose exactly ONE coding problem suited to the candidate's level.\n\
- Include a clear problem statement, at least one example with input and output, and constraints.\n\
- If the conversation ends with a code evaluation, first comment briefly on it, then pose the problem.\n\
- Do not reveal the solution.\n\
\n\
CANDIDATE PROFILE:\n{profile}";

pub const DSA_PROMPT: &str = "Pose coding problem {number} of {limit}.";

pub const DSA_TO_FINAL: &str = "That concludes the coding round. \
Thank you! I'll now put together your overall feedback.";

// ── Code evaluation ─────────────────────────────────────────────────────────

pub const CODE_EVALUATION_TASK: &str = "You are an expert code evaluator. \
You cannot run code; you predict its behaviour precisely by reading it.";

pub const CODE_EVALUATION_PROMPT: &str = r#"Problem:
{problem}

Candidate code ({language}):
```{language}
{code}
```

Please perform the following:
1. Simulate execution: predict exactly what this code would output if run.
2. Evaluate: is the code correct, efficient, and following best practices?

Format your response as:
**Predicted Output:**
```
[output here]
```

**Feedback:**
[detailed feedback here]

**Score:** X/10"#;

pub const NO_CODE_FOUND: &str = "I didn't detect any code to evaluate. \
Please provide your solution in a fenced code block, for example:\n\n```python\n# your code here\n```";

pub const EMPTY_CODE_BLOCK: &str = "Your code block is empty. \
Please paste your solution between the ``` fences.";

// ── Final feedback ──────────────────────────────────────────────────────────

pub const FINAL_FEEDBACK_TASK: &str = "You are an expert technical interviewer providing a comprehensive final evaluation.";

pub const FINAL_FEEDBACK_PROMPT: &str = r#"Candidate: {name}
Total scored answers: {total}
Average score: {average}/10
Stage averages: self introduction {self_intro}, technical {technical}, DSA {dsa}

Individual feedback:
{feedback_summary}

Please provide a comprehensive final evaluation with:
1. **Overall Performance Summary**
2. **Strengths**
3. **Areas for Improvement**
4. **Stage-wise Analysis** (Self Introduction, Technical Questions, DSA/Coding)
5. **Final Rating** with a recommendation

Be constructive, specific, and professional. Format in clear markdown."#;

pub const NOTHING_TO_EVALUATE: &str =
    "No feedback available to generate a final evaluation. The interview is now complete.";
