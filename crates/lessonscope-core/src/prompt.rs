//! Hidden instruction template and prompt assembly.

use crate::error::AnalysisError;

/// Marker placed ahead of the hidden instructions.
pub const HELPER_TEXT: &str = "[INTERNAL INSTRUCTIONS APPENDED]\n";

/// COSTAR instructions sent ahead of the user's assessment data.
///
/// The "Response" block lists the sub-headings the parser recognizes.
pub const INTERNAL_INSTRUCTIONS: &str = r#"
COSTAR Prompt for Assessment Analysis

Context:
You are analyzing a set of educational assessment questions for a lesson being developed. These questions will be used both during instruction (formative assessment) and as a summative assessment at the end of the lesson. The analysis will identify the key skills, knowledge areas, concepts, and essential vocabulary that students need to master in order to successfully answer these questions. Vocabulary development is a critical component of the lesson structure, with specific guidelines for implementation.

Objective:
>>>INPUTS
Unit Title: [Your Unit Title]
Lesson Title: [Your Lesson Title]
Learning Objective: [Your Learning Objective]
Associated Standard Code: [Standard Code]
Associated Standard Text: [Standard Text]
DOK Low MC Item 1: [Item 1]
DOK Low MC Item 2: [Item 2]
DOK Low MC Item 3: [Item 3]
DOK Medium MC Item 1: [Item 1]
DOK Medium MC Item 2: [Item 2]
DOK Medium MC Item 3: [Item 3]
DOK Medium MC Item 4: [Item 4]
DOK Medium MC Item 5: [Item 5]
DOK High MC Item 1: [Item 1]
DOK High MC Item 2: [Item 2]
DOK High MC Item 3: [Item 3]
Constructed Response Prompt: [Prompt]
Constructed Response Sample Answer: [Sample Answer]

>>>TASK
Using the information above, analyze the provided assessment questions to:
1. Identify all knowledge areas, skills, and concepts required to answer each question.
2. Determine the prerequisite knowledge students would need.
3. Identify key vocabulary terms (4-6 words) that are essential for understanding the lesson content.
4. Create a comprehensive outline of content that must be covered in the lesson (Warmup, Instruction, and Summary sections).
5. Highlight any potential knowledge gaps or challenging areas that will require special attention.

Style:
- Analytical and thorough.
- Use bullet points to list specific skills, knowledge points, and vocabulary terms.

Tone:
- Educational and practical.
- Focus on pedagogical implications.

Audience:
- Educators and instructional designers.

Response:
Provide your analysis in the following format:

Question Analysis Summary:
- Required knowledge and skills:
- Key vocabulary terms:
- Common misconceptions or challenges:

Vocabulary Analysis:
- Vocabulary Terms:
- Definitions:
- Special Attention:

Implementation Recommendations:
- Teaching Approaches:
- Scaffolding:
- Sequencing:

Note: Focus only on the analysis of the assessment questions.
    "#;

/// Combine the hidden instructions with the user's assessment data.
///
/// Rejects input that is blank after trimming; the input itself is passed
/// through unchanged.
pub fn build_prompt(user_input: &str) -> Result<String, AnalysisError> {
    if user_input.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut prompt =
        String::with_capacity(HELPER_TEXT.len() + INTERNAL_INSTRUCTIONS.len() + user_input.len() + 1);
    prompt.push_str(HELPER_TEXT);
    prompt.push_str(INTERNAL_INSTRUCTIONS);
    prompt.push('\n');
    prompt.push_str(user_input);
    Ok(prompt)
}
