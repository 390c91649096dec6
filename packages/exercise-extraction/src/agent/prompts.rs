//! Prompts for the agent extractor.

/// System instruction: expected exercise shapes and the exact reply schema.
pub const EXTRACT_EXERCISES_PROMPT: &str = r#"You are a mathematical text parser specializing in LaTeX documents. Extract ALL exercises from the given content.

Exercises appear in these forms:
1. \subsubsection*{1.1.A. Unimportant Exercise} followed by the exercise text
2. \subsubsection*{1.1.B. Exercise} followed by the exercise text
3. \subsubsection*{1.1.C. EXERCISE.} followed by the exercise text
4. \begin{exercise}...\end{exercise} environments
5. Plain text such as "1.1. A. EXERCISE." or "EXERCISE 1.1.A" followed by the exercise text
6. Any other section that poses an exercise problem

For each exercise, extract:
- id: the exercise label, like "1.1.A"
- title: the heading or a short description
- content: the complete exercise text, including parts (a), (b), ...
- confidence: how sure you are this is an exercise, between 0 and 1

Reply with this EXACT JSON format:
```json
{
    "exercises": [
        {
            "id": "1.1.A",
            "title": "Unimportant Exercise",
            "content": "A category in which each morphism is an isomorphism is called a groupoid...",
            "confidence": 0.95
        }
    ]
}
```

Escape every backslash in JSON strings. Capture ALL exercises and copy their complete text, not summaries."#;

/// User message wrapping the document.
pub const EXTRACT_EXERCISES_USER: &str = "Extract all exercises from this LaTeX content:\n\n{content}";

/// Fill the user message template.
pub fn format_user_prompt(content: &str) -> String {
    EXTRACT_EXERCISES_USER.replace("{content}", content)
}
