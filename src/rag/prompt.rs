use crate::db::SearchResult;

const CONTEXT_PREFACE: &str = "\n\nUse the following information to complete your task:\n\n";

/// Combine the user's question with the retrieved context.
///
/// With no retrieved entries the question is passed through untouched, so an
/// empty index degrades to plain generation.
pub fn assemble_prompt(question: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return question.to_string();
    }

    let mut prompt = String::with_capacity(
        question.len()
            + CONTEXT_PREFACE.len()
            + results.iter().map(|r| r.entry.text.len() + 8).sum::<usize>(),
    );
    prompt.push_str(question);
    prompt.push_str(CONTEXT_PREFACE);
    for (rank, result) in results.iter().enumerate() {
        prompt.push_str(&format!("- [{}]: {}\n", rank, result.entry.text));
    }
    prompt.push('\n');
    prompt
}
