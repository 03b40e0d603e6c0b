//! Prompt templates and placeholder summaries.

/// Placeholder summary for files exceeding the size threshold.
pub const TOO_LARGE_SUMMARY: &str = "Too large to summarize";

/// Placeholder summary when the oracle fails or returns nothing.
pub const MISSING_SUMMARY: &str = "Missing summary";

/// Prompt asking the oracle to summarize one file's content.
pub fn file_prompt(content: &str) -> String {
    format!(
        "This is the code of a file:\n```\n{content}\n```\n\n\
         Please give me a summary of what this file does."
    )
}

/// Prompt asking the oracle to summarize a directory from its children's
/// summaries.
pub fn directory_prompt(child_summaries: &[String]) -> String {
    format!(
        "This is a list of file summaries in a directory:\n\n{}\n\n\
         Please give me a summary of all files in this directory.",
        child_summaries.join("\n\n")
    )
}
