//! Formatting retrieved passages for prompts and for display.

use crate::chunking::Passage;
use crate::vector_index::SearchResult;

/// Format passages as the grounding context of a prompt.
pub fn format_context_for_prompt(passages: &[Passage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| {
            format!(
                "[{}] (page {})\n{}",
                i + 1,
                passage.source_page,
                passage.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format search results for display to the user.
pub fn format_context_for_display(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| {
            format!(
                "Page {} (score: {:.2})\n{}",
                result.passage.source_page,
                result.score,
                result.passage.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_context_is_numbered() {
        let passages = vec![
            Passage::new("Attendance rules.".to_string(), 4, (0, 17)),
            Passage::new(" Grading scale. ".to_string(), 9, (100, 116)),
        ];

        let context = format_context_for_prompt(&passages);
        assert_eq!(
            context,
            "[1] (page 4)\nAttendance rules.\n\n[2] (page 9)\nGrading scale."
        );
    }
}
