use crate::error::{ LlamaError, Result };
use crate::models::chat::{ ChatPrediction, Dialog };

pub const SEPARATOR: &str = "==================================";

/// Pairs each dialog with its prediction, in order, as printed on stdout.
pub fn render_transcript(
    dialogs: &[Dialog],
    results: &[ChatPrediction]
) -> Result<String> {
    if dialogs.len() != results.len() {
        return Err(LlamaError::ResultCountMismatch {
            dialogs: dialogs.len(),
            results: results.len(),
        });
    }

    let mut out = String::new();
    for (dialog, result) in dialogs.iter().zip(results) {
        for msg in dialog {
            out.push_str(&format!("{}: {}\n\n", msg.role.capitalized(), msg.content));
        }
        out.push_str(
            &format!(
                "> {}: {}\n",
                result.generation.role.capitalized(),
                result.generation.content
            )
        );
        out.push_str(&format!("\n{}\n\n", SEPARATOR));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Message;

    fn prediction(content: &str) -> ChatPrediction {
        ChatPrediction { generation: Message::assistant(content) }
    }

    #[test]
    fn renders_each_dialog_followed_by_its_reply() {
        let dialogs = vec![
            vec![Message::user("first?")],
            vec![Message::system("be brief"), Message::user("second?")]
        ];
        let results = vec![prediction("one"), prediction("two")];

        let text = render_transcript(&dialogs, &results).unwrap();
        let expected = format!(
            "User: first?\n\n> Assistant: one\n\n{sep}\n\nSystem: be brief\n\nUser: second?\n\n> Assistant: two\n\n{sep}\n\n",
            sep = SEPARATOR
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn replies_stay_with_their_dialogs() {
        let dialogs: Vec<Dialog> = (0..4)
            .map(|i| vec![Message::user(format!("question {}", i))])
            .collect();
        let results: Vec<ChatPrediction> = (0..4)
            .map(|i| prediction(&format!("answer {}", i)))
            .collect();

        let text = render_transcript(&dialogs, &results).unwrap();
        let blocks: Vec<&str> = text
            .split(SEPARATOR)
            .filter(|b| !b.trim().is_empty())
            .collect();
        assert_eq!(blocks.len(), 4);
        for (i, block) in blocks.iter().enumerate() {
            assert!(block.contains(&format!("User: question {}", i)));
            assert!(block.contains(&format!("> Assistant: answer {}", i)));
        }
    }

    #[test]
    fn mismatched_lengths_are_an_error() {
        let dialogs = vec![vec![Message::user("q")]];
        let err = render_transcript(&dialogs, &[]).unwrap_err();
        assert!(matches!(err, LlamaError::ResultCountMismatch { dialogs: 1, results: 0 }));
    }
}
