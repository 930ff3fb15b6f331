//! Llama 2 chat prompt layout.
//!
//! A normalised dialog alternates `user`/`assistant` turns and ends on a
//! `user` turn. Every completed exchange is wrapped in its own BOS/EOS pair,
//! the pending user turn gets a BOS only so the model continues after
//! `[/INST]`.

use crate::models::chat::{ Dialog, Message, Role };

pub const B_INST: &str = "[INST]";
pub const E_INST: &str = "[/INST]";
pub const B_SYS: &str = "<<SYS>>\n";
pub const E_SYS: &str = "\n<</SYS>>\n\n";
pub const BOS: &str = "<s>";
pub const EOS: &str = "</s>";

pub const SPECIAL_TAGS: [&str; 4] = [B_INST, E_INST, "<<SYS>>", "<</SYS>>"];

pub const UNSAFE_ERROR: &str = "Error: special tags are not allowed as part of the prompt.";

/// True when any turn smuggles in one of the prompt delimiters.
pub fn is_unsafe(dialog: &[Message]) -> bool {
    dialog.iter().any(|msg| SPECIAL_TAGS.iter().any(|tag| msg.content.contains(tag)))
}

/// Folds a leading system message into the first turn and checks the role order.
pub fn normalize(dialog: &[Message]) -> Result<Dialog, String> {
    let turns: Dialog = match dialog.split_first() {
        None => {
            return Err("dialog has no messages".to_string());
        }
        Some((first, rest)) if first.role == Role::System => {
            let system = format!("{}{}{}", B_SYS, first.content, E_SYS);
            match rest.split_first() {
                Some((next, tail)) => {
                    let mut turns = Vec::with_capacity(rest.len());
                    turns.push(Message::new(next.role, format!("{}{}", system, next.content)));
                    turns.extend_from_slice(tail);
                    turns
                }
                None => vec![Message::user(system)],
            }
        }
        Some(_) => dialog.to_vec(),
    };

    for (position, msg) in turns.iter().enumerate() {
        let expected = if position % 2 == 0 { Role::User } else { Role::Assistant };
        if msg.role != expected {
            return Err(
                format!(
                    "model only supports 'system', 'user' and 'assistant' roles, starting with 'system', then 'user' and alternating (u/a/u/a/u...); found '{}' at position {}",
                    msg.role,
                    position
                )
            );
        }
    }

    if let Some(last) = turns.last() {
        if last.role != Role::User {
            return Err(format!("last message must be from user, got '{}'", last.role));
        }
    }

    Ok(turns)
}

/// Renders a normalised dialog into the raw prompt text sent to the runtime.
pub fn render_prompt(dialog: &[Message]) -> String {
    let mut prompt = String::new();
    let (last, history) = match dialog.split_last() {
        Some(split) => split,
        None => {
            return prompt;
        }
    };

    for pair in history.chunks(2) {
        if let [question, answer] = pair {
            prompt.push_str(
                &format!(
                    "{}{} {} {} {} {}",
                    BOS,
                    B_INST,
                    question.content.trim(),
                    E_INST,
                    answer.content.trim(),
                    EOS
                )
            );
        }
    }
    prompt.push_str(&format!("{}{} {} {}", BOS, B_INST, last.content.trim(), E_INST));
    prompt
}
