//! Prompt construction for both backend styles.

use crate::message::{Message, Role};

/// Fixed system instruction sent with every turn.
pub const SYSTEM_PROMPT: &str = "You are a friendly and helpful AI assistant. Always respond in English only. Keep your answers concise and conversational. Do not use markdown formatting - respond in plain text only.";

/// Chat prompt: system instruction, prior history, then the new user message.
pub fn build_messages(system_prompt: &str, history: &[Message], current: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend_from_slice(history);
    messages.push(Message::user(current));
    messages
}

/// A chat prompt flattened into plain text for completion-style APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub system_prompt: String,
    pub prompt: String,
}

/// Flatten a message list into `User:` / `Assistant:` lines.
///
/// The first system message becomes both the transcript header and the
/// separate system field; the text ends with an open `Assistant:` turn.
pub fn render_transcript(messages: &[Message]) -> Transcript {
    let (system_prompt, rest) = match messages.split_first() {
        Some((first, rest)) if first.role == Role::System => (first.content.clone(), rest),
        _ => (String::new(), messages),
    };

    let mut prompt = String::new();
    if !system_prompt.is_empty() {
        prompt.push_str(&system_prompt);
        prompt.push_str("\n\n");
    }
    for msg in rest {
        let label = match msg.role {
            Role::User => Role::User.label(),
            _ => Role::Assistant.label(),
        };
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&msg.content);
        prompt.push('\n');
    }
    prompt.push_str("Assistant:");

    Transcript {
        system_prompt,
        prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_order() {
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let messages = build_messages(SYSTEM_PROMPT, &history, "how are you");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::system(SYSTEM_PROMPT));
        assert_eq!(&messages[1..3], history.as_slice());
        assert_eq!(messages[3], Message::user("how are you"));
    }

    #[test]
    fn test_build_messages_without_history() {
        let messages = build_messages("sys", &[], "first");
        assert_eq!(messages, vec![Message::system("sys"), Message::user("first")]);
    }

    #[test]
    fn test_render_transcript() {
        let messages = build_messages(
            "Be nice.",
            &[Message::user("hi"), Message::assistant("hello there")],
            "what's up",
        );
        let transcript = render_transcript(&messages);

        assert_eq!(transcript.system_prompt, "Be nice.");
        assert_eq!(
            transcript.prompt,
            "Be nice.\n\nUser: hi\nAssistant: hello there\nUser: what's up\nAssistant:"
        );
    }

    #[test]
    fn test_render_transcript_without_system() {
        let transcript = render_transcript(&[Message::user("ping")]);
        assert!(transcript.system_prompt.is_empty());
        assert_eq!(transcript.prompt, "User: ping\nAssistant:");
    }
}
