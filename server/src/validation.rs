use crate::error::ApiError;

/// Maximum length of a chat message, in characters
const MAX_MESSAGE_LENGTH: usize = 4000;
/// Maximum length of a session id
const MAX_SESSION_ID_LENGTH: usize = 128;

/// Validate a chat message
pub fn validate_chat_request(message: &str) -> Result<(), ApiError> {
    if message.trim().is_empty() {
        return Err(ApiError::InvalidInput("Message cannot be empty".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(())
}

/// Validate session id format: 1-128 characters of `[A-Za-z0-9_-]`
pub fn validate_session_id(id: &str) -> Result<(), ApiError> {
    if id.is_empty() || id.len() > MAX_SESSION_ID_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Session id must be 1-{} characters",
            MAX_SESSION_ID_LENGTH
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::InvalidInput(format!(
            "Invalid session id: {}. Allowed characters: letters, digits, '_' and '-'",
            id
        )));
    }
    Ok(())
}
