use crate::db::StoreError;

/// Errors produced by the help system. Both are shown to users as plain text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HelpError {
    /// Unknown command, or one the invoker isn't allowed to see. The two cases
    /// render identically.
    #[error("Command not found")]
    NotFound,
    #[error("You cannot use this select.")]
    Unauthorized,
}

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("You are blacklisted from using this bot. Reason: {reason}")]
    Blacklisted { reason: String },
    #[error("This command can only be used in servers")]
    GuildOnly,
    #[error("The scope must be `global` or `guild`.")]
    InvalidScope,
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Translation failed: {0}")]
    Translation(String),
}
