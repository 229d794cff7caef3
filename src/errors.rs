use std::fmt;

/// Errors surfaced by the bot. Their `Display` text is shown to the user as is.
#[derive(Debug)]
pub enum BotError {
    /// yt-dlp reported a failure (stderr attached)
    YoutubeError(String),
    /// Filesystem errors
    FileSystemError(std::io::Error),
    /// Telegram API errors
    TelegramError(teloxide::RequestError),
    /// Could not parse collaborator output
    ParseError(String),
    /// Bad configuration value
    InvalidParameters(String),
    /// External command could not be started
    ExternalCommandError { command: String, stderr: String },
    General(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::YoutubeError(msg) => write!(f, "{}", msg),
            BotError::FileSystemError(e) => write!(f, "File system error: {}", e),
            BotError::TelegramError(e) => write!(f, "Telegram API error: {}", e),
            BotError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            BotError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
            BotError::ExternalCommandError { command, stderr } => {
                write!(f, "Command {} failed: {}", command, stderr)
            }
            BotError::General(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::FileSystemError(e) => Some(e),
            BotError::TelegramError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::FileSystemError(err)
    }
}

impl From<teloxide::RequestError> for BotError {
    fn from(err: teloxide::RequestError) -> Self {
        BotError::TelegramError(err)
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::ParseError(format!("JSON parsing error: {}", err))
    }
}

impl BotError {
    pub fn youtube_error(msg: impl Into<String>) -> Self {
        Self::YoutubeError(msg.into())
    }

    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    pub fn external_command_error(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExternalCommandError {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}

pub type BotResult<T> = Result<T, BotError>;

/// Result type for dptree endpoints
pub type HandlerResult = BotResult<()>;
