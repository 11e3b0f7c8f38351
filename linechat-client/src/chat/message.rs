//! Chat messages and their color classification

/// Maximum number of code points one log entry may hold
///
/// Matches the inner width of the 80-column frame.
pub const LINE_WIDTH: usize = 78;

/// How a message is colored when rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Classification {
    /// Plain text with no `name:` prefix, typically our own sends
    #[default]
    User,
    /// `name: text` lines relayed by the server
    Server,
    /// `name: > text` lines the server uses for greetings and notices
    Greeting,
}

/// Classify a line by its shape
///
/// Lines without a colon are `User`. Otherwise the two code points after the
/// first colon decide: a `>` in the second position marks a `Greeting`,
/// anything else is `Server`.
pub fn classify(text: &str) -> Classification {
    match text.split_once(':') {
        None => Classification::User,
        Some((_, rest)) if rest.chars().nth(1) == Some('>') => Classification::Greeting,
        Some(_) => Classification::Server,
    }
}

/// A single renderable log line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    content: String,
    classification: Classification,
}

impl Message {
    /// Create a message, classifying it from its content
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let classification = classify(&content);
        Self {
            content,
            classification,
        }
    }

    /// Blank entry used to fill unused log slots
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Whether this entry is an unused slot
    pub fn is_placeholder(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of code points in the content
    pub fn width(&self) -> usize {
        self.content.chars().count()
    }
}
