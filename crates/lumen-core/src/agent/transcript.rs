use lumen_llm::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRole {
    User,
    Agent,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: EntryRole,
    pub content: String,
    pub tool_name: Option<String>,
}

/// Append-only reasoning trace for one agent invocation.
///
/// Starts with the question as its only entry and is dropped once the final
/// answer has been extracted.
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    #[must_use]
    pub fn new(question: &str) -> Self {
        Self {
            entries: vec![TranscriptEntry {
                role: EntryRole::User,
                content: question.to_owned(),
                tool_name: None,
            }],
        }
    }

    pub fn push_agent(&mut self, content: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            role: EntryRole::Agent,
            content: content.into(),
            tool_name: None,
        });
    }

    pub fn push_tool(&mut self, tool_name: impl Into<String>, observation: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            role: EntryRole::Tool,
            content: observation.into(),
            tool_name: Some(tool_name.into()),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    #[must_use]
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as chat messages behind `system`. Observations go back to the
    /// model as user turns.
    #[must_use]
    pub fn to_messages(&self, system: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.entries.len() + 1);
        messages.push(Message::system(system));
        for entry in &self.entries {
            messages.push(match entry.role {
                EntryRole::User => Message::user(format!("Question: {}", entry.content)),
                EntryRole::Agent => Message::assistant(entry.content.clone()),
                EntryRole::Tool => Message::user(format!("Observation: {}", entry.content)),
            });
        }
        messages
    }
}
