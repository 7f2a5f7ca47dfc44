use std::sync::LazyLock;

use regex::Regex;

/// What the model asked for on one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Action { tool: String, input: String },
    Final { answer: String },
}

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*Action[ \t]*:[ \t]*(.*?)[ \t]*$").expect("valid action regex")
});

static ACTION_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action[ \t]*Input[ \t]*:[ \t]*(.*)").expect("valid action input regex")
});

static FINAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Final[ \t]*Answer[ \t]*:[ \t]*(.*)").expect("valid final answer regex")
});

/// Parse one ReAct turn.
///
/// An `Action:` line wins over a `Final Answer:` that comes after it. Text
/// with neither marker is treated as the final answer as-is. Anything the
/// model writes after `Observation` is its own guess and is dropped.
#[must_use]
pub fn parse_step(response: &str) -> AgentStep {
    let final_at = FINAL_RE.captures(response).and_then(|c| c.get(1));
    let action = ACTION_RE
        .captures(response)
        .and_then(|c| c.get(1))
        .filter(|m| !clean_tool_name(m.as_str()).is_empty());

    if let Some(action) = action
        && final_at.is_none_or(|f| action.start() < f.start())
    {
        let rest = &response[action.end()..];
        let input = ACTION_INPUT_RE
            .captures(rest)
            .and_then(|c| c.get(1))
            .map(|m| cut_observation(m.as_str()).trim().to_owned())
            .unwrap_or_default();
        return AgentStep::Action {
            tool: clean_tool_name(action.as_str()).to_owned(),
            input,
        };
    }

    let answer = match final_at {
        Some(m) => m.as_str(),
        None => response,
    };
    AgentStep::Final {
        answer: cut_observation(answer).trim().to_owned(),
    }
}

fn clean_tool_name(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| matches!(c, '`' | '"' | '\'' | '[' | ']' | '*'))
        .trim()
}

fn cut_observation(text: &str) -> &str {
    match text.find("\nObservation") {
        Some(idx) => &text[..idx],
        None => text,
    }
}
