//! Inline style markup for output lines.
//!
//! Lines handed to an [`Output`](super::Output) may carry `<info>`,
//! `<comment>`, `<question>` and `<error>` tags. Decorated outputs turn them
//! into terminal styles, undecorated outputs strip them.

use console::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Comment,
    Question,
    Error,
}

impl MessageKind {
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Info,
        MessageKind::Comment,
        MessageKind::Question,
        MessageKind::Error,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Comment => "comment",
            MessageKind::Question => "question",
            MessageKind::Error => "error",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn style(self) -> Style {
        match self {
            MessageKind::Info => Style::new().green(),
            MessageKind::Comment => Style::new().yellow(),
            MessageKind::Question => Style::new().black().on_cyan(),
            MessageKind::Error => Style::new().white().on_red(),
        }
    }

    /// Wraps `message` in this kind's tags.
    pub fn wrap(self, message: &str) -> String {
        format!("<{tag}>{message}</{tag}>", tag = self.tag())
    }
}

enum Token<'a> {
    Text(&'a str),
    Open(MessageKind),
    Close(MessageKind),
}

fn tokenize(markup: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = markup;

    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let inner = &rest[start + 1..start + len];
        let token = match inner.strip_prefix('/') {
            Some(closing) => MessageKind::from_tag(closing).map(Token::Close),
            None => MessageKind::from_tag(inner).map(Token::Open),
        };

        match token {
            Some(token) => {
                if start > 0 {
                    tokens.push(Token::Text(&rest[..start]));
                }
                tokens.push(token);
            }
            // Not one of ours, keep it verbatim.
            None => tokens.push(Token::Text(&rest[..start + len + 1])),
        }
        rest = &rest[start + len + 1..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

/// Removes every known style tag.
pub fn strip(markup: &str) -> String {
    tokenize(markup)
        .into_iter()
        .filter_map(|token| match token {
            Token::Text(text) => Some(text),
            _ => None,
        })
        .collect()
}

/// Renders markup either as styled text or as plain text.
pub fn render(markup: &str, decorated: bool) -> String {
    if !decorated {
        return strip(markup);
    }

    let mut stack: Vec<MessageKind> = Vec::new();
    let mut rendered = String::with_capacity(markup.len());
    for token in tokenize(markup) {
        match token {
            Token::Open(kind) => stack.push(kind),
            Token::Close(kind) => {
                if let Some(pos) = stack.iter().rposition(|open| *open == kind) {
                    stack.remove(pos);
                }
            }
            Token::Text(text) => match stack.last() {
                Some(kind) => rendered.push_str(&kind.style().force_styling(true).apply_to(text).to_string()),
                None => rendered.push_str(text),
            },
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_known_tags() {
        assert_eq!(strip("<info>Hello</info> World"), "Hello World");
        assert_eq!(strip("[2024] <error>boom</error>"), "[2024] boom");
    }

    #[test]
    fn test_unknown_tags_are_kept() {
        assert_eq!(strip("a <b>c</b> <info>d</info>"), "a <b>c</b> d");
        assert_eq!(strip("value < 3"), "value < 3");
    }

    #[test]
    fn test_wrap_round_trips_through_strip() {
        let wrapped = MessageKind::Comment.wrap("note");
        assert_eq!(wrapped, "<comment>note</comment>");
        assert_eq!(strip(&wrapped), "note");
    }

    #[test]
    fn test_render_decorated_contains_ansi() {
        let rendered = render("<info>ok</info>", true);
        assert!(rendered.contains("ok"));
        assert!(rendered.contains('\u{1b}'));
        assert_eq!(render("<info>ok</info>", false), "ok");
    }
}
