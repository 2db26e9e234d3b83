use crate::model::ListFilter;

pub const DEFAULT_PREFIX: &str = "!todo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    List(ListFilter),
    Complete(Option<usize>),
    Delete(Option<usize>),
    Remind(String),
    Help,
}

#[derive(Debug, Clone)]
pub struct CommandParser {
    prefix: String,
    preserve_case: bool,
}

impl CommandParser {
    pub fn new<P: Into<String>>(prefix: P, preserve_case: bool) -> Self {
        let prefix = prefix.into();
        let prefix = match prefix.trim() {
            "" => DEFAULT_PREFIX.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            prefix,
            preserve_case,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parse(&self, text: &str) -> Option<Command> {
        let rest = strip_prefix_ignore_case(text.trim(), &self.prefix)?;
        let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();

        let (keyword, args) = match rest.find(char::is_whitespace) {
            Some(index) => (&rest[..index], rest[index..].trim()),
            None => (rest, ""),
        };

        match keyword.to_ascii_lowercase().as_str() {
            "add" if !args.is_empty() => Some(Command::Add(self.argument_text(args))),
            "list" => Some(Command::List(list_filter(args))),
            "complete" if !args.is_empty() => Some(Command::Complete(parse_position(args))),
            "delete" if !args.is_empty() => Some(Command::Delete(parse_position(args))),
            "remind" if !args.is_empty() => Some(Command::Remind(self.argument_text(args))),
            "help" if args.is_empty() => Some(Command::Help),
            _ => None,
        }
    }

    fn argument_text(&self, args: &str) -> String {
        if self.preserve_case {
            args.to_string()
        } else {
            args.to_lowercase()
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, false)
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

// Unknown qualifiers fall back to the full list.
fn list_filter(args: &str) -> ListFilter {
    match args.split_whitespace().next() {
        Some(word) if word.eq_ignore_ascii_case("done") => ListFilter::Completed,
        Some(word) if word.eq_ignore_ascii_case("pending") => ListFilter::Pending,
        _ => ListFilter::All,
    }
}

// Leading digits only, so `2 please` and `2nd` both mean position 2.
fn parse_position(args: &str) -> Option<usize> {
    let end = args
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(args.len());
    args[..end].parse::<usize>().ok()
}
