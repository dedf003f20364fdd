/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    New,
    List,
    Switch(usize),
    Delete,
    Suggest,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Send(trimmed.to_string());
        };

        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("new"), None) => Command::New,
            (Some("list"), None) => Command::List,
            (Some("delete"), None) => Command::Delete,
            (Some("suggest"), None) => Command::Suggest,
            (Some("help"), None) => Command::Help,
            (Some("quit" | "exit"), None) => Command::Quit,
            (Some("switch"), Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Command::Switch(n),
                _ => Command::Unknown(trimmed.to_string()),
            },
            // `/2` picks the second suggested query.
            (Some(n), None) => match n.parse::<usize>() {
                Ok(n) if (1..=super::SUGGESTED_QUERIES.len()).contains(&n) => {
                    Command::Send(super::SUGGESTED_QUERIES[n - 1].1.to_string())
                }
                _ => Command::Unknown(trimmed.to_string()),
            },
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}

pub const HELP: &str = "\
Type a question and press Enter to ask it.
  /new         start a new chat
  /list        list chats
  /switch <n>  switch to chat n
  /delete      delete the current chat
  /suggest     show suggested questions (send one with /1 .. /4)
  /quit        exit";
