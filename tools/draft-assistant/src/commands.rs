use player_registry::BoardFilter;
use thiserror::Error;

/// An edit to the active user's ranking list, positions 1-based as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEdit {
    Add(String),
    Remove(String),
    Up(usize),
    Down(usize),
    Move { from: usize, to: usize },
    Reverse,
    Shuffle,
    Reorder(Vec<usize>),
}

/// One line of session input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Users,
    User(String),
    Refresh,
    Status,
    Board { hide_drafted: bool, position: Option<String> },
    Search(String),
    Mine,
    Edit(ListEdit),
    Consensus,
    Auto(Option<u32>),
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}', type 'help' for the list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a list position")]
    BadPosition(String),
}

impl Command {
    /// Parse a trimmed input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => return Ok(None),
            "help" | "?" => Command::Help,
            "users" => Command::Users,
            "user" => Command::User(required(rest, "user <key>")?.to_lowercase()),
            "refresh" | "r" => Command::Refresh,
            "status" => Command::Status,
            "board" | "b" => parse_board(rest),
            "search" | "find" => Command::Search(required(rest, "search <text>")?.to_string()),
            "mine" | "list" => Command::Mine,
            "add" => Command::Edit(ListEdit::Add(required(rest, "add <player>")?.to_string())),
            "remove" | "rm" => Command::Edit(ListEdit::Remove(
                required(rest, "remove <player or #>")?.to_string(),
            )),
            "up" => Command::Edit(ListEdit::Up(position(required(rest, "up <#>")?)?)),
            "down" => Command::Edit(ListEdit::Down(position(required(rest, "down <#>")?)?)),
            "move" | "mv" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(from), Some(to), None) => {
                        Command::Edit(ListEdit::Move { from: position(from)?, to: position(to)? })
                    }
                    _ => return Err(ParseError::Usage("move <from#> <to#>")),
                }
            }
            "reverse" => Command::Edit(ListEdit::Reverse),
            "shuffle" | "randomize" => Command::Edit(ListEdit::Shuffle),
            "reorder" => {
                let order = required(rest, "reorder <#,#,...>")?
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|part| !part.is_empty())
                    .map(position)
                    .collect::<Result<Vec<_>, _>>()?;
                Command::Edit(ListEdit::Reorder(order))
            }
            "consensus" | "team" => Command::Consensus,
            "auto" => {
                let cycles = match rest {
                    "" => None,
                    n => Some(n.parse().map_err(|_| ParseError::Usage("auto [cycles]"))?),
                };
                Command::Auto(cycles)
            }
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }

    /// Board filter for the commands that list board rows
    pub fn board_filter(&self) -> Option<BoardFilter> {
        match self {
            Command::Board { hide_drafted, position } => Some(BoardFilter {
                hide_drafted: *hide_drafted,
                position: position.clone(),
                query: None,
            }),
            Command::Search(query) => {
                Some(BoardFilter { query: Some(query.clone()), ..Default::default() })
            }
            _ => None,
        }
    }
}

fn parse_board(rest: &str) -> Command {
    let mut hide_drafted = false;
    let mut position = None;
    for token in rest.split_whitespace() {
        match token.to_lowercase().as_str() {
            "hide" | "available" | "avail" => hide_drafted = true,
            "all" => position = None,
            _ => position = Some(token.to_uppercase()),
        }
    }
    Command::Board { hide_drafted, position }
}

fn required<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(rest)
    }
}

/// 1-based list position
fn position(text: &str) -> Result<usize, ParseError> {
    match text.trim_start_matches('#').parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::BadPosition(text.to_string())),
    }
}

pub const HELP: &str = "\
Draft board
  board [hide] [QB|RB|WR|TE]   ranked players, optionally hiding drafted ones
  search <text>                players whose name contains <text>
  refresh                      pull the live draft and mark drafted players
  auto [cycles]                refresh and redraw on a timer (blocks input)
  status                       identity, storage and last refresh

Identity
  users                        list team members
  user <key>                   switch the active member

My rankings
  mine                         show your list
  add <player>                 append a player
  remove <player or #>         drop a player
  up <#> / down <#>            swap with the neighbour
  move <from#> <to#>           reposition
  reverse | shuffle            flip or randomize the order
  reorder <#,#,...>            give the full new order by current positions

Team
  consensus                    average rank across everyone who ranked a player

  quit";
