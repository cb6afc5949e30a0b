//! Line-oriented text protocol.
//!
//! Client lines are parsed into core values here; bounds and occupancy are
//! left to the core so that every rule is enforced in one place. Server
//! output is modelled as [`Reply`] values whose `Display` is the exact text
//! sent on the wire, one or more lines per reply.

use std::fmt;

use crate::core::{
    board::Snapshot,
    common::{AttackOutcome, Coord, Line},
    ship::Orientation,
};

/// Errors from parsing a client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    /// Cell is not a letter followed by a positive number.
    InvalidCell(String),
    InvalidOrientation(String),
    /// Extra or missing words.
    WrongArity { expected: usize, found: usize },
    InvalidBombingChoice(String),
    InvalidLine(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty line"),
            ParseError::InvalidCell(s) => write!(f, "invalid cell '{}'", s),
            ParseError::InvalidOrientation(s) => write!(f, "invalid orientation '{}'", s),
            ParseError::WrongArity { expected, found } => {
                write!(f, "expected {} word(s), found {}", expected, found)
            }
            ParseError::InvalidBombingChoice(s) => write!(f, "invalid bombing choice '{}'", s),
            ParseError::InvalidLine(s) => write!(f, "invalid line '{}'", s),
        }
    }
}

impl std::error::Error for ParseError {}

fn words(line: &str, expected: usize) -> Result<Vec<&str>, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Err(ParseError::Empty);
    }
    if words.len() != expected {
        return Err(ParseError::WrongArity {
            expected,
            found: words.len(),
        });
    }
    Ok(words)
}

fn row_from_letter(letter: char) -> Option<usize> {
    letter
        .is_ascii_alphabetic()
        .then(|| (letter.to_ascii_uppercase() as u8 - b'A') as usize)
}

fn column_from_number(number: &str) -> Option<usize> {
    match number.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n - 1),
        _ => None,
    }
}

/// Parse a cell such as `A1` or `j10`: row letter, then 1-based column.
pub fn parse_cell(token: &str) -> Result<Coord, ParseError> {
    let invalid = || ParseError::InvalidCell(token.to_string());
    let mut chars = token.chars();
    let letter = chars.next().ok_or_else(invalid)?;
    let row = row_from_letter(letter).ok_or_else(invalid)?;
    let col = column_from_number(chars.as_str()).ok_or_else(invalid)?;
    Ok(Coord::new(row, col))
}

/// Parse a placement line: `<cell> <horizontal|vertical>`.
pub fn parse_placement(line: &str) -> Result<(Coord, Orientation), ParseError> {
    let words = words(line, 2)?;
    let origin = parse_cell(words[0])?;
    let orientation = Orientation::from_tag(words[1])
        .ok_or_else(|| ParseError::InvalidOrientation(words[1].to_string()))?;
    Ok((origin, orientation))
}

/// Parse an attack line: `<cell>`.
pub fn parse_target(line: &str) -> Result<Coord, ParseError> {
    let words = words(line, 1)?;
    parse_cell(words[0])
}

/// Which kind of line a bombing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BombAxis {
    Row,
    Column,
}

/// Answer to the bombing prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BombingChoice {
    Axis(BombAxis),
    Decline,
}

/// Parse `row`, `column` or `skip`, case-insensitive.
pub fn parse_bombing_choice(line: &str) -> Result<BombingChoice, ParseError> {
    let words = words(line, 1)?;
    match words[0].to_ascii_lowercase().as_str() {
        "row" | "r" => Ok(BombingChoice::Axis(BombAxis::Row)),
        "column" | "col" | "c" => Ok(BombingChoice::Axis(BombAxis::Column)),
        "skip" | "no" => Ok(BombingChoice::Decline),
        _ => Err(ParseError::InvalidBombingChoice(words[0].to_string())),
    }
}

/// Parse the row letter or column number that follows a bombing choice.
pub fn parse_line_index(axis: BombAxis, line: &str) -> Result<Line, ParseError> {
    let words = words(line, 1)?;
    let token = words[0];
    let invalid = || ParseError::InvalidLine(token.to_string());
    match axis {
        BombAxis::Row => {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) => row_from_letter(letter).map(Line::Row).ok_or_else(invalid),
                _ => Err(invalid()),
            }
        }
        BombAxis::Column => column_from_number(token).map(Line::Column).ok_or_else(invalid),
    }
}

/// A message from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Welcome,
    PlacePrompt { length: usize },
    InvalidPlacement,
    SetupComplete { own_board: Snapshot },
    TurnPrompt,
    InvalidTarget,
    NotYourTurn,
    Outcome(AttackOutcome),
    EnemyBoard(Snapshot),
    OwnBoard(Snapshot),
    BombingUnlocked,
    BombingChoicePrompt,
    BombingAxisPrompt(BombAxis),
    InvalidBombingChoice,
    Bombed { line: Line, hits: usize, misses: usize },
    BombingDeclined,
    AutomatedAttack { target: Coord, outcome: AttackOutcome },
    AutomatedBombing(Line),
    GameOver { won: bool },
    ServerFull,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Welcome => write!(
                f,
                "Welcome to Battleship! Place your ships on the board.\n\
                 Enter ship coordinates and direction (e.g., 'A1 horizontal')"
            ),
            Reply::PlacePrompt { length } => write!(f, "Place your ship of length {}:", length),
            Reply::InvalidPlacement => write!(f, "Invalid placement! Try again."),
            Reply::SetupComplete { own_board } => write!(
                f,
                "Setup completed. Your board looks like this!\n{}\nLet the game begin!",
                own_board
            ),
            Reply::TurnPrompt => write!(f, "Your turn! Enter target coordinates (e.g., 'A1'):"),
            Reply::InvalidTarget => write!(f, "Invalid target! Try again."),
            Reply::NotYourTurn => write!(f, "Not your turn! Wait for your opponent."),
            Reply::Outcome(AttackOutcome::Hit) => write!(f, "Hit!"),
            Reply::Outcome(AttackOutcome::Miss) => write!(f, "Miss!"),
            Reply::EnemyBoard(board) => write!(f, "AI board:\n{}", board),
            Reply::OwnBoard(board) => write!(f, "Your board:\n{}", board),
            Reply::BombingUnlocked => write!(f, "You've unlocked the bombing option!"),
            Reply::BombingChoicePrompt => {
                write!(f, "Do you want to bomb a row or column? (row/column)")
            }
            Reply::BombingAxisPrompt(BombAxis::Row) => write!(f, "Enter the row (A-J) to bomb:"),
            Reply::BombingAxisPrompt(BombAxis::Column) => {
                write!(f, "Enter the column (1-10) to bomb:")
            }
            Reply::InvalidBombingChoice => write!(f, "Invalid choice! Try again."),
            Reply::Bombed { line, hits, misses } => write!(
                f,
                "Bombed {}: {} hit(s), {} miss(es).",
                line, hits, misses
            ),
            Reply::BombingDeclined => write!(f, "Bombing skipped."),
            Reply::AutomatedAttack { target, outcome } => {
                let verdict = match outcome {
                    AttackOutcome::Hit => "AI Hit!",
                    AttackOutcome::Miss => "AI Miss!",
                };
                write!(f, "AI chose: {}\n{}", target, verdict)
            }
            Reply::AutomatedBombing(line) => write!(f, "AI bombed {}!", line),
            Reply::GameOver { won } => {
                write!(f, "Game Over!\n{}", if *won { "You Win!" } else { "You Lose!" })
            }
            Reply::ServerFull => write!(f, "Server is full, try again later."),
        }
    }
}

