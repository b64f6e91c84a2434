use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A tape literal contains something other than `.` or `#`.
  #[error("invalid tape character {character:?} at column {column}")]
  InvalidTapeCharacter {
    character: char,
    column: usize,
  },

  #[error("empty tape")]
  EmptyTape,

  /// A non-blank line that is not of the form `PPPPP => R`.
  #[error("invalid rule on line {line}: {text:?}")]
  InvalidRuleLine {
    line: usize,
    text: String,
  },

  #[error("missing `initial state:` header")]
  MissingHeader,

  /// `..... => #` would turn every cell of the unbounded tape on.
  #[error("rule `..... => #` is not allowed on an unbounded tape")]
  VacuumBirth,

  /// An extrapolated generation or score does not fit its integer type.
  #[error("forecast overflows: {0}")]
  ScoreOverflow(&'static str),

  #[error(transparent)]
  Image(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
