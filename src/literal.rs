use regex::Regex;
use crate::error::{Error, Result};
use crate::rule::{Neighborhood, RuleTable};

/// Read a tape literal, `#` being a true cell and `.` a false one. The first
/// character is the anchor.
pub fn read_tape(src: impl AsRef<str>) -> Result<Vec<bool>> {
  let src = src.as_ref();
  if src.is_empty() {
    return Err(Error::EmptyTape);
  }

  src.chars()
    .enumerate()
    .map(|(column, character)| match character {
      '#' => Ok(true),
      '.' => Ok(false),
      _ => Err(Error::InvalidTapeCharacter { character, column }),
    })
    .collect()
}

pub fn write_tape(states: &[bool]) -> String {
  states.iter().map(|&state| if state { '#' } else { '.' }).collect()
}

/// Read rule lines of the form `..#.# => #`. Blank lines are skipped.
pub fn read_rules(src: impl AsRef<str>) -> Result<RuleTable> {
  read_rule_lines(src.as_ref().lines().enumerate())
}

/// Read a puzzle document:
///
/// ```text
/// initial state: #..#.#..##......###...###
///
/// ...## => #
/// ..#.. => #
/// ```
pub fn read_puzzle(src: impl AsRef<str>) -> Result<(Vec<bool>, RuleTable)> {
  let header_re = Regex::new(r"^initial state:\s*(\S*)$").unwrap();
  let mut lines = src.as_ref()
    .lines()
    .enumerate()
    .skip_while(|(_, line)| line.trim().is_empty());

  let tape = match lines.next() {
    Some((_, line)) => match header_re.captures(line.trim()) {
      Some(caps) => read_tape(&caps[1])?,
      None => return Err(Error::MissingHeader),
    },
    None => return Err(Error::MissingHeader),
  };

  Ok((tape, read_rule_lines(lines)?))
}

fn read_rule_lines<'a>(
  lines: impl Iterator<Item = (usize, &'a str)>,
) -> Result<RuleTable> {
  let rule_re = Regex::new(r"^([.#]{5})\s*=>\s*([.#])$").unwrap();
  let mut table = RuleTable::default();

  for (i, line) in lines {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }

    let caps = rule_re.captures(line).ok_or_else(|| Error::InvalidRuleLine {
      line: i + 1,
      text: line.to_owned(),
    })?;
    table.set(read_pattern(&caps[1]), &caps[2] == "#");
  }

  Ok(table)
}

fn read_pattern(src: &str) -> Neighborhood {
  let mut pattern = [false; 5];
  for (cell, c) in pattern.iter_mut().zip(src.bytes()) {
    *cell = c == b'#';
  }
  pattern
}
