use std::fmt::{self, Display};
use std::str::FromStr;
use itertools::Itertools;
use crate::error::Error;
use crate::literal;

/// `[left2, left1, center, right1, right2]`
pub type Neighborhood = [bool; 5];

/// A neighborhood packed into the low 5 bits, `left2` being bit 4 and
/// `right2` bit 0.
pub(crate) type NeighborMask = u8;

/// Next state for every one of the 32 neighborhoods. Neighborhoods that were
/// never set map to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RuleTable {
  /// Bit `i` holds the result for the neighborhood with mask `i`.
  next: u32,
}

pub(crate) fn mask_of(pattern: Neighborhood) -> NeighborMask {
  pattern.iter().fold(0, |mask, &cell| mask << 1 | cell as u8)
}

pub(crate) fn pattern_of(mask: NeighborMask) -> Neighborhood {
  let mut pattern = [false; 5];
  for (i, cell) in pattern.iter_mut().enumerate() {
    *cell = mask >> (4 - i) & 1 != 0;
  }
  pattern
}

impl RuleTable {
  /// Later entries for the same neighborhood override earlier ones.
  pub fn build(entries: impl IntoIterator<Item = (Neighborhood, bool)>) -> Self {
    let mut table = Self::default();
    for (pattern, result) in entries {
      table.set(pattern, result);
    }
    table
  }

  pub fn set(&mut self, pattern: Neighborhood, result: bool) {
    let bit = 1 << mask_of(pattern);
    if result {
      self.next |= bit;
    } else {
      self.next &= !bit;
    }
  }

  pub fn lookup(&self, pattern: Neighborhood) -> bool {
    self.lookup_mask(mask_of(pattern))
  }

  pub(crate) fn lookup_mask(&self, mask: NeighborMask) -> bool {
    self.next >> mask & 1 != 0
  }

  /// Neighborhoods whose center becomes `true`, in mask order.
  pub fn births(&self) -> impl Iterator<Item = Neighborhood> + '_ {
    (0..32).filter(move |&mask| self.lookup_mask(mask)).map(pattern_of)
  }
}

impl Display for RuleTable {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let lines = self.births()
      .map(|pattern| format!("{} => #", literal::write_tape(&pattern)))
      .join("\n");
    write!(f, "{}", lines)
  }
}

impl FromStr for RuleTable {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    literal::read_rules(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  const T: bool = true;
  const F: bool = false;

  #[test]
  fn test_mask_order() {
    assert_eq!(mask_of([T, F, F, F, F]), 0b10000);
    assert_eq!(mask_of([F, F, F, T, T]), 0b00011);
    for mask in 0..32 {
      assert_eq!(mask_of(pattern_of(mask)), mask);
    }
  }

  #[test]
  fn test_unlisted_patterns_are_false() {
    let table = RuleTable::build(vec![([F, F, T, F, F], T), ([T, T, F, T, T], T)]);
    for mask in 0..32 {
      let pattern = pattern_of(mask);
      let listed = pattern == [F, F, T, F, F] || pattern == [T, T, F, T, T];
      assert!(table.lookup(pattern) == listed, "{:?}", pattern);
    }
  }

  #[test]
  fn test_last_entry_wins() {
    let table = RuleTable::build(vec![
      ([F, T, T, T, F], T),
      ([F, T, T, T, F], F),
      ([T, F, F, F, F], F),
      ([T, F, F, F, F], T),
    ]);
    assert!(!table.lookup([F, T, T, T, F]));
    assert!(table.lookup([T, F, F, F, F]));
    assert_eq!(table.births().count(), 1);
  }

  #[test]
  fn test_display() {
    let table = RuleTable::build(vec![([T, F, T, F, T], T), ([F, F, F, T, T], T)]);
    assert_eq!(table.to_string(), "...## => #\n#.#.# => #");
    assert_eq!(RuleTable::default().to_string(), "");
  }
}
