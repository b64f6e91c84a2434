use std::fmt::{self, Display};
use std::hash::BuildHasherDefault;
use std::iter;
use indexmap::IndexMap;
use itertools::{Itertools, MinMaxResult};
use rustc_hash::FxHasher;
use tracing::{debug, trace};
use crate::error::{Error, Result};
use crate::literal;
use crate::node::*;
use crate::rule::*;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Old states of five consecutive cells, packed like a `NeighborMask`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window(NeighborMask);

impl Window {
  /// Moves the window one cell towards `side`; `incoming` enters at that end.
  fn shift(self, side: Side, incoming: bool) -> Self {
    match side {
      Side::Right => Window(self.0 << 1 & 0b11111 | incoming as u8),
      Side::Left => Window(self.0 >> 1 | (incoming as u8) << 4),
    }
  }

  fn is_empty(self) -> bool {
    self.0 == 0
  }
}

/// An unbounded one-dimensional tape evolving under a `RuleTable`.
///
/// Positions are relative to the anchor cell, which is the first cell of the
/// initial tape. Cells are only materialized as far as true states reach.
pub struct Universe {
  tape: Tape,
  rules: RuleTable,
  generation: u64,
}

impl Universe {
  pub fn new(
    initial: impl IntoIterator<Item = bool>,
    rules: RuleTable,
  ) -> Result<Self> {
    if rules.lookup([false; 5]) {
      return Err(Error::VacuumBirth);
    }

    let mut states = initial.into_iter();
    let mut tape = Tape::new(states.next().ok_or(Error::EmptyTape)?);
    let mut outer = ANCHOR;
    for state in states {
      let id = tape.alloc(state);
      tape.link(outer, Side::Right, id);
      outer = id;
    }

    Ok(Self {
      tape,
      rules,
      generation: 0,
    })
  }

  pub fn from_literal(tape: impl AsRef<str>, rules: RuleTable) -> Result<Self> {
    Self::new(literal::read_tape(tape)?, rules)
  }

  pub fn rules(&self) -> &RuleTable {
    &self.rules
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Advances one generation.
  ///
  /// The anchor is updated first, then each side is swept outwards in place,
  /// and finally false cells are trimmed from both ends.
  pub fn step(&mut self) {
    let [left1, left2] = self.peek(Side::Left);
    let [right1, right2] = self.peek(Side::Right);
    let center = self.tape.cell(ANCHOR).state;
    let window = Window(mask_of([left2, left1, center, right1, right2]));

    let mut anchor = Node::Real(ANCHOR);
    self.tape.write(&mut anchor, self.rules.lookup_mask(window.0));

    for &side in &Side::BOTH {
      self.sweep(side, window);
    }

    let released: usize = Side::BOTH.iter().map(|&side| self.tape.trim(side)).sum();
    self.generation += 1;
    trace!(generation = self.generation, cells = self.tape.len(), released, "step");
  }

  /// `num_gen` is number of generations.
  pub fn simulate(&mut self, num_gen: u64) {
    for _ in 0..num_gen {
      self.step();
    }
  }

  /// Old states of the two cells next to the anchor on `side`, nearest first.
  fn peek(&self, side: Side) -> [bool; 2] {
    let mut states = self.tape.iter_with_frontier(ANCHOR, side)
      .map(|node| self.tape.read(node));
    [states.next().unwrap_or(false), states.next().unwrap_or(false)]
  }

  /// Rewrites every cell on `side` of the anchor. `window` holds the old
  /// states centered on the anchor.
  ///
  /// `read` stays two cells ahead of `write`, so each old state is read before
  /// the cell holding it is overwritten.
  fn sweep(&mut self, side: Side, mut window: Window) {
    let tape = &mut self.tape;
    let rules = &self.rules;

    let mut write = tape.advance(Node::Real(ANCHOR), side);
    let mut read = tape.advance(tape.advance(write, side), side);
    loop {
      debug_assert_eq!(
        tape.resolve(read),
        tape.advance(tape.advance(write, side), side),
        "read cursor must lead write cursor by two cells"
      );

      window = window.shift(side, tape.read(read));
      // Past the real cells with an empty window, everything further out
      // stays false.
      if write.is_frontier() && window.is_empty() {
        break;
      }

      tape.write(&mut write, rules.lookup_mask(window.0));
      write = tape.advance(write, side);
      read = tape.advance(read, side);
    }
  }

  /// Sum of the positions of all true cells.
  pub fn score(&self) -> i64 {
    Side::BOTH.iter()
      .map(|&side| {
        self.tape.iter(ANCHOR, side)
          .zip(1i64..)
          .filter(|&(id, _)| self.tape.cell(id).state)
          .map(|(_, hops)| hops * side.unit())
          .sum::<i64>()
      })
      .sum()
  }

  pub fn population(&self) -> usize {
    self.cells().filter(|&(_, state)| state).count()
  }

  /// Position of the leftmost real cell.
  pub fn origin(&self) -> i64 {
    -(self.tape.iter(ANCHOR, Side::Left).count() as i64)
  }

  /// `(position, state)` of every real cell, left to right.
  pub fn cells(&self) -> impl Iterator<Item = (i64, bool)> + '_ {
    let leftmost = self.tape.outermost(Side::Left);
    iter::once(leftmost)
      .chain(self.tape.iter(leftmost, Side::Right))
      .zip(self.origin()..)
      .map(move |(id, position)| (position, self.tape.cell(id).state))
  }

  /// Positions of the leftmost and rightmost true cells, both inclusive.
  pub fn boundary(&self) -> Option<(i64, i64)> {
    match self.cells().filter(|&(_, state)| state).map(|(position, _)| position).minmax() {
      MinMaxResult::NoElements => None,
      MinMaxResult::OneElement(position) => Some((position, position)),
      MinMaxResult::MinMax(left, right) => Some((left, right)),
    }
  }

  /// The live pattern between the outermost true cells, and its position.
  fn signature(&self) -> Option<(Box<str>, i64)> {
    let (left, right) = self.boundary()?;
    let states: Vec<_> = self.cells()
      .filter(|&(position, _)| position >= left && position <= right)
      .map(|(_, state)| state)
      .collect();
    Some((literal::write_tape(&states).into_boxed_str(), left))
  }

  /// Score after `num_gen` more generations.
  ///
  /// Simulates until the live pattern repeats (possibly shifted), then
  /// extrapolates over the remaining whole periods. The universe is left at
  /// whatever generation the extrapolation started from.
  ///
  /// Fails with `Error::ScoreOverflow` if the target generation or the score
  /// does not fit.
  pub fn forecast(&mut self, num_gen: u64) -> Result<i64> {
    let target = self.generation.checked_add(num_gen)
      .ok_or(Error::ScoreOverflow("target generation"))?;
    // index `i` holds the pattern of the `i`-th generation simulated here
    let mut seen: FxIndexMap<Box<str>, i64> = FxIndexMap::default();

    while self.generation < target {
      let (pattern, left) = match self.signature() {
        Some(signature) => signature,
        None => return Ok(0),
      };

      if let Some((index, _, &earlier)) = seen.get_full(&pattern) {
        let period = (seen.len() - index) as u64;
        let shift = left - earlier;
        let remaining = target - self.generation;
        debug!(generation = self.generation, period, shift, "cycle detected");

        self.simulate(remaining % period);
        let cycles = i128::from(remaining / period);
        let score = (self.population() as i128)
          .checked_mul(i128::from(shift))
          .and_then(|moved| moved.checked_mul(cycles))
          .and_then(|moved| moved.checked_add(i128::from(self.score())))
          .ok_or(Error::ScoreOverflow("score"))?;
        return i64::try_from(score).map_err(|_| Error::ScoreOverflow("score"));
      }

      seen.insert(pattern, left);
      self.step();
    }

    Ok(self.score())
  }

  /// Number of materialized cells, anchor included.
  pub fn real_cells(&self) -> usize {
    self.tape.len()
  }
}

impl Display for Universe {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let states: Vec<_> = self.cells().map(|(_, state)| state).collect();
    write!(f, "{}", literal::write_tape(&states))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeSet;
  use pretty_assertions::assert_eq;
  use proptest::prelude::*;

  const SAMPLE_TAPE: &str = "#..#.#..##......###...###";

  const SAMPLE_RULES: &str = "
...## => #
..#.. => #
.#... => #
.#.#. => #
.#.## => #
.##.. => #
.#### => #
#.#.# => #
#.### => #
##.#. => #
##.## => #
###.. => #
###.# => #
####. => #
";

  fn sample() -> Universe {
    let rules = literal::read_rules(SAMPLE_RULES).unwrap();
    Universe::from_literal(SAMPLE_TAPE, rules).unwrap()
  }

  fn rules_from_bits(bits: u32) -> RuleTable {
    RuleTable::build((0..32).map(|mask| (pattern_of(mask), bits >> mask & 1 != 0)))
  }

  fn live(uni: &Universe) -> BTreeSet<i64> {
    uni.cells().filter(|&(_, state)| state).map(|(position, _)| position).collect()
  }

  /// Double-buffered model: every position within two cells of a live one.
  fn reference_step(live: &BTreeSet<i64>, rules: &RuleTable) -> BTreeSet<i64> {
    let (left, right) = match (live.iter().next(), live.iter().next_back()) {
      (Some(&left), Some(&right)) => (left, right),
      _ => return BTreeSet::new(),
    };
    (left - 2..=right + 2)
      .filter(|&position| {
        let mut pattern = [false; 5];
        for (i, cell) in pattern.iter_mut().enumerate() {
          *cell = live.contains(&(position + i as i64 - 2));
        }
        rules.lookup(pattern)
      })
      .collect()
  }

  #[test]
  fn test_round_trip() {
    let uni = Universe::from_literal("#..#", RuleTable::default()).unwrap();
    assert_eq!(uni.to_string(), "#..#");
    assert_eq!(uni.origin(), 0);
    assert_eq!(uni.score(), 3);
  }

  #[test]
  fn test_sample_generations() {
    let mut uni = sample();
    uni.step();
    assert_eq!(uni.to_string(), "#...#....#.....#..#..#..#");
    uni.step();
    assert_eq!(uni.to_string(), "##..##...##....#..#..#..##");
    uni.step();
    assert_eq!(uni.to_string(), "#.#...#..#.#....#..#..#...#");
    assert_eq!(uni.origin(), -1);
    uni.step();
    assert_eq!(uni.to_string(), "#.#..#...#.#...#..#..##..##");
    assert_eq!(uni.origin(), 0);
    assert_eq!(uni.generation(), 4);
  }

  #[test]
  fn test_sample_score() {
    let mut uni = sample();
    uni.simulate(20);
    assert_eq!(uni.to_string(), "#....##....#####...#######....#.#..##");
    assert_eq!(uni.origin(), -2);
    assert_eq!(uni.score(), 325);
  }

  #[test]
  fn test_score_counts_left_cells_negative() {
    let mut uni = Universe::from_literal("#..#", RuleTable::default()).unwrap();
    let mut node = uni.tape.iter_with_frontier(ANCHOR, Side::Left).nth(1).unwrap();
    uni.tape.write(&mut node, true);
    assert_eq!(uni.to_string(), "#.#..#");
    assert_eq!(uni.origin(), -2);
    assert_eq!(uni.score(), -2 + 0 + 3);
    assert_eq!(uni.boundary(), Some((-2, 3)));
    assert_eq!(uni.population(), 3);
  }

  #[test]
  fn test_all_false_rules() {
    let mut uni = Universe::from_literal("##.#..###.#", RuleTable::default()).unwrap();
    uni.step();
    assert_eq!(uni.to_string(), ".");
    assert_eq!(uni.real_cells(), 1);
    uni.simulate(5);
    assert_eq!(uni.to_string(), ".");
    assert_eq!(uni.boundary(), None);
    assert_eq!(uni.score(), 0);
  }

  #[test]
  fn test_vacuum_birth_rejected() {
    let rules = RuleTable::build(vec![([false; 5], true)]);
    assert!(matches!(Universe::from_literal("#", rules), Err(Error::VacuumBirth)));
    assert!(matches!(Universe::new(vec![], RuleTable::default()), Err(Error::EmptyTape)));
  }

  #[test]
  fn test_deterministic() {
    let mut a = sample();
    let mut b = sample();
    a.simulate(2);
    b.simulate(2);
    assert_eq!(a.to_string(), b.to_string());
  }

  #[test]
  fn test_padding_is_irrelevant() {
    let rules = literal::read_rules(SAMPLE_RULES).unwrap();
    let mut trimmed = Universe::from_literal("#..#.#", rules).unwrap();
    let mut padded = Universe::from_literal("#..#.#......", rules).unwrap();
    for _ in 0..10 {
      trimmed.step();
      padded.step();
      assert_eq!(trimmed.to_string(), padded.to_string());
    }
  }

  #[test]
  fn test_growth_fills_gaps() {
    // `#....` => #: a cell turns on two cells to the right of a live one
    let rules = RuleTable::build(vec![([true, false, false, false, false], true)]);
    let mut uni = Universe::from_literal("#", rules).unwrap();
    uni.step();
    assert_eq!(uni.to_string(), "..#");
    uni.step();
    assert_eq!(uni.to_string(), "....#");
  }

  #[test]
  fn test_forecast_sample() {
    let mut uni = sample();
    assert_eq!(uni.forecast(200).unwrap(), 3374);

    let mut uni = sample();
    assert_eq!(uni.forecast(50_000_000_000).unwrap(), 999_999_999_374);
    assert!(uni.generation() < 200);
  }

  #[test]
  fn test_forecast_glider() {
    // every cell copies its left neighbour
    let rules = RuleTable::build((0..32).map(|mask| (pattern_of(mask), mask & 0b01000 != 0)));
    let mut uni = Universe::from_literal("#", rules).unwrap();
    assert_eq!(uni.forecast(1_000_000_000).unwrap(), 1_000_000_000);
    assert_eq!(uni.generation(), 1);
    assert_eq!(uni.rules(), &rules);
  }

  #[test]
  fn test_forecast_overflow() {
    let rules = RuleTable::build((0..32).map(|mask| (pattern_of(mask), mask & 0b01000 != 0)));

    let mut uni = Universe::from_literal("#", rules).unwrap();
    assert_eq!(uni.forecast(i64::MAX as u64).unwrap(), i64::MAX);

    let mut uni = Universe::from_literal("#", rules).unwrap();
    assert!(matches!(uni.forecast(u64::MAX), Err(Error::ScoreOverflow(_))));

    let mut uni = Universe::from_literal("#", rules).unwrap();
    assert!(matches!(uni.forecast(1 << 63), Err(Error::ScoreOverflow(_))));

    let mut uni = Universe::from_literal("#", rules).unwrap();
    uni.step();
    assert!(matches!(uni.forecast(u64::MAX), Err(Error::ScoreOverflow(_))));
  }

  #[test]
  fn test_forecast_empty() {
    let mut uni = Universe::from_literal("#.#", RuleTable::default()).unwrap();
    assert_eq!(uni.forecast(1_000).unwrap(), 0);
  }

  proptest! {
    #[test]
    fn prop_matches_double_buffer(
      bits in any::<u32>(),
      initial in prop::collection::vec(any::<bool>(), 1..16),
      num_gen in 0..12usize,
    ) {
      let rules = rules_from_bits(bits & !1);
      let mut uni = Universe::new(initial.iter().copied(), rules).unwrap();
      let mut expected: BTreeSet<i64> = initial.iter()
        .enumerate()
        .filter(|&(_, &state)| state)
        .map(|(position, _)| position as i64)
        .collect();

      for _ in 0..num_gen {
        uni.step();
        expected = reference_step(&expected, &rules);

        prop_assert_eq!(live(&uni), expected.clone());
        prop_assert_eq!(uni.score(), expected.iter().sum::<i64>());

        // both ends are either true or the anchor
        let extent = uni.to_string();
        let leftmost = uni.origin();
        let rightmost = leftmost + extent.len() as i64 - 1;
        prop_assert!(leftmost == 0 || extent.starts_with('#'));
        prop_assert!(rightmost == 0 || extent.ends_with('#'));
      }
    }
  }
}
