use std::iter;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct CellId(pub(crate) usize);

/// The cell at position 0. It is created with the tape and never released.
pub(crate) const ANCHOR: CellId = CellId(0);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Side {
  Left,
  Right,
}

impl Side {
  pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

  pub fn opposite(self) -> Self {
    match self {
      Side::Left => Side::Right,
      Side::Right => Side::Left,
    }
  }

  /// Position delta of one hop towards this side.
  pub fn unit(self) -> i64 {
    match self {
      Side::Left => -1,
      Side::Right => 1,
    }
  }

  fn index(self) -> usize {
    match self {
      Side::Left => 0,
      Side::Right => 1,
    }
  }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Cell {
  pub(crate) state: bool,
  /// Indexed by `Side::index`.
  links: [Option<CellId>; 2],
}

/// Placeholder for a cell that has never been materialized.
///
/// `distance` hops beyond `attachment` towards `side`. The attachment was the
/// outermost real cell when the placeholder was reached; more cells may have
/// been linked beyond it since, which is why frontiers are resolved before use.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Frontier {
  pub(crate) side: Side,
  pub(crate) attachment: CellId,
  /// `>= 1`
  pub(crate) distance: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Node {
  Real(CellId),
  Frontier(Frontier),
}

impl Node {
  pub(crate) fn is_frontier(&self) -> bool {
    matches!(self, Node::Frontier(_))
  }
}

/// Arena of doubly linked cells. Links are ids into `cells`; released slots
/// are recycled through `free`.
#[derive(Clone, Debug)]
pub(crate) struct Tape {
  cells: Vec<Cell>,
  free: Vec<CellId>,
}

impl Tape {
  pub(crate) fn new(anchor: bool) -> Self {
    Self {
      cells: vec![Cell { state: anchor, links: [None; 2] }],
      free: vec![],
    }
  }

  pub(crate) fn cell(&self, CellId(n): CellId) -> &Cell {
    &self.cells[n]
  }

  fn cell_mut(&mut self, CellId(n): CellId) -> &mut Cell {
    &mut self.cells[n]
  }

  pub(crate) fn neighbor(&self, id: CellId, side: Side) -> Option<CellId> {
    self.cell(id).links[side.index()]
  }

  /// Number of real cells, anchor included.
  pub(crate) fn len(&self) -> usize {
    self.cells.len() - self.free.len()
  }

  /// Creates an unlinked cell.
  pub(crate) fn alloc(&mut self, state: bool) -> CellId {
    let cell = Cell { state, links: [None; 2] };
    match self.free.pop() {
      Some(id) => {
        *self.cell_mut(id) = cell;
        id
      }
      None => {
        let id = CellId(self.cells.len());
        self.cells.push(cell);
        id
      }
    }
  }

  pub(crate) fn link(&mut self, parent: CellId, side: Side, child: CellId) {
    assert!(
      self.neighbor(parent, side).is_none(),
      "precondition violated: {:?} already has a {:?} neighbor", parent, side
    );
    assert!(
      self.neighbor(child, side.opposite()).is_none(),
      "precondition violated: {:?} already has a {:?} neighbor", child, side.opposite()
    );
    self.cell_mut(parent).links[side.index()] = Some(child);
    self.cell_mut(child).links[side.opposite().index()] = Some(parent);
  }

  pub(crate) fn unlink(&mut self, parent: CellId, side: Side) -> CellId {
    let child = match self.neighbor(parent, side) {
      Some(child) => child,
      None => panic!("precondition violated: {:?} has no {:?} neighbor", parent, side),
    };
    self.cell_mut(parent).links[side.index()] = None;
    self.cell_mut(child).links[side.opposite().index()] = None;
    child
  }

  /// Real cells walking outwards from `start`, `start` excluded.
  pub(crate) fn iter(&self, start: CellId, side: Side) -> Cells<'_> {
    Cells {
      tape: self,
      next: self.neighbor(start, side),
      side,
    }
  }

  /// Like `iter`, but continues with frontier placeholders forever.
  pub(crate) fn iter_with_frontier(
    &self,
    start: CellId,
    side: Side,
  ) -> impl Iterator<Item = Node> + '_ {
    let mut node = Node::Real(start);
    iter::repeat_with(move || {
      node = self.advance(node, side);
      node
    })
  }

  pub(crate) fn outermost(&self, side: Side) -> CellId {
    self.iter(ANCHOR, side).last().unwrap_or(ANCHOR)
  }

  /// Re-attaches a frontier to the cells linked beyond its attachment since
  /// it was created. Becomes `Real` if the position has been materialized.
  pub(crate) fn resolve(&self, node: Node) -> Node {
    match node {
      Node::Real(_) => node,
      Node::Frontier(Frontier { side, mut attachment, mut distance }) => {
        while let Some(next) = self.neighbor(attachment, side) {
          attachment = next;
          distance -= 1;
          if distance == 0 {
            return Node::Real(attachment);
          }
        }
        Node::Frontier(Frontier { side, attachment, distance })
      }
    }
  }

  /// The node one hop beyond `node` towards `side`.
  pub(crate) fn advance(&self, node: Node, side: Side) -> Node {
    match self.resolve(node) {
      Node::Real(id) => match self.neighbor(id, side) {
        Some(next) => Node::Real(next),
        None => Node::Frontier(Frontier { side, attachment: id, distance: 1 }),
      },
      Node::Frontier(frontier) => {
        debug_assert_eq!(frontier.side, side);
        Node::Frontier(Frontier { distance: frontier.distance + 1, ..frontier })
      }
    }
  }

  pub(crate) fn read(&self, node: Node) -> bool {
    match self.resolve(node) {
      Node::Real(id) => self.cell(id).state,
      Node::Frontier(_) => false,
    }
  }

  /// Writing `false` to a frontier does nothing. Writing `true` materializes
  /// it, together with any skipped placeholders between it and the tape end
  /// (as false cells), and turns `node` into `Node::Real`.
  pub(crate) fn write(&mut self, node: &mut Node, value: bool) {
    match self.resolve(*node) {
      Node::Real(id) => {
        self.cell_mut(id).state = value;
        *node = Node::Real(id);
      }
      Node::Frontier(frontier) if !value => {
        *node = Node::Frontier(frontier);
      }
      Node::Frontier(Frontier { side, attachment, distance }) => {
        let mut outer = attachment;
        for _ in 1..distance {
          let filler = self.alloc(false);
          self.link(outer, side, filler);
          outer = filler;
        }
        let id = self.alloc(true);
        self.link(outer, side, id);
        *node = Node::Real(id);
      }
    }
  }

  /// Releases false cells from the `side` end until a true cell or the
  /// anchor is reached. Returns the number of released cells.
  pub(crate) fn trim(&mut self, side: Side) -> usize {
    let mut released = 0;
    let mut outer = self.outermost(side);
    while outer != ANCHOR && !self.cell(outer).state {
      let inner = match self.neighbor(outer, side.opposite()) {
        Some(inner) => inner,
        None => break,
      };
      self.unlink(inner, side);
      self.free.push(outer);
      outer = inner;
      released += 1;
    }
    released
  }
}

pub(crate) struct Cells<'a> {
  tape: &'a Tape,
  next: Option<CellId>,
  side: Side,
}

impl<'a> Iterator for Cells<'a> {
  type Item = CellId;

  fn next(&mut self) -> Option<CellId> {
    let id = self.next?;
    self.next = self.tape.neighbor(id, self.side);
    Some(id)
  }
}
