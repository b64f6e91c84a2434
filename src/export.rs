use std::path::Path;
use image::{ImageBuffer, Luma};
use itertools::{Itertools, MinMaxResult};
use tracing::debug;
use crate::error::Result;
use crate::universe::Universe;

/// Simulates `num_gen` generations and saves a space-time diagram of them.
///
/// Row `y` is the `y`-th generation from the current one; every true cell is a
/// white pixel. The image format follows the extension of `path`.
pub fn save_image(
  uni: &mut Universe,
  num_gen: u64,
  path: impl AsRef<Path>,
) -> Result<()> {
  let mut rows = Vec::new();
  rows.push(live_positions(uni));
  for _ in 0..num_gen {
    uni.step();
    rows.push(live_positions(uni));
  }

  let buffer = write_buffer(&rows);
  buffer.save(path.as_ref())?;
  debug!(
    path = %path.as_ref().display(),
    width = buffer.width(),
    height = buffer.height(),
    "saved space-time diagram"
  );
  Ok(())
}

fn live_positions(uni: &Universe) -> Vec<i64> {
  uni.cells()
    .filter(|&(_, state)| state)
    .map(|(position, _)| position)
    .collect()
}

pub(crate) fn write_buffer(rows: &[Vec<i64>]) -> ImageBuffer<Luma<u8>, Vec<u8>> {
  let (left, right) = match rows.iter().flatten().minmax() {
    MinMaxResult::NoElements => (0, 0),
    MinMaxResult::OneElement(&x) => (x, x),
    MinMaxResult::MinMax(&left, &right) => (left, right),
  };

  let w = (right - left + 1) as u32;
  let h = rows.len().max(1) as u32;
  let mut buffer = ImageBuffer::new(w, h);
  for (y, row) in rows.iter().enumerate() {
    for &x in row {
      buffer.put_pixel((x - left) as u32, y as u32, Luma([255u8]));
    }
  }
  buffer
}
