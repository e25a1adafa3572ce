//! Win evaluation: which of the twelve lines a marked set completes.

use crate::board::{BOARD_CELLS, BOARD_SIDE};

/// Number of scoring lines: 5 rows, 5 columns, 2 diagonals.
pub const LINE_COUNT: usize = 2 * BOARD_SIDE + 2;

/// Bitmask per scoring line, bit `i` standing for board index `i`.
const LINE_MASKS: [u32; LINE_COUNT] = line_masks();

const fn line_masks() -> [u32; LINE_COUNT] {
    let mut masks = [0u32; LINE_COUNT];
    let mut i = 0;
    while i < BOARD_SIDE {
        let mut j = 0;
        while j < BOARD_SIDE {
            masks[i] |= 1 << (i * BOARD_SIDE + j);
            masks[BOARD_SIDE + i] |= 1 << (j * BOARD_SIDE + i);
            j += 1;
        }
        masks[2 * BOARD_SIDE] |= 1 << (i * (BOARD_SIDE + 1));
        masks[2 * BOARD_SIDE + 1] |= 1 << ((i + 1) * (BOARD_SIDE - 1));
        i += 1;
    }
    masks
}

/// The set of marked board indices (`0..25`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkedCells(u32);

impl MarkedCells {
    /// An empty set.
    pub fn new() -> Self {
        Self(0)
    }

    /// Marks `index`. Returns `false` if it was already marked or is off
    /// the board.
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= BOARD_CELLS {
            return false;
        }
        let bit = 1 << index;
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    pub fn contains(&self, index: usize) -> bool {
        index < BOARD_CELLS && self.0 & (1 << index) != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

impl FromIterator<usize> for MarkedCells {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut cells = Self::new();
        for index in iter {
            cells.insert(index);
        }
        cells
    }
}

/// Counts the completed lines in `marked`.
///
/// A line is complete when all five of its cells are marked. The result is
/// in `0..=12`; deciding what count wins is the caller's business.
pub fn count_lines(marked: &MarkedCells) -> usize {
    LINE_MASKS
        .iter()
        .filter(|&&mask| marked.0 & mask == mask)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(indices: &[usize]) -> MarkedCells {
        indices.iter().copied().collect()
    }

    #[test]
    fn test_count_lines_empty_is_zero() {
        assert_eq!(count_lines(&MarkedCells::new()), 0);
    }

    #[test]
    fn test_count_lines_full_board_is_twelve() {
        assert_eq!(count_lines(&(0..25).collect()), 12);
    }

    #[test]
    fn test_each_row_counts_once() {
        for r in 0..5 {
            let row: Vec<usize> = (0..5).map(|c| r * 5 + c).collect();
            assert_eq!(count_lines(&marked(&row)), 1, "row {r}");
        }
    }

    #[test]
    fn test_each_column_counts_once() {
        for c in 0..5 {
            let col: Vec<usize> = (0..5).map(|r| r * 5 + c).collect();
            assert_eq!(count_lines(&marked(&col)), 1, "col {c}");
        }
    }

    #[test]
    fn test_diagonals() {
        assert_eq!(count_lines(&marked(&[0, 6, 12, 18, 24])), 1);
        assert_eq!(count_lines(&marked(&[4, 8, 12, 16, 20])), 1);
        assert_eq!(
            count_lines(&marked(&[0, 6, 12, 18, 24, 4, 8, 16, 20])),
            2
        );
    }

    #[test]
    fn test_four_of_five_is_not_a_line() {
        assert_eq!(count_lines(&marked(&[0, 1, 2, 3])), 0);
        assert_eq!(count_lines(&marked(&[0, 6, 12, 18])), 0);
    }

    #[test]
    fn test_row_and_column_sharing_a_cell() {
        // Row 0 plus column 0 share index 0.
        assert_eq!(count_lines(&marked(&[0, 1, 2, 3, 4, 5, 10, 15, 20])), 2);
    }

    #[test]
    fn test_count_never_exceeds_line_count() {
        // Everything but the centre: every line through 12 is broken.
        let all_but_centre: MarkedCells = (0..25).filter(|&i| i != 12).collect();
        assert_eq!(count_lines(&all_but_centre), 8);
        assert!(count_lines(&all_but_centre) <= LINE_COUNT);
    }

    #[test]
    fn test_marked_cells_insert_contains_clear() {
        let mut cells = MarkedCells::new();
        assert!(cells.insert(3));
        assert!(!cells.insert(3), "second insert is not fresh");
        assert!(!cells.insert(25), "off-board index is ignored");
        assert!(cells.contains(3));
        assert!(!cells.contains(25));
        assert_eq!(cells, [3].into_iter().collect());
        cells.clear();
        assert_eq!(cells, MarkedCells::new());
    }
}
