//! Bingo boards and where they come from.

use rand::Rng;
use rand::seq::SliceRandom;

/// Cells per row and per column.
pub const BOARD_SIDE: usize = 5;

/// Cells per board. Also the highest number on a board.
pub const BOARD_CELLS: usize = BOARD_SIDE * BOARD_SIDE;

/// A 5×5 permutation of `1..=25`, stored row-major
/// (`index = row * 5 + col`).
///
/// Immutable once built. The only constructors are the shuffling ones and
/// [`Board::from_cells`], which checks the permutation property, so every
/// `Board` in the program holds each number exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board([u8; BOARD_CELLS]);

impl Board {
    /// Shuffles a fresh board using the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    /// Shuffles a fresh board using the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cells: [u8; BOARD_CELLS] = std::array::from_fn(|i| (i + 1) as u8);
        cells.shuffle(rng);
        Self(cells)
    }

    /// Builds a board from explicit cells.
    ///
    /// Returns `None` unless `cells` holds every number in `1..=25`
    /// exactly once.
    pub fn from_cells(cells: [u8; BOARD_CELLS]) -> Option<Self> {
        let mut seen = 0u32;
        for &value in &cells {
            if value == 0 || usize::from(value) > BOARD_CELLS {
                return None;
            }
            let bit = 1u32 << (value - 1);
            if seen & bit != 0 {
                return None;
            }
            seen |= bit;
        }
        Some(Self(cells))
    }

    /// Index of `number` on this board, if it is on it at all.
    pub fn position_of(&self, number: u8) -> Option<usize> {
        self.0.iter().position(|&value| value == number)
    }

    /// The cells as a wire-friendly vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

/// Hands out boards to a session.
///
/// Production sessions draw from [`RandomBoards`]; tests plug in a scripted
/// source to stage specific wins.
pub trait BoardSource: Send + 'static {
    /// Returns the next board to deal.
    fn next_board(&mut self) -> Board;
}

/// Uniformly shuffled boards from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomBoards;

impl BoardSource for RandomBoards {
    fn next_board(&mut self) -> Board {
        Board::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_permutation(board: &Board) {
        let mut sorted = board.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=25).collect::<Vec<u8>>());
    }

    #[test]
    fn test_generate_is_a_permutation_of_1_to_25() {
        for _ in 0..200 {
            assert_permutation(&Board::generate());
        }
    }

    #[test]
    fn test_generate_with_seed_is_reproducible() {
        let a = Board::generate_with(&mut StdRng::seed_from_u64(7));
        let b = Board::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_permutation(&a);
    }

    #[test]
    fn test_consecutive_boards_are_independent() {
        // Two draws from one RNG must not share storage or order.
        let mut rng = StdRng::seed_from_u64(11);
        let first = Board::generate_with(&mut rng);
        let second = Board::generate_with(&mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn test_from_cells_accepts_identity() {
        let board = Board::from_cells(std::array::from_fn(|i| (i + 1) as u8))
            .expect("identity is a permutation");
        assert_eq!(board.position_of(1), Some(0));
        assert_eq!(board.position_of(25), Some(24));
    }

    #[test]
    fn test_from_cells_rejects_duplicates_and_out_of_range() {
        let mut dup: [u8; 25] = std::array::from_fn(|i| (i + 1) as u8);
        dup[3] = 1;
        assert!(Board::from_cells(dup).is_none());

        let mut zero: [u8; 25] = std::array::from_fn(|i| (i + 1) as u8);
        zero[0] = 0;
        assert!(Board::from_cells(zero).is_none());

        let mut big: [u8; 25] = std::array::from_fn(|i| (i + 1) as u8);
        big[24] = 26;
        assert!(Board::from_cells(big).is_none());
    }

    #[test]
    fn test_position_of_missing_number() {
        assert_eq!(Board::generate().position_of(0), None);
        assert_eq!(Board::generate().position_of(26), None);
    }

    #[test]
    fn test_random_boards_source_deals_valid_boards() {
        let mut source = RandomBoards;
        assert_permutation(&source.next_board());
    }
}
