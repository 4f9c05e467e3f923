use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use dealboard_common::{Deal, Stage};

use crate::errors::BoardError;

/// All deals partitioned into six ordered columns, one per stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    columns: [Vec<Deal>; Stage::COUNT],
}

/// Per-column figures shown in the column header.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub stage: Stage,
    pub count: usize,
    pub total_value: f64,
}

impl Board {
    /// Partition deals by stage, ordering each column by the backend's
    /// `board_position`. Ties keep arrival order. Positions are then
    /// renumbered to column indices. A repeated id keeps its first
    /// occurrence only.
    pub fn from_deals(deals: impl IntoIterator<Item = Deal>) -> Self {
        let mut board = Board::default();
        let mut seen = HashSet::new();
        for deal in deals {
            if !seen.insert(deal.id) {
                tracing::warn!(deal_id = deal.id, "Dropping duplicate deal from board payload");
                continue;
            }
            board.columns[deal.stage.index()].push(deal);
        }
        for column in board.columns.iter_mut() {
            column.sort_by_key(|d| d.board_position);
            renumber(column);
        }
        board
    }

    pub fn column(&self, stage: Stage) -> &[Deal] {
        &self.columns[stage.index()]
    }

    pub fn columns(&self) -> impl Iterator<Item = (Stage, &[Deal])> {
        Stage::ALL
            .into_iter()
            .map(move |stage| (stage, self.column(stage)))
    }

    /// Column and index currently holding `deal_id`.
    pub fn locate(&self, deal_id: i64) -> Option<(Stage, usize)> {
        self.columns().find_map(|(stage, deals)| {
            deals
                .iter()
                .position(|d| d.id == deal_id)
                .map(|index| (stage, index))
        })
    }

    pub fn deal(&self, deal_id: i64) -> Option<&Deal> {
        self.columns.iter().flatten().find(|d| d.id == deal_id)
    }

    pub fn total_deals(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn total_value(&self) -> f64 {
        Stage::ALL.iter().map(|s| self.summary(*s).total_value).sum()
    }

    pub fn summary(&self, stage: Stage) -> ColumnSummary {
        let deals = self.column(stage);
        ColumnSummary {
            stage,
            count: deals.len(),
            total_value: deals.iter().filter_map(|d| d.estimated_value).sum(),
        }
    }

    /// Every deal sits in the column of its stage, at the index matching its
    /// `board_position`, and appears exactly once on the board.
    pub fn check_invariants(&self) -> Result<(), BoardError> {
        let mut seen = HashSet::new();
        for (stage, deals) in self.columns() {
            for (index, deal) in deals.iter().enumerate() {
                if deal.stage != stage {
                    return Err(BoardError::Invariant(format!(
                        "deal {} has stage {} but sits in column {}",
                        deal.id, deal.stage, stage
                    )));
                }
                if deal.board_position != index as i32 {
                    return Err(BoardError::Invariant(format!(
                        "deal {} at index {} of {} has board_position {}",
                        deal.id, index, stage, deal.board_position
                    )));
                }
                if !seen.insert(deal.id) {
                    return Err(BoardError::Invariant(format!(
                        "deal {} appears more than once",
                        deal.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn renumber(column: &mut [Deal]) {
    for (index, deal) in column.iter_mut().enumerate() {
        deal.board_position = index as i32;
    }
}

/// The client's belief about server state. Mutated only through
/// [`BoardStore::move_deal`] and [`BoardStore::replace_all`].
#[derive(Debug, Default)]
pub struct BoardStore {
    board: Board,
    revision: u64,
    needs_refresh: bool,
}

impl BoardStore {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            revision: 0,
            needs_refresh: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set when a post-failure refetch could not complete; the board may
    /// still hold an unconfirmed optimistic move.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Move a deal out of `from` and into `to` at `to_index`, clamped to the
    /// destination's length after removal. Returns the board as it was
    /// before the move. Fails without touching anything if the deal is not
    /// in `from`.
    pub fn move_deal(
        &mut self,
        deal_id: i64,
        from: Stage,
        to: Stage,
        to_index: usize,
    ) -> Result<Board, BoardError> {
        let current = self.board.columns[from.index()]
            .iter()
            .position(|d| d.id == deal_id)
            .ok_or(BoardError::DealNotInColumn {
                deal_id,
                stage: from,
            })?;

        let previous = self.board.clone();

        let mut deal = self.board.columns[from.index()].remove(current);
        deal.stage = to;
        let target = &mut self.board.columns[to.index()];
        let index = to_index.min(target.len());
        target.insert(index, deal);

        renumber(&mut self.board.columns[from.index()]);
        if from != to {
            renumber(&mut self.board.columns[to.index()]);
        }
        self.revision += 1;
        Ok(previous)
    }

    /// Overwrite the whole board.
    pub fn replace_all(&mut self, board: Board) {
        self.board = board;
        self.needs_refresh = false;
        self.revision += 1;
    }

    pub(crate) fn mark_needs_refresh(&mut self) {
        self.needs_refresh = true;
    }
}

/// Cloneable shared access to one `BoardStore`.
///
/// Every operation takes the lock for a single synchronous step, so a
/// mutation is atomic with respect to other tasks and the lock is never
/// held across an `.await`.
#[derive(Clone, Default)]
pub struct BoardHandle {
    inner: Arc<Mutex<BoardStore>>,
}

impl BoardHandle {
    pub fn new(store: BoardStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn from_deals(deals: impl IntoIterator<Item = Deal>) -> Self {
        Self::new(BoardStore::new(Board::from_deals(deals)))
    }

    pub fn read<F, R>(&self, f: F) -> Result<R, BoardError>
    where
        F: FnOnce(&BoardStore) -> R,
    {
        Ok(f(&*self.lock()?))
    }

    pub fn snapshot(&self) -> Result<Board, BoardError> {
        self.read(|store| store.board().clone())
    }

    pub fn move_deal(
        &self,
        deal_id: i64,
        from: Stage,
        to: Stage,
        to_index: usize,
    ) -> Result<Board, BoardError> {
        self.lock()?.move_deal(deal_id, from, to, to_index)
    }

    pub fn replace_all(&self, board: Board) -> Result<(), BoardError> {
        self.lock()?.replace_all(board);
        Ok(())
    }

    pub(crate) fn mark_needs_refresh(&self) -> Result<(), BoardError> {
        self.lock()?.mark_needs_refresh();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BoardStore>, BoardError> {
        self.inner.lock().map_err(|_| BoardError::LockPoisoned)
    }
}
