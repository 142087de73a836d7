//! 对局控制
//!
//! 一局棋的权威状态：棋盘、当前走子方、终局标志与胜者。
//! 所有修改都经由 [`GameSession::attempt_move`] 等方法，调用方负责持锁。

use protocol::{Board, GameError, GameSnapshot, MoveGenerator, NextTurn, Outcome, Position, Side};

/// 对局阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// 等待两名玩家入座
    WaitingForPlayers,
    /// 对局进行中
    InProgress,
    /// 双方均无棋可下，已分胜负
    Finished,
    /// 对局中有玩家断线，棋局冻结，等待新的两人开局
    Abandoned,
}

/// 一次成功落子的摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveApplied {
    pub position: Position,
    pub side: Side,
    pub flipped: usize,
    pub next: NextTurn,
}

/// 对局会话
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current_mover: Side,
    game_over: bool,
    winner: Option<Outcome>,
    phase: SessionPhase,
    moves_played: u32,
    /// 每次状态变化递增，用于判断是否需要重新广播
    revision: u64,
}

impl GameSession {
    /// 创建会话（等待玩家）
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            current_mover: Side::Black,
            game_over: false,
            winner: None,
            phase: SessionPhase::WaitingForPlayers,
            moves_played: 0,
            revision: 0,
        }
    }

    /// 从指定局面开始对局（不做回合结算）
    pub fn with_position(board: Board, current_mover: Side) -> Self {
        Self {
            board,
            current_mover,
            phase: SessionPhase::InProgress,
            ..Self::new()
        }
    }

    /// 开始新对局：重置棋盘，黑方先走
    pub fn start(&mut self) {
        self.board = Board::initial();
        self.current_mover = Side::Black;
        self.game_over = false;
        self.winner = None;
        self.phase = SessionPhase::InProgress;
        self.moves_played = 0;
        self.revision += 1;
    }

    /// 对局中断线：冻结棋局。返回是否发生了状态变化
    pub fn abandon(&mut self) -> bool {
        if self.phase == SessionPhase::InProgress {
            self.phase = SessionPhase::Abandoned;
            self.revision += 1;
            true
        } else {
            false
        }
    }

    /// 尝试落子
    ///
    /// 若当前走子方已无棋可下，先结算回合（让步或终局）
    /// 并拒绝本次请求。
    pub fn attempt_move(
        &mut self,
        pos: Position,
        requester: Side,
    ) -> Result<MoveApplied, GameError> {
        if self.phase != SessionPhase::InProgress {
            return Err(GameError::GameNotInProgress);
        }

        match MoveGenerator::settle_turn(&self.board, self.current_mover) {
            NextTurn::Play(_) => {}
            NextTurn::Pass { skipped, next } => {
                self.current_mover = next;
                self.revision += 1;
                return Err(GameError::TurnPassed { skipped, next });
            }
            NextTurn::GameOver(outcome) => {
                self.finish(outcome);
                return Err(GameError::GameNotInProgress);
            }
        }

        if requester != self.current_mover {
            return Err(GameError::NotYourTurn);
        }

        let flipped = MoveGenerator::apply_in_place(&mut self.board, pos, requester)?;
        self.moves_played += 1;

        let next = MoveGenerator::next_turn(&self.board, requester);
        match next {
            NextTurn::Play(side) => self.current_mover = side,
            NextTurn::Pass { next, .. } => self.current_mover = next,
            NextTurn::GameOver(outcome) => self.finish(outcome),
        }
        self.revision += 1;

        Ok(MoveApplied {
            position: pos,
            side: requester,
            flipped,
            next,
        })
    }

    fn finish(&mut self, outcome: Outcome) {
        if !self.game_over {
            self.game_over = true;
            self.winner = Some(outcome);
            self.phase = SessionPhase::Finished;
            self.revision += 1;
        }
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(self.board, self.current_mover, self.game_over, self.winner)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_mover(&self) -> Side {
        self.current_mover
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Cell;

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    fn started() -> GameSession {
        let mut session = GameSession::new();
        session.start();
        session
    }

    #[test]
    fn test_waiting_rejects_moves() {
        let mut session = GameSession::new();
        assert_eq!(session.phase(), SessionPhase::WaitingForPlayers);
        assert_eq!(
            session.attempt_move(pos(2, 3), Side::Black),
            Err(GameError::GameNotInProgress)
        );
    }

    #[test]
    fn test_opening_move() {
        let mut session = started();
        let applied = session.attempt_move(pos(2, 3), Side::Black).unwrap();

        assert_eq!(applied.flipped, 1);
        assert_eq!(applied.next, NextTurn::Play(Side::White));
        assert_eq!(session.board().get(pos(3, 3)), Cell::Black);
        assert_eq!(session.board().count(Side::Black), 4);
        assert_eq!(session.board().count(Side::White), 1);
        assert_eq!(session.current_mover(), Side::White);
        assert_eq!(session.moves_played(), 1);
        assert!(!session.is_game_over());
    }

    #[test]
    fn test_not_your_turn() {
        let mut session = started();
        let before = session.snapshot();
        assert_eq!(
            session.attempt_move(pos(2, 4), Side::White),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_illegal_move_leaves_state() {
        let mut session = started();
        let revision = session.revision();
        assert_eq!(
            session.attempt_move(pos(3, 3), Side::Black),
            Err(GameError::IllegalMove { row: 3, col: 3 })
        );
        assert_eq!(
            session.attempt_move(pos(0, 0), Side::Black),
            Err(GameError::IllegalMove { row: 0, col: 0 })
        );
        assert_eq!(session.revision(), revision);
        assert_eq!(session.current_mover(), Side::Black);
        assert_eq!(*session.board(), Board::initial());
    }

    #[test]
    fn test_pending_pass_is_settled_before_any_move() {
        // 黑方无棋可下，白方可在 (0,2) 落子
        let mut board = Board::empty();
        board.set(pos(0, 0), Cell::White);
        board.set(pos(0, 1), Cell::Black);

        for requester in Side::ALL {
            let mut session = GameSession::with_position(board, Side::Black);
            let result = session.attempt_move(pos(0, 2), requester);
            assert_eq!(
                result,
                Err(GameError::TurnPassed {
                    skipped: Side::Black,
                    next: Side::White
                })
            );
            assert_eq!(session.current_mover(), Side::White);
            assert_eq!(*session.board(), board);
            assert!(!session.is_game_over());
        }
    }

    #[test]
    fn test_move_ending_game_sets_winner_once() {
        let mut board = Board::empty();
        board.set(pos(0, 0), Cell::White);
        board.set(pos(0, 1), Cell::Black);

        let mut session = GameSession::with_position(board, Side::White);
        let applied = session.attempt_move(pos(0, 2), Side::White).unwrap();

        assert_eq!(applied.next, NextTurn::GameOver(Outcome::Winner(Side::White)));
        assert!(session.is_game_over());
        assert_eq!(session.winner(), Some(Outcome::Winner(Side::White)));
        assert_eq!(session.phase(), SessionPhase::Finished);

        let snapshot = session.snapshot();
        assert!(snapshot.game_over);
        assert!(snapshot.valid_moves.is_empty());
        assert_eq!(snapshot.scores.white, 3);

        assert_eq!(
            session.attempt_move(pos(1, 1), Side::Black),
            Err(GameError::GameNotInProgress)
        );
    }

    #[test]
    fn test_move_followed_by_pass_keeps_mover() {
        // 白方落子 (0,3) 后黑方无子可下，但白方仍能下 (2,0)
        let mut board = Board::empty();
        board.set(pos(0, 0), Cell::White);
        board.set(pos(0, 1), Cell::Black);
        board.set(pos(0, 2), Cell::Black);
        board.set(pos(1, 0), Cell::Black);

        let mut session = GameSession::with_position(board, Side::White);
        let applied = session.attempt_move(pos(0, 3), Side::White).unwrap();

        assert_eq!(
            applied.next,
            NextTurn::Pass {
                skipped: Side::Black,
                next: Side::White
            }
        );
        assert_eq!(session.current_mover(), Side::White);
        assert!(!session.is_game_over());
        assert_eq!(session.snapshot().valid_moves, vec![pos(2, 0)]);
    }

    #[test]
    fn test_abandon_freezes_and_start_resets() {
        let mut session = started();
        session.attempt_move(pos(2, 3), Side::Black).unwrap();

        assert!(session.abandon());
        assert!(!session.abandon());
        assert_eq!(session.phase(), SessionPhase::Abandoned);
        assert!(!session.is_game_over());
        assert_eq!(
            session.attempt_move(pos(2, 2), Side::White),
            Err(GameError::GameNotInProgress)
        );

        session.start();
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(*session.board(), Board::initial());
        assert_eq!(session.current_mover(), Side::Black);
        assert_eq!(session.moves_played(), 0);
        assert_eq!(session.winner(), None);
    }
}
