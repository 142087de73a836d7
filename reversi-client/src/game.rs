//! 客户端游戏状态

use protocol::{ClientMessage, GameError, GameSnapshot, Position, SeatId, ServerMessage, Side};
use reversi_ai::{AiConfig, AiEngine};

/// 服务端消息对界面的影响
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// 提示文本
    Notice(String),
    /// 棋盘已更新，需要重绘
    BoardChanged,
    /// 走法被服务端拒绝
    Rejected(String),
    /// 服务端拒绝入座，客户端应退出
    Refused(String),
}

/// 客户端游戏状态
#[derive(Debug, Clone, Default)]
pub struct ClientGame {
    /// 服务端分配的颜色
    pub player_color: Option<Side>,
    pub client_id: Option<SeatId>,
    /// 最近一次收到的局面
    pub game_state: Option<GameSnapshot>,
}

impl ClientGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否轮到自己
    pub fn is_my_turn(&self) -> bool {
        match (&self.game_state, self.player_color) {
            (Some(state), Some(color)) => !state.game_over && state.current_player == color,
            _ => false,
        }
    }

    /// 应用一条服务端消息
    pub fn apply(&mut self, msg: ServerMessage) -> Vec<ClientEvent> {
        match msg {
            ServerMessage::Welcome {
                player_color,
                client_id,
                message,
            } => {
                self.player_color = Some(player_color);
                self.client_id = Some(client_id);
                vec![ClientEvent::Notice(message)]
            }
            ServerMessage::Waiting { message } => vec![ClientEvent::Notice(message)],
            ServerMessage::GameStart { game_state, message } => {
                self.game_state = Some(game_state);
                vec![ClientEvent::Notice(message), ClientEvent::BoardChanged]
            }
            ServerMessage::GameUpdate { game_state } => {
                self.game_state = Some(game_state);
                vec![ClientEvent::BoardChanged]
            }
            ServerMessage::MoveResponse { success: true, .. } => Vec::new(),
            ServerMessage::MoveResponse { success: false, message } => {
                vec![ClientEvent::Rejected(message)]
            }
            ServerMessage::OpponentDisconnected { message } => vec![ClientEvent::Notice(message)],
            ServerMessage::ServerFull { message } => vec![ClientEvent::Refused(message)],
        }
    }

    /// 本地预检落子，通过后返回要发送的消息
    pub fn prepare_move(&self, pos: Position) -> Result<ClientMessage, GameError> {
        let state = match &self.game_state {
            Some(state) if !state.game_over => state,
            _ => return Err(GameError::GameNotInProgress),
        };
        if !self.is_my_turn() {
            return Err(GameError::NotYourTurn);
        }
        if !state.is_valid_move(pos) {
            return Err(GameError::IllegalMove {
                row: pos.row,
                col: pos.col,
            });
        }
        Ok(ClientMessage::from_position(pos))
    }

    /// 用 AI 搜索给出建议落点（仅在轮到自己时）
    pub fn hint(&self, config: AiConfig) -> Option<Position> {
        let state = self.game_state.as_ref()?;
        let color = self.player_color?;
        if !self.is_my_turn() {
            return None;
        }
        AiEngine::new(config)
            .search(&state.board, color)
            .filter(|pos| state.is_valid_move(*pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    fn seated(color: Side) -> ClientGame {
        let mut game = ClientGame::new();
        game.apply(ServerMessage::Welcome {
            player_color: color,
            client_id: color.code() as SeatId - 1,
            message: "welcome".into(),
        });
        game
    }

    #[test]
    fn test_welcome_then_start() {
        let mut game = seated(Side::Black);
        assert_eq!(game.player_color, Some(Side::Black));
        assert_eq!(game.client_id, Some(0));
        assert!(!game.is_my_turn());

        let events = game.apply(ServerMessage::GameStart {
            game_state: GameSnapshot::initial(),
            message: "The game has started!".into(),
        });
        assert_eq!(
            events,
            vec![
                ClientEvent::Notice("The game has started!".into()),
                ClientEvent::BoardChanged
            ]
        );
        assert!(game.is_my_turn());
    }

    #[test]
    fn test_prepare_move_checks_locally() {
        let mut black = seated(Side::Black);
        assert_eq!(black.prepare_move(pos(2, 3)), Err(GameError::GameNotInProgress));

        black.apply(ServerMessage::GameStart {
            game_state: GameSnapshot::initial(),
            message: String::new(),
        });
        assert_eq!(
            black.prepare_move(pos(2, 3)),
            Ok(ClientMessage::Move { row: 2, col: 3 })
        );
        assert_eq!(
            black.prepare_move(pos(0, 0)),
            Err(GameError::IllegalMove { row: 0, col: 0 })
        );

        let mut white = seated(Side::White);
        white.apply(ServerMessage::GameUpdate {
            game_state: GameSnapshot::initial(),
        });
        assert_eq!(white.prepare_move(pos(2, 4)), Err(GameError::NotYourTurn));
    }

    #[test]
    fn test_hint_only_on_own_turn() {
        let config = AiConfig {
            max_depth: 2,
            move_interval_ms: 0,
        };
        let mut black = seated(Side::Black);
        assert_eq!(black.hint(config.clone()), None);

        black.apply(ServerMessage::GameStart {
            game_state: GameSnapshot::initial(),
            message: String::new(),
        });
        let hint = black.hint(config.clone()).unwrap();
        assert!(GameSnapshot::initial().is_valid_move(hint));

        let mut white = seated(Side::White);
        white.apply(ServerMessage::GameUpdate {
            game_state: GameSnapshot::initial(),
        });
        assert_eq!(white.hint(config), None);
    }

    #[test]
    fn test_responses_and_refusal() {
        let mut game = seated(Side::White);
        assert!(game
            .apply(ServerMessage::MoveResponse {
                success: true,
                message: "Move accepted".into()
            })
            .is_empty());
        assert_eq!(
            game.apply(ServerMessage::MoveResponse {
                success: false,
                message: "Not your turn".into()
            }),
            vec![ClientEvent::Rejected("Not your turn".into())]
        );
        assert_eq!(
            game.apply(ServerMessage::ServerFull {
                message: "full".into()
            }),
            vec![ClientEvent::Refused("full".into())]
        );
    }
}
