//! 座位管理
//!
//! 最多两个座位。新连接按线性扫描占用第一个已失效的槽位，否则追加；
//! 颜色取第一个未被在线座位占用的颜色（先黑后白）。
//! 座位失效后不会复活，新连接总是得到一个新的座位记录。

use tokio::sync::mpsc;
use tracing::debug;

use protocol::{SeatId, ServerMessage, Side, MAX_SEATS};

use crate::error::ServerError;

/// 连接 ID（进程内单调递增，区分同一槽位上的先后连接）
pub type ConnectionId = u64;

/// 入座结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAssignment {
    pub seat_id: SeatId,
    pub color: Side,
    pub conn_id: ConnectionId,
}

/// 座位
#[derive(Debug)]
pub struct Seat {
    pub id: SeatId,
    pub color: Side,
    pub conn_id: ConnectionId,
    pub peer_addr: Option<String>,
    /// 发送队列；座位失效时丢弃，写任务随之结束
    sender: Option<mpsc::Sender<ServerMessage>>,
}

impl Seat {
    pub fn is_alive(&self) -> bool {
        self.sender.is_some()
    }

    /// 投递到发送队列（不阻塞）。队列已满或已关闭时返回 false
    fn deliver(&self, msg: ServerMessage) -> bool {
        match &self.sender {
            Some(sender) => sender.try_send(msg).is_ok(),
            None => false,
        }
    }
}

/// 座位表
#[derive(Debug, Default)]
pub struct SeatRegistry {
    seats: Vec<Seat>,
    next_conn_id: ConnectionId,
}

impl SeatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为新连接分配座位与颜色
    pub fn register(
        &mut self,
        sender: mpsc::Sender<ServerMessage>,
        peer_addr: Option<String>,
    ) -> Result<SeatAssignment, ServerError> {
        if self.active_seat_count() >= MAX_SEATS {
            return Err(ServerError::Capacity { max: MAX_SEATS });
        }

        let color = Side::ALL
            .into_iter()
            .find(|side| !self.live_seats().any(|seat| seat.color == *side))
            .ok_or(ServerError::Capacity { max: MAX_SEATS })?;

        let conn_id = self.next_conn_id;
        self.next_conn_id += 1;

        let seat_id = self
            .seats
            .iter()
            .position(|seat| !seat.is_alive())
            .unwrap_or(self.seats.len());
        let seat = Seat {
            id: seat_id,
            color,
            conn_id,
            peer_addr,
            sender: Some(sender),
        };
        if seat_id == self.seats.len() {
            self.seats.push(seat);
        } else {
            self.seats[seat_id] = seat;
        }
        debug!(seat_id, conn_id, %color, "seat registered");

        Ok(SeatAssignment {
            seat_id,
            color,
            conn_id,
        })
    }

    /// 在线座位数
    pub fn active_seat_count(&self) -> usize {
        self.live_seats().count()
    }

    /// 恰好两个座位在线
    pub fn is_ready_to_start(&self) -> bool {
        self.active_seat_count() == MAX_SEATS
    }

    /// 标记座位失效。仅当该座位仍在线且属于 `conn_id` 时生效，返回其颜色
    pub fn mark_dead(&mut self, seat_id: SeatId, conn_id: ConnectionId) -> Option<Side> {
        let seat = self.seats.get_mut(seat_id)?;
        if seat.conn_id != conn_id || !seat.is_alive() {
            return None;
        }
        seat.sender = None;
        debug!(seat_id, conn_id, color = %seat.color, "seat marked dead");
        Some(seat.color)
    }

    /// 座位是否仍由该连接占用且在线
    pub fn is_live(&self, seat_id: SeatId, conn_id: ConnectionId) -> bool {
        self.seats
            .get(seat_id)
            .map(|seat| seat.conn_id == conn_id && seat.is_alive())
            .unwrap_or(false)
    }

    /// 所有在线座位
    pub fn live_seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|seat| seat.is_alive())
    }

    /// 获取座位
    pub fn get(&self, seat_id: SeatId) -> Option<&Seat> {
        self.seats.get(seat_id)
    }

    /// 投递消息给指定座位，失败时返回该座位的连接 ID
    pub fn deliver(&self, seat_id: SeatId, msg: ServerMessage) -> Result<(), ConnectionId> {
        match self.seats.get(seat_id) {
            Some(seat) if seat.is_alive() => {
                if seat.deliver(msg) {
                    Ok(())
                } else {
                    Err(seat.conn_id)
                }
            }
            // 已失效的座位静默丢弃
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (mpsc::Sender<ServerMessage>, mpsc::Receiver<ServerMessage>) {
        mpsc::channel(8)
    }

    #[test]
    fn test_first_two_seats_get_black_then_white() {
        let mut registry = SeatRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();

        let first = registry.register(tx1, None).unwrap();
        assert_eq!((first.seat_id, first.color), (0, Side::Black));
        assert!(!registry.is_ready_to_start());

        let second = registry.register(tx2, Some("127.0.0.1:4000".into())).unwrap();
        assert_eq!((second.seat_id, second.color), (1, Side::White));
        assert_ne!(first.conn_id, second.conn_id);
        assert!(registry.is_ready_to_start());
        assert_eq!(registry.active_seat_count(), 2);
        assert_eq!(registry.get(first.seat_id).unwrap().peer_addr, None);
        assert_eq!(
            registry.get(second.seat_id).unwrap().peer_addr.as_deref(),
            Some("127.0.0.1:4000")
        );
    }

    #[test]
    fn test_third_connection_rejected() {
        let mut registry = SeatRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        let (tx3, _rx3) = channel();
        registry.register(tx1, None).unwrap();
        registry.register(tx2, None).unwrap();

        let result = registry.register(tx3, None);
        assert!(matches!(result, Err(ServerError::Capacity { max: 2 })));
        assert_eq!(registry.active_seat_count(), 2);
    }

    #[test]
    fn test_dead_slot_reused_without_color_collision() {
        let mut registry = SeatRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        let (tx3, _rx3) = channel();
        let black = registry.register(tx1, None).unwrap();
        let white = registry.register(tx2, None).unwrap();

        assert_eq!(registry.mark_dead(black.seat_id, black.conn_id), Some(Side::Black));
        assert_eq!(registry.active_seat_count(), 1);

        let newcomer = registry.register(tx3, None).unwrap();
        assert_eq!(newcomer.seat_id, 0);
        assert_eq!(newcomer.color, Side::Black);
        assert_ne!(newcomer.conn_id, black.conn_id);
        assert!(registry.is_live(white.seat_id, white.conn_id));
        assert!(registry.is_ready_to_start());
    }

    #[test]
    fn test_white_freed_slot_gives_white() {
        let mut registry = SeatRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        let (tx3, _rx3) = channel();
        registry.register(tx1, None).unwrap();
        let white = registry.register(tx2, None).unwrap();
        registry.mark_dead(white.seat_id, white.conn_id);

        let newcomer = registry.register(tx3, None).unwrap();
        assert_eq!((newcomer.seat_id, newcomer.color), (1, Side::White));
    }

    #[test]
    fn test_mark_dead_is_idempotent_and_conn_scoped() {
        let mut registry = SeatRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        let old = registry.register(tx1, None).unwrap();
        assert_eq!(registry.mark_dead(old.seat_id, old.conn_id), Some(Side::Black));
        assert_eq!(registry.mark_dead(old.seat_id, old.conn_id), None);

        // 旧连接的迟到清理不能影响占用同一槽位的新连接
        let new = registry.register(tx2, None).unwrap();
        assert_eq!(new.seat_id, old.seat_id);
        assert_eq!(registry.mark_dead(old.seat_id, old.conn_id), None);
        assert!(registry.is_live(new.seat_id, new.conn_id));
        assert!(!registry.is_live(old.seat_id, old.conn_id));
    }

    #[test]
    fn test_mark_dead_closes_queue() {
        let mut registry = SeatRegistry::new();
        let (tx, mut rx) = channel();
        let seat = registry.register(tx, None).unwrap();

        registry
            .deliver(seat.seat_id, ServerMessage::Waiting { message: "wait".into() })
            .unwrap();
        registry.mark_dead(seat.seat_id, seat.conn_id);

        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Waiting { .. })));
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_deliver_to_closed_queue_reports_failure() {
        let mut registry = SeatRegistry::new();
        let (tx, rx) = channel();
        let seat = registry.register(tx, None).unwrap();
        drop(rx);

        let result = registry.deliver(seat.seat_id, ServerMessage::Waiting { message: "x".into() });
        assert_eq!(result, Err(seat.conn_id));
    }
}
