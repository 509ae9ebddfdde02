use chrono::{DateTime, Local};
use kernel::model::id::{ReservationId, RoomId};
use kernel::model::reservation::Reservation;
use kernel::notifier::ReservationNotifier;
use serde::Serialize;
use tokio::sync::broadcast;

/// 予約成立時に購読側（WebSocket ハンドラなど）へ流すイベント。
/// 公開してよいフィールドのみを持つ。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreated {
    pub reservation_id: ReservationId,
    pub room_id: RoomId,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
}

pub struct BroadcastNotifier {
    sender: broadcast::Sender<ReservationCreated>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReservationCreated> {
        self.sender.subscribe()
    }
}

impl ReservationNotifier for BroadcastNotifier {
    fn reservation_created(&self, reservation: &Reservation) {
        let event = ReservationCreated {
            reservation_id: reservation.reservation_id,
            room_id: reservation.room_id,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
        };
        // 購読者がいない場合は送信エラーになるが、配送は best-effort なので無視する
        if self.sender.send(event).is_err() {
            tracing::debug!("no subscribers for reservation broadcast");
        }
    }
}
