use crate::model::reservation::Reservation;

/// 予約成立を外部（WebSocket 等）へ知らせるためのフック。
/// fire-and-forget であり、配送の成否はこのコアの結果に影響しない。
pub trait ReservationNotifier: Send + Sync {
    fn reservation_created(&self, reservation: &Reservation);
}
