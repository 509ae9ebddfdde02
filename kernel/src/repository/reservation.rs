use crate::model::{
    id::{ReservationId, RoomId, UserId},
    reservation::{event::CreateReservation, Reservation, ReservationListing},
};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use shared::error::AppResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    // 予約とメンバー行をまとめて登録する。
    // 空き確認は同一トランザクション内で再評価される必要がある。
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation>;
    // 指定時間帯 [start, end) に重なる未キャンセル予約が無いか調べる
    async fn is_available(
        &self,
        room_id: RoomId,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> AppResult<bool>;
    // 予約をキャンセル扱いにする（行は残す）
    async fn cancel(&self, reservation_id: ReservationId) -> AppResult<()>;
    // 終了時刻を過ぎた PENDING 予約を一括で CONFIRMED にし、件数を返す
    async fn confirm_expired(&self, now: DateTime<Local>) -> AppResult<u64>;
    // ユーザーが所有する、またはメンバーとして含まれる未キャンセル予約の一覧
    async fn find_for_user(&self, user_id: UserId, email: &str)
        -> AppResult<Vec<ReservationListing>>;
}
