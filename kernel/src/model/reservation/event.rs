use crate::model::id::{RoomId, UserId};
use crate::model::reservation::ReservationMember;
use chrono::{DateTime, Local};
use derive_new::new;

/// 予約リクエスト。member_codes は参加メンバーのメンバーコード。
#[derive(new, Debug)]
pub struct BookRoom {
    pub reserved_by: UserId,
    pub room_id: RoomId,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub member_codes: Vec<String>,
}

/// 検証・メンバー解決が済んだ後の永続化イベント。
/// members は予約と同一トランザクションで書き込まれる。
#[derive(new, Debug)]
pub struct CreateReservation {
    pub reserved_by: UserId,
    pub room_id: RoomId,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub members: Vec<ReservationMember>,
}
