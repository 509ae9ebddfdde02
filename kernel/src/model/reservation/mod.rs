use crate::model::id::{ReservationId, RoomId, UserId};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub mod event;
pub mod window;

/// 予約の状態。PENDING で作成され、終了時刻を過ぎると自動的に CONFIRMED になる。
/// CANCELLED は明示的なキャンセル操作でのみ入り、以後は遷移しない。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub reserved_by: UserId,
    pub room_id: RoomId,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Local>,
    pub members: Vec<ReservationMember>,
}

// 予約時点のメンバー情報のスナップショット。
// users テーブルへの参照ではなく値のコピーなので、
// 後からユーザー名が変わっても過去の予約記録は変わらない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationMember {
    pub member_name: String,
    pub member_email: String,
}

/// 「自分の予約一覧」用に部屋情報とメンバー数を JOIN した形。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationListing {
    pub reservation_id: ReservationId,
    pub reserved_by: UserId,
    pub room_id: RoomId,
    pub room_name: String,
    pub location: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub status: ReservationStatus,
    pub member_count: i64,
}
