use kernel::model::{
    id::{ReservationId, RoomId, UserId},
    reservation::{ReservationListing, ReservationStatus},
};
use sqlx::types::chrono::{DateTime, Local};

// 「自分の予約一覧」用に rooms とメンバー数を JOIN した行
#[derive(sqlx::FromRow)]
pub struct ReservationListingRow {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub room_name: String,
    pub location: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub status: ReservationStatus,
    pub member_count: i64,
}

impl From<ReservationListingRow> for ReservationListing {
    fn from(value: ReservationListingRow) -> Self {
        let ReservationListingRow {
            reservation_id,
            user_id,
            room_id,
            room_name,
            location,
            start_time,
            end_time,
            status,
            member_count,
        } = value;
        ReservationListing {
            reservation_id,
            reserved_by: user_id,
            room_id,
            room_name,
            location,
            start_time,
            end_time,
            status,
            member_count,
        }
    }
}
