use chrono::{DateTime, Local};
use garde::Validate;
use kernel::model::{
    id::{ReservationId, RoomId, UserId},
    reservation::{
        event::BookRoom, Reservation, ReservationListing, ReservationMember, ReservationStatus,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[garde(skip)]
    pub user_id: UserId,
    #[garde(skip)]
    pub room_id: RoomId,
    #[garde(skip)]
    pub start_time: DateTime<Local>,
    #[garde(skip)]
    pub end_time: DateTime<Local>,
    #[garde(length(min = 1))]
    pub member_codes: Vec<String>,
}

impl From<CreateReservationRequest> for BookRoom {
    fn from(value: CreateReservationRequest) -> Self {
        let CreateReservationRequest {
            user_id,
            room_id,
            start_time,
            end_time,
            member_codes,
        } = value;
        BookRoom {
            reserved_by: user_id,
            room_id,
            start_time,
            end_time,
            member_codes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Local>,
    pub members: Vec<ReservationMemberResponse>,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            reservation_id,
            reserved_by,
            room_id,
            start_time,
            end_time,
            status,
            created_at,
            members,
        } = value;
        Self {
            reservation_id,
            user_id: reserved_by,
            room_id,
            start_time,
            end_time,
            status,
            created_at,
            members: members
                .into_iter()
                .map(ReservationMemberResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationMemberResponse {
    pub member_name: String,
    pub member_email: String,
}

impl From<ReservationMember> for ReservationMemberResponse {
    fn from(value: ReservationMember) -> Self {
        let ReservationMember {
            member_name,
            member_email,
        } = value;
        Self {
            member_name,
            member_email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListingsResponse {
    pub items: Vec<ReservationListingResponse>,
}

impl From<Vec<ReservationListing>> for ReservationListingsResponse {
    fn from(value: Vec<ReservationListing>) -> Self {
        Self {
            items: value
                .into_iter()
                .map(ReservationListingResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListingResponse {
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

impl From<ReservationListing> for ReservationListingResponse {
    fn from(value: ReservationListing) -> Self {
        let ReservationListing {
            reservation_id,
            reserved_by,
            room_id,
            room_name,
            location,
            start_time,
            end_time,
            status,
            member_count,
        } = value;
        Self {
            reservation_id,
            user_id: reserved_by,
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
