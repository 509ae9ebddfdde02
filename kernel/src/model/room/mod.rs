use crate::model::id::RoomId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub room_id: RoomId,
    pub room_name: String,
    pub location: String,
    pub capacity: i32,
    pub amenities: String,
}
