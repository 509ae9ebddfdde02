use kernel::model::{id::RoomId, room::Room};

#[derive(sqlx::FromRow)]
pub struct RoomRow {
    pub room_id: RoomId,
    pub room_name: String,
    pub location: String,
    pub capacity: i32,
    pub amenities: String,
}

impl From<RoomRow> for Room {
    fn from(value: RoomRow) -> Self {
        let RoomRow {
            room_id,
            room_name,
            location,
            capacity,
            amenities,
        } = value;
        Room {
            room_id,
            room_name,
            location,
            capacity,
            amenities,
        }
    }
}
