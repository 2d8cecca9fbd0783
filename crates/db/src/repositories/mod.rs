//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod member_repo;
pub mod room_repo;
pub mod track_repo;

pub use member_repo::MemberRepo;
pub use room_repo::RoomRepo;
pub use track_repo::TrackRepo;
