//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod character_image_repo;
pub mod character_repo;
pub mod episode_repo;
pub mod relationship_repo;
pub mod segment_repo;
pub mod series_repo;
pub mod session_repo;
pub mod setting_repo;
pub mod user_repo;
pub mod video_repo;
pub mod visual_style_repo;

pub use character_image_repo::CharacterImageRepo;
pub use character_repo::CharacterRepo;
pub use episode_repo::EpisodeRepo;
pub use relationship_repo::RelationshipRepo;
pub use segment_repo::SegmentRepo;
pub use series_repo::SeriesRepo;
pub use session_repo::SessionRepo;
pub use setting_repo::SettingRepo;
pub use user_repo::UserRepo;
pub use video_repo::VideoRepo;
pub use visual_style_repo::VisualStyleRepo;
