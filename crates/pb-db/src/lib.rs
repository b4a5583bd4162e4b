//! # pb-db
//!
//! Database layer for Pulseboard.
//!
//! This crate provides PostgreSQL database access using SQLx, including:
//!
//! - Connection pool management
//! - Repository pattern for CRUD operations
//! - Entity mappings for profiles, departments, KPIs, tickets, activities,
//!   meeting rooms, reservations, and notifications
//!
//! ## Example
//!
//! ```ignore
//! use pb_db::{Database, DatabaseConfig};
//! use pb_db::kpis::KpiRepository;
//! use pb_db::repository::Repository;
//!
//! let config = DatabaseConfig::default();
//! let db = Database::connect(&config).await?;
//!
//! let repo = KpiRepository::new(db.pool().clone());
//! let kpi = repo.find_by_id(1).await?;
//! ```

pub mod activities;
pub mod activity_categories;
pub mod departments;
pub mod kpi_comments;
pub mod kpi_progress;
pub mod kpis;
pub mod meeting_rooms;
pub mod notifications;
pub mod pool;
pub mod profiles;
pub mod repository;
pub mod reservations;
pub mod roles;
pub mod ticket_comments;
pub mod tickets;

// Re-exports
pub use activities::{ActivityRepository, ActivityRow, CreateActivityDto, UpdateActivityDto};
pub use activity_categories::{
    ActivityCategoryRepository, ActivityCategoryRow, CreateCategoryDto, UpdateCategoryDto,
};
pub use departments::{
    CreateDepartmentDto, DepartmentRepository, DepartmentRow, UpdateDepartmentDto,
};
pub use kpi_comments::{CreateKpiCommentDto, KpiCommentRepository, KpiCommentRow};
pub use kpi_progress::{CreateProgressDto, KpiProgressRepository, KpiProgressRow};
pub use kpis::{CreateKpiDto, KpiRepository, KpiTargetRow, UpdateKpiDto};
pub use meeting_rooms::{
    CreateMeetingRoomDto, MeetingRoomRepository, MeetingRoomRow, UpdateMeetingRoomDto,
};
pub use notifications::{CreateNotificationDto, NotificationRepository, NotificationRow};
pub use pool::{Database, DatabaseConfig};
pub use profiles::{CreateProfileDto, ProfileRepository, ProfileRow, UpdateProfileDto};
pub use repository::{
    PaginatedResult, Pagination, Repository, RepositoryError, RepositoryResult,
};
pub use reservations::{
    CreateReservationDto, ReservationRepository, ReservationRow, UpdateReservationDto,
};
pub use roles::{UserRoleRepository, UserRoleRow};
pub use ticket_comments::{CreateTicketCommentDto, TicketCommentRepository, TicketCommentRow};
pub use tickets::{CreateTicketDto, TicketRepository, TicketRow, UpdateTicketDto};
