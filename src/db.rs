pub mod user_repo;
pub use user_repo::UserRepository;
pub mod member_repo;
pub use member_repo::MemberRepository;
pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod capacity_repo;
pub use capacity_repo::CapacityRepository;
pub mod analytics_repo;
pub use analytics_repo::AnalyticsRepository;
pub mod trainer_repo;
pub use trainer_repo::TrainerRepository;
pub mod workout_repo;
pub use workout_repo::WorkoutPlanRepository;
