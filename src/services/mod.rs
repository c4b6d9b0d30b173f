pub mod distribution;
pub mod review_service;
pub mod student_service;

pub use distribution::DistributionService;
pub use review_service::ReviewService;
pub use student_service::StudentService;
