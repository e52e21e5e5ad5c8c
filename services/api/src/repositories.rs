//! Repositories for database operations

pub mod course;
pub mod lesson;
pub mod payment;
pub mod subscription;
pub mod user;

pub use course::CourseRepository;
pub use lesson::LessonRepository;
pub use payment::PaymentRepository;
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
