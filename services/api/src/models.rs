//! Data model and request/response types

pub mod course;
pub mod lesson;
pub mod payment;
pub mod user;

pub use course::{Course, CourseDetail, CourseListResponse, CreateCourseRequest, UpdateCourseRequest};
pub use lesson::{CreateLessonRequest, Lesson, LessonListResponse, UpdateLessonRequest};
pub use payment::{
    CheckoutResponse, CreatePaymentRequest, Payment, PaymentListQuery, PaymentListResponse,
    PaymentMethod,
};
pub use user::{LoginRequest, RegisterRequest, User, UserResponse};
