mod compare;
mod dashboard;
mod employee_detail;
mod login;
mod photo_capture;
mod photo_result;

pub use compare::CompareView;
pub use dashboard::DashboardView;
pub use employee_detail::EmployeeDetailView;
pub use login::LoginView;
pub use photo_capture::PhotoCaptureView;
pub use photo_result::PhotoResultView;
