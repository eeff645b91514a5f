pub mod booking;
pub mod faq_log;
pub mod master;
pub mod request;
pub mod user;
pub mod user_state;

pub use booking::{BookingDraft, BookingStep};
pub use faq_log::FaqLog;
pub use master::{Master, NewMaster};
pub use request::{NewRequest, Request, RequestListRow, RequestStatus, StatusChange};
pub use user::User;
pub use user_state::UserState;
