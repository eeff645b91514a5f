use serde::{Deserialize, Serialize};

use super::{BookingDraft, BookingStep};

/// Где пользователь находится в диалоге
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserState {
    #[default]
    Idle,
    Booking {
        step: BookingStep,
        draft: BookingDraft,
    },
    AwaitingQuestion,
}

impl UserState {
    pub fn start_booking() -> Self {
        UserState::Booking {
            step: BookingStep::Service,
            draft: BookingDraft::default(),
        }
    }
}
