use serde::{Deserialize, Serialize};

/// Шаги анкеты записи, строго по порядку
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStep {
    Service,
    Date,
    Time,
    PetName,
    Phone,
    Comment,
}

impl BookingStep {
    pub fn next(self) -> Option<BookingStep> {
        match self {
            BookingStep::Service => Some(BookingStep::Date),
            BookingStep::Date => Some(BookingStep::Time),
            BookingStep::Time => Some(BookingStep::PetName),
            BookingStep::PetName => Some(BookingStep::Phone),
            BookingStep::Phone => Some(BookingStep::Comment),
            BookingStep::Comment => None,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            BookingStep::Service => "Выбери услугу:",
            BookingStep::Date => "Дата в формате ДД.ММ.ГГГГ (например, 15.01.2026):",
            BookingStep::Time => "Время в формате ЧЧ:ММ (например, 10:30):",
            BookingStep::PetName => "Кличка питомца:",
            BookingStep::Phone => "Телефон (+7...):",
            BookingStep::Comment => "Комментарий (или напиши 'нет'):",
        }
    }
}

/// Уже собранные поля заявки
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub pet_name: Option<String>,
    pub phone: Option<String>,
}
