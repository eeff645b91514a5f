use teloxide::types::InlineKeyboardButton;
use teloxide::types::InlineKeyboardMarkup;

use crate::catalog::{self, FAQ, SERVICES};
use crate::handlers::callback_data::CallbackCommand;
use crate::models::{Request, User};

fn button(text: &str, command: CallbackCommand) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.to_string(), command.to_data())
}

/// Главное меню
pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("📅 Записаться", CallbackCommand::Book)],
        vec![button("💰 Прайс", CallbackCommand::Faq("price".to_string()))],
        vec![button("📍 Адрес и график", CallbackCommand::Faq("address".to_string()))],
        vec![button("❓ FAQ", CallbackCommand::ShowFaq)],
        vec![button("💬 Задать вопрос", CallbackCommand::AskQuestion)],
        vec![button("📋 Мои заявки", CallbackCommand::MyRequests)],
    ])
}

pub fn cancel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button("❌ Отмена", CallbackCommand::Cancel)]])
}

/// Клавиатура выбора услуги
pub fn services_keyboard() -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = SERVICES
        .iter()
        .map(|service| vec![button(service.name, CallbackCommand::Service(service.code.to_string()))])
        .collect();

    keyboard.push(vec![button("❌ Отмена", CallbackCommand::Cancel)]);

    InlineKeyboardMarkup::new(keyboard)
}

pub fn faq_keyboard() -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = FAQ
        .iter()
        .map(|item| vec![button(item.question, CallbackCommand::Faq(item.code.to_string()))])
        .collect();

    keyboard.push(vec![button("❌ Назад", CallbackCommand::BackMenu)]);

    InlineKeyboardMarkup::new(keyboard)
}

pub fn faq_answer_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("⬅️ Назад", CallbackCommand::ShowFaq)],
        vec![button("🏠 Главное меню", CallbackCommand::BackMenu)],
    ])
}

pub fn back_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button("🏠 Главное меню", CallbackCommand::BackMenu)]])
}

/// Кнопки решения по заявке для сотрудников
pub fn request_decision_keyboard(request_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("✅ Подтвердить", CallbackCommand::Approve(request_id)),
            button("❌ Отклонить", CallbackCommand::Reject(request_id)),
        ],
        vec![button("🤔 Уточнить", CallbackCommand::Clarify(request_id))],
    ])
}

/// Карточка новой заявки для сотрудников
pub fn render_request_card(request: &Request, user: &User) -> String {
    format!(
        "📋 НОВАЯ ЗАЯВКА\n\
        ━━━━━━━━━━━━━━━━\n\
        Услуга: {}\n\
        📅 Дата: {}\n\
        ⏰ Время: {}\n\
        🐕 Питомец: {}\n\
        ☎️ Телефон: {}\n\
        💬 Комментарий: {}\n\
        👤 Клиент: {} (id {})\n\
        🆔 ID заявки: {}",
        catalog::service_name(&request.service),
        request.desired_date,
        request.desired_time,
        request.pet_name,
        user.phone.as_deref().unwrap_or("не указан"),
        request.comment.as_deref().unwrap_or("нет"),
        user.display_name(),
        user.tg_user_id,
        request.id
    )
}

pub fn render_user_requests(requests: &[Request]) -> String {
    let mut text = String::from("📋 Твои заявки:\n\n");
    for (i, request) in requests.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} {}\n   📅 {} {}\n   🐕 {}\n   Статус: {}\n\n",
            i + 1,
            request.status.emoji(),
            catalog::service_name(&request.service),
            request.desired_date,
            request.desired_time,
            request.pet_name,
            request.status
        ));
    }
    text
}
