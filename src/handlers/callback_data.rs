/// Данные inline-кнопок, разобранные один раз на входе
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackCommand {
    Book,
    Cancel,
    ShowFaq,
    AskQuestion,
    MyRequests,
    BackMenu,
    Service(String),
    Faq(String),
    Approve(i64),
    Reject(i64),
    Clarify(i64),
}

impl CallbackCommand {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "book" => return Some(CallbackCommand::Book),
            "cancel" => return Some(CallbackCommand::Cancel),
            "show_faq" => return Some(CallbackCommand::ShowFaq),
            "ask_question" => return Some(CallbackCommand::AskQuestion),
            "my_requests" => return Some(CallbackCommand::MyRequests),
            "back_menu" => return Some(CallbackCommand::BackMenu),
            _ => {}
        }

        let (prefix, payload) = data.split_once(':')?;
        if payload.is_empty() {
            return None;
        }

        match prefix {
            "service" => Some(CallbackCommand::Service(payload.to_string())),
            "faq" => Some(CallbackCommand::Faq(payload.to_string())),
            "approve" => payload.parse().ok().map(CallbackCommand::Approve),
            "reject" => payload.parse().ok().map(CallbackCommand::Reject),
            "clarify" => payload.parse().ok().map(CallbackCommand::Clarify),
            _ => None,
        }
    }

    pub fn to_data(&self) -> String {
        match self {
            CallbackCommand::Book => "book".to_string(),
            CallbackCommand::Cancel => "cancel".to_string(),
            CallbackCommand::ShowFaq => "show_faq".to_string(),
            CallbackCommand::AskQuestion => "ask_question".to_string(),
            CallbackCommand::MyRequests => "my_requests".to_string(),
            CallbackCommand::BackMenu => "back_menu".to_string(),
            CallbackCommand::Service(code) => format!("service:{}", code),
            CallbackCommand::Faq(code) => format!("faq:{}", code),
            CallbackCommand::Approve(id) => format!("approve:{}", id),
            CallbackCommand::Reject(id) => format!("reject:{}", id),
            CallbackCommand::Clarify(id) => format!("clarify:{}", id),
        }
    }
}
