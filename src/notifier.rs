use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Исходящие уведомления клиентам и сотрудникам
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), NotifyError>;
}

#[async_trait]
impl Notifier for Bot {
    async fn notify(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), NotifyError> {
        let request = self.send_message(chat_id, text);
        match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub struct Sent {
        pub chat_id: ChatId,
        pub text: String,
        pub keyboard: Option<InlineKeyboardMarkup>,
    }

    /// Запоминает отправленное; для чатов из `unreachable` возвращает ошибку
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<Sent>>,
        pub unreachable: Mutex<HashSet<ChatId>>,
    }

    impl RecordingNotifier {
        pub fn block(&self, chat_id: ChatId) {
            self.unreachable.lock().unwrap().insert(chat_id);
        }

        pub fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.chat_id == chat_id)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            chat_id: ChatId,
            text: &str,
            keyboard: Option<InlineKeyboardMarkup>,
        ) -> Result<(), NotifyError> {
            if self.unreachable.lock().unwrap().contains(&chat_id) {
                return Err(teloxide::RequestError::Api(teloxide::ApiError::BotBlocked).into());
            }
            self.sent.lock().unwrap().push(Sent {
                chat_id,
                text: text.to_string(),
                keyboard,
            });
            Ok(())
        }
    }
}
