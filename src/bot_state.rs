use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use teloxide::types::ChatId;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::database::Database;
use crate::models::UserState;
use crate::notifier::Notifier;

type StateStore = Arc<RwLock<HashMap<ChatId, (UserState, Instant)>>>;

#[derive(Debug, thiserror::Error)]
pub enum BotStateError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Общее состояние бота и панели: база, настройки, диалоги пользователей
#[derive(Clone)]
pub struct BotState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub notifier: Arc<dyn Notifier>,
    dialogs: StateStore,
}

impl BotState {
    pub fn new(db: Database, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            notifier,
            dialogs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn ttl(&self) -> Duration {
        self.config.session_ttl
    }

    /// Состояние диалога; просроченная запись считается пустой
    pub async fn get_user_state(&self, chat_id: ChatId) -> UserState {
        let dialogs = self.dialogs.read().await;
        match dialogs.get(&chat_id) {
            Some((state, touched)) if touched.elapsed() < self.ttl() => state.clone(),
            Some(_) => {
                log::debug!("⌛ Dialog state expired for {}", chat_id);
                UserState::Idle
            }
            None => UserState::Idle,
        }
    }

    pub async fn save_user_state(&self, chat_id: ChatId, state: UserState) {
        let mut dialogs = self.dialogs.write().await;
        if state == UserState::Idle {
            dialogs.remove(&chat_id);
        } else {
            dialogs.insert(chat_id, (state, Instant::now()));
        }
    }

    pub async fn clear_user_state(&self, chat_id: ChatId) {
        self.dialogs.write().await.remove(&chat_id);
    }

    pub async fn cleanup_expired(&self) {
        let ttl = self.ttl();
        let mut dialogs = self.dialogs.write().await;
        let previous_count = dialogs.len();

        dialogs.retain(|_, (_, touched)| touched.elapsed() < ttl);

        log::debug!("🧹 Dialogs cleaned: {} -> {} entries", previous_count, dialogs.len());
    }

    /// Рассылка всем сотрудникам по очереди; ошибка одного адресата не прерывает рассылку
    pub async fn notify_staff(&self, text: &str, keyboard: Option<teloxide::types::InlineKeyboardMarkup>) -> usize {
        let mut delivered = 0;
        for admin_id in &self.config.admin_ids {
            match self.notifier.notify(*admin_id, text, keyboard.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => log::error!("❌ Failed to notify staff {}: {}", admin_id, e),
            }
        }
        delivered
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashSet;

    use super::*;
    use crate::notifier::testing::RecordingNotifier;

    pub const STAFF_A: ChatId = ChatId(1001);
    pub const STAFF_B: ChatId = ChatId(1002);

    pub fn test_config(session_ttl: Duration) -> AppConfig {
        AppConfig {
            bot_token: "test-token".to_string(),
            database_url: "sqlite::memory:".to_string(),
            admin_ids: HashSet::from([STAFF_A, STAFF_B]),
            spam_timeout_minutes: 3,
            session_ttl,
            dashboard_addr: "127.0.0.1:0".parse().unwrap(),
        }
    }

    pub async fn test_state() -> (BotState, Arc<RecordingNotifier>) {
        test_state_with_ttl(Duration::from_secs(1800)).await
    }

    pub async fn test_state_with_ttl(ttl: Duration) -> (BotState, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let db = Database::in_memory().await;
        let state = BotState::new(db, test_config(ttl), notifier.clone());
        (state, notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::models::BookingStep;

    #[tokio::test]
    async fn unknown_chat_is_idle() {
        let (state, _) = test_state().await;
        assert_eq!(state.get_user_state(ChatId(5)).await, UserState::Idle);
    }

    #[tokio::test]
    async fn saved_state_is_returned_and_idle_removes_it() {
        let (state, _) = test_state().await;
        state.save_user_state(ChatId(5), UserState::start_booking()).await;
        assert!(matches!(
            state.get_user_state(ChatId(5)).await,
            UserState::Booking { step: BookingStep::Service, .. }
        ));

        state.save_user_state(ChatId(5), UserState::Idle).await;
        assert_eq!(state.get_user_state(ChatId(5)).await, UserState::Idle);
    }

    #[tokio::test]
    async fn expired_state_reads_as_idle_and_is_purged() {
        let (state, _) = test_state_with_ttl(Duration::from_millis(20)).await;
        state.save_user_state(ChatId(5), UserState::AwaitingQuestion).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(state.get_user_state(ChatId(5)).await, UserState::Idle);
        state.cleanup_expired().await;
        assert!(state.dialogs.read().await.is_empty());
    }

    #[tokio::test]
    async fn staff_broadcast_survives_one_failure() {
        let (state, notifier) = test_state().await;
        notifier.block(STAFF_A);

        let delivered = state.notify_staff("card", None).await;

        assert_eq!(delivered, 1);
        assert_eq!(notifier.sent_to(STAFF_B).len(), 1);
        assert!(notifier.sent_to(STAFF_A).is_empty());
    }
}
