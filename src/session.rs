use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use strum::Display;
use teloxide::types::UserId;
use tokio::sync::Mutex;

use crate::video::{Format, VideoDetails};

/// Where a user is in the conversation. A missing session means idle.
#[derive(Debug, Clone, PartialEq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    AwaitingUrl,
    SelectingQuality {
        url: String,
        formats: Vec<Format>,
        info: VideoDetails,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub step: Step,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            updated_at: Utc::now(),
        }
    }
}

/// Per-user conversation records.
///
/// The lock only covers single map operations, so two handlers for the same
/// user can still interleave and the last `set` wins.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<UserId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.sessions.lock().await.get(&user).cloned()
    }

    pub async fn set(&self, user: UserId, session: Session) {
        log::debug!("Session for {} -> {}", user.0, session.step);
        self.sessions.lock().await.insert(user, session);
    }

    pub async fn delete(&self, user: UserId) -> Option<Session> {
        self.sessions.lock().await.remove(&user)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drop sessions not written to for longer than `max_age`. Returns how many went.
    pub async fn sweep_stale(&self, max_age: Duration) -> usize {
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            return 0;
        };

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at >= cutoff);
        before - sessions.len()
    }
}
