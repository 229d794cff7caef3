//! Per-user state transitions, independent of Telegram.

use teloxide::types::UserId;

use crate::{
    errors::BotResult,
    session::{Session, SessionStore, Step},
    utils::is_youtube_link,
    video::{Extractor, Format, Resolution, VideoDetails, resolve},
};

#[derive(Debug, Clone, PartialEq)]
pub enum UrlOutcome {
    /// The user is not waiting for a link; the text is not ours to handle.
    Ignored,
    InvalidLink,
    NoFormats,
    Ready {
        details: VideoDetails,
        formats: Vec<Format>,
    },
}

/// What the user picked from the quality menu.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub url: String,
    pub format: Format,
    pub details: VideoDetails,
}

pub async fn begin(sessions: &SessionStore, user: UserId) {
    sessions.set(user, Session::new(Step::AwaitingUrl)).await;
}

pub async fn is_awaiting_url(sessions: &SessionStore, user: UserId) -> bool {
    matches!(
        sessions.get(user).await,
        Some(Session {
            step: Step::AwaitingUrl,
            ..
        })
    )
}

pub async fn submit_url<E: Extractor + ?Sized>(
    sessions: &SessionStore,
    extractor: &E,
    user: UserId,
    text: &str,
    max_height: Option<u32>,
) -> BotResult<UrlOutcome> {
    if !is_awaiting_url(sessions, user).await {
        return Ok(UrlOutcome::Ignored);
    }

    let url = text.trim();
    if !is_youtube_link(url) {
        return Ok(UrlOutcome::InvalidLink);
    }

    match resolve(extractor, url, max_height).await? {
        Resolution::NoFormats => Ok(UrlOutcome::NoFormats),
        Resolution::Formats { details, formats } => {
            sessions
                .set(
                    user,
                    Session::new(Step::SelectingQuality {
                        url: url.to_string(),
                        formats: formats.clone(),
                        info: details.clone(),
                    }),
                )
                .await;
            Ok(UrlOutcome::Ready { details, formats })
        }
    }
}

/// `None` when there is no quality menu for this user or the index is stale.
pub async fn select(sessions: &SessionStore, user: UserId, index: usize) -> Option<Selection> {
    match sessions.get(user).await?.step {
        Step::SelectingQuality { url, formats, info } => {
            formats.into_iter().nth(index).map(|format| Selection {
                url,
                format,
                details: info,
            })
        }
        Step::AwaitingUrl => None,
    }
}

pub async fn cancel(sessions: &SessionStore, user: UserId) {
    sessions.delete(user).await;
}
