//! Global Application State
//!
//! The signed-in user and the notices pages raise after a mutation.

use leptos::*;

use crate::api::types::User;

const SUCCESS_MS: u32 = 3000;
const ERROR_MS: u32 = 5000;
/// Older notices are dropped beyond this many
const MAX_NOTICES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Banner shown after a mutation
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Append `notice`, replacing an identical message and keeping the newest few
pub fn push_notice(notices: &mut Vec<Notice>, notice: Notice) {
    notices.retain(|n| !(n.kind == notice.kind && n.message == notice.message));
    notices.push(notice);
    if notices.len() > MAX_NOTICES {
        let excess = notices.len() - MAX_NOTICES;
        notices.drain(..excess);
    }
}

#[derive(Clone)]
pub struct GlobalState {
    /// Logged-in user, fetched once the session check passes
    pub user: RwSignal<Option<User>>,
    /// Notices on screen, oldest first
    pub notices: RwSignal<Vec<Notice>>,
    next_id: StoredValue<u64>,
}

pub fn provide_global_state() {
    provide_context(GlobalState {
        user: create_rw_signal(None),
        notices: create_rw_signal(Vec::new()),
        next_id: store_value(0),
    });
}

impl GlobalState {
    pub fn show_success(&self, message: &str) {
        self.raise(NoticeKind::Success, message, SUCCESS_MS);
    }

    pub fn show_error(&self, message: &str) {
        self.raise(NoticeKind::Error, message, ERROR_MS);
    }

    pub fn dismiss(&self, id: u64) {
        self.notices.update(|list| list.retain(|n| n.id != id));
    }

    fn raise(&self, kind: NoticeKind, message: &str, timeout_ms: u32) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.notices.update(|list| {
            push_notice(
                list,
                Notice {
                    id,
                    kind,
                    message: message.to_string(),
                },
            )
        });

        let notices = self.notices;
        gloo_timers::callback::Timeout::new(timeout_ms, move || {
            notices.update(|list| list.retain(|n| n.id != id));
        })
        .forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(id: u64, kind: NoticeKind, message: &str) -> Notice {
        Notice {
            id,
            kind,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_repeated_message_replaces_earlier() {
        let mut list = vec![notice(0, NoticeKind::Error, "Failed to load projects")];
        push_notice(&mut list, notice(1, NoticeKind::Error, "Failed to load projects"));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, 1);
    }

    #[test]
    fn test_oldest_notices_drop_first() {
        let mut list = Vec::new();
        for id in 0..5 {
            push_notice(&mut list, notice(id, NoticeKind::Success, &format!("saved {}", id)));
        }
        let ids: Vec<u64> = list.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!(!list[0].is_error());
    }
}
