//! Authorization rules for users and messages.
//!
//! Every check is a pure function of the caller's [`Identity`] and the state of
//! the resource being touched, so none of them need a datastore.

use crate::db::{Message, MessageDetail};
use crate::error::AppError;

/// A username proven by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Identity { username: username.into() }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is(&self, username: &str) -> bool {
        self.username == username
    }
}

/// Anything with a sender and a recipient.
pub trait Participants {
    fn sender(&self) -> &str;
    fn recipient(&self) -> &str;
}

impl Participants for Message {
    fn sender(&self) -> &str {
        &self.from_username
    }

    fn recipient(&self) -> &str {
        &self.to_username
    }
}

impl Participants for MessageDetail {
    fn sender(&self) -> &str {
        &self.from_user.username
    }

    fn recipient(&self) -> &str {
        &self.to_user.username
    }
}

/// Sender or recipient may read a message.
pub fn authorize_read_message<M: Participants>(
    caller: &Identity,
    message: &M,
) -> Result<(), AppError> {
    if caller.is(message.sender()) || caller.is(message.recipient()) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Unable to read message".to_string()))
    }
}

/// Only the recipient may mark a message read.
pub fn authorize_mark_read<M: Participants>(
    caller: &Identity,
    message: &M,
) -> Result<(), AppError> {
    if caller.is(message.recipient()) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Unable to mark message as read".to_string()))
    }
}

/// A user's detail and message lists are visible only to that user.
pub fn authorize_self(caller: &Identity, target_username: &str) -> Result<(), AppError> {
    if caller.is(target_username) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Not allowed to view data of {}",
            target_username
        )))
    }
}

/// Any authenticated caller may list the directory.
pub fn authorize_list_users(_caller: &Identity) -> Result<(), AppError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(from: &str, to: &str) -> Message {
        Message {
            id: 1,
            from_username: from.to_string(),
            to_username: to.to_string(),
            body: "hi".to_string(),
            sent_at: 0,
            read_at: None,
        }
    }

    #[test]
    fn test_participants_may_read() {
        let m = message("alice", "bob");
        assert!(authorize_read_message(&Identity::new("alice"), &m).is_ok());
        assert!(authorize_read_message(&Identity::new("bob"), &m).is_ok());
    }

    #[test]
    fn test_outsider_may_not_read() {
        let m = message("alice", "bob");
        let result = authorize_read_message(&Identity::new("carol"), &m);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_only_recipient_marks_read() {
        let m = message("alice", "bob");
        assert!(authorize_mark_read(&Identity::new("bob"), &m).is_ok());
        assert!(matches!(
            authorize_mark_read(&Identity::new("alice"), &m),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_mark_read(&Identity::new("carol"), &m),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_self_message_recipient_is_sender() {
        let m = message("alice", "alice");
        assert!(authorize_read_message(&Identity::new("alice"), &m).is_ok());
        assert!(authorize_mark_read(&Identity::new("alice"), &m).is_ok());
    }

    #[test]
    fn test_match_is_exact() {
        let m = message("alice", "bob");
        assert!(authorize_mark_read(&Identity::new("Bob"), &m).is_err());
        assert!(authorize_read_message(&Identity::new("alice "), &m).is_err());
    }

    #[test]
    fn test_authorize_self() {
        let bob = Identity::new("bob");
        assert!(authorize_self(&bob, "bob").is_ok());
        assert!(matches!(authorize_self(&bob, "alice"), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_any_identity_lists_users() {
        assert!(authorize_list_users(&Identity::new("anyone")).is_ok());
    }
}
