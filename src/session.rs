//! Logged-in user and the event tracker that stamps actions with it.

use anyhow::{bail, Result};

use crate::logging::{log, obj, v_str, Domain, Level};
use crate::model::{Event, EventType, Metadata, Timestamp, User, UserRole};
use crate::store::{new_id, CartRepository, EventRepository, SessionRepository};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    /// Session backed by whatever user the store remembers.
    pub fn restore<R: SessionRepository>(repo: &R) -> Result<Self> {
        Ok(Self {
            user: repo.session_user()?,
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Any email is accepted; the display name is its local part.
    pub fn login<R: SessionRepository>(
        &mut self,
        repo: &mut R,
        email: &str,
        role: UserRole,
        now: Timestamp,
    ) -> Result<&User> {
        let email = email.trim();
        let name = email.split('@').next().unwrap_or_default();
        if name.is_empty() {
            bail!("email is required");
        }
        let user = User {
            id: new_id(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            created_at: now,
            avatar: Some(format!("https://ui-avatars.com/api/?name={name}&background=random")),
        };
        repo.save_session_user(&user)?;
        log(
            Level::Info,
            Domain::Session,
            "login",
            obj(&[("user_id", v_str(&user.id)), ("role", v_str(role.as_str()))]),
        );
        Ok(&*self.user.insert(user))
    }

    /// Drops the user and their cart. Returns the user that was logged in.
    pub fn logout<R>(&mut self, repo: &mut R) -> Result<Option<User>>
    where
        R: SessionRepository + CartRepository,
    {
        let Some(user) = self.user.take() else {
            return Ok(None);
        };
        repo.clear_session_user()?;
        repo.clear_cart(&user.id)?;
        log(Level::Info, Domain::Session, "logout", obj(&[("user_id", v_str(&user.id))]));
        Ok(Some(user))
    }
}

pub struct EventTracker;

impl EventTracker {
    /// Append an event for the session's user. Without a user nothing is
    /// recorded and `None` is returned.
    pub fn track<R: EventRepository>(
        repo: &mut R,
        session: &Session,
        event_type: EventType,
        metadata: Option<Metadata>,
        now: Timestamp,
    ) -> Result<Option<Event>> {
        let Some(user) = session.user() else {
            return Ok(None);
        };
        let event = Event::new(user, event_type, now, metadata);
        repo.append_event(event.clone())?;
        Ok(Some(event))
    }
}
