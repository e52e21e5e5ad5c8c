//! Access policy for catalog resources
//!
//! Authorization is decided in two independent steps: an action-level check
//! (may this caller run this class of operation at all) and a row-visibility
//! scope applied to list/retrieve queries. Both must allow an operation for
//! it to succeed.
//!
//! The role model is a flat moderator flag: moderators may read and update
//! any course or lesson but may never create or delete them; ordinary users
//! may only mutate what they own.

use uuid::Uuid;

/// The caller of a request, as established by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User { id: Uuid, is_moderator: bool },
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::User { id, .. } => Some(*id),
        }
    }
}

/// Operation classes over a catalog resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Read-only actions are permitted to every caller
    pub fn is_safe(&self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// Row visibility for list and retrieve queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every row is visible
    All,
    /// Only rows owned by the given user are visible
    OwnedBy(Uuid),
    /// No rows are visible
    Nothing,
}

impl Scope {
    /// Whether a row with the given owner falls inside this scope
    pub fn permits(&self, owner_id: Uuid) -> bool {
        match self {
            Scope::All => true,
            Scope::OwnedBy(id) => *id == owner_id,
            Scope::Nothing => false,
        }
    }

    /// Owner filter to push into a query; `None` means no filter
    pub fn owner_filter(&self) -> Option<Uuid> {
        match self {
            Scope::OwnedBy(id) => Some(*id),
            _ => None,
        }
    }
}

/// Action-level permission for courses and lessons.
///
/// Reads are open to everyone. Creation is reserved for authenticated
/// non-moderators. Updates and deletes require authentication here and are
/// settled per object by [`allows_object`].
pub fn allows(actor: &Actor, action: Action) -> bool {
    if action.is_safe() {
        return true;
    }
    match actor {
        Actor::Anonymous => false,
        Actor::User { is_moderator, .. } => match action {
            Action::Create => !is_moderator,
            _ => true,
        },
    }
}

/// Object-level permission for a specific course or lesson row.
///
/// Owners may do anything to their own rows. Moderators may update any row
/// but deletion stays owner-only.
pub fn allows_object(actor: &Actor, action: Action, owner_id: Uuid) -> bool {
    if action.is_safe() {
        return true;
    }
    match actor {
        Actor::Anonymous => false,
        Actor::User { id, is_moderator } => {
            if *id == owner_id {
                return true;
            }
            *is_moderator && action == Action::Update
        }
    }
}

/// Row visibility for course listings and detail lookups
pub fn course_scope(actor: &Actor) -> Scope {
    match actor {
        Actor::Anonymous => Scope::All,
        Actor::User { is_moderator: true, .. } => Scope::All,
        Actor::User { id, .. } => Scope::OwnedBy(*id),
    }
}

/// Row visibility for lesson listings and detail lookups.
///
/// Unlike courses, anonymous callers see an empty collection.
pub fn lesson_scope(actor: &Actor) -> Scope {
    match actor {
        Actor::Anonymous => Scope::Nothing,
        Actor::User { is_moderator: true, .. } => Scope::All,
        Actor::User { id, .. } => Scope::OwnedBy(*id),
    }
}

/// Row visibility for payment listings
pub fn payment_scope(actor: &Actor) -> Scope {
    match actor {
        Actor::Anonymous => Scope::Nothing,
        Actor::User { is_moderator: true, .. } => Scope::All,
        Actor::User { id, .. } => Scope::OwnedBy(*id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_moderator: bool) -> (Uuid, Actor) {
        let id = Uuid::new_v4();
        (id, Actor::User { id, is_moderator })
    }

    #[test]
    fn safe_actions_are_open_to_everyone() {
        let (_, member) = user(false);
        let (_, moderator) = user(true);
        for actor in [&Actor::Anonymous, &member, &moderator] {
            assert!(allows(actor, Action::List));
            assert!(allows(actor, Action::Retrieve));
            assert!(allows_object(actor, Action::Retrieve, Uuid::new_v4()));
        }
    }

    #[test]
    fn only_regular_users_may_create() {
        let (_, member) = user(false);
        let (_, moderator) = user(true);
        assert!(allows(&member, Action::Create));
        assert!(!allows(&moderator, Action::Create));
        assert!(!allows(&Actor::Anonymous, Action::Create));
    }

    #[test]
    fn owners_may_update_and_delete_their_rows() {
        let (id, owner) = user(false);
        assert!(allows_object(&owner, Action::Update, id));
        assert!(allows_object(&owner, Action::Delete, id));
    }

    #[test]
    fn non_owners_may_not_mutate() {
        let (_, member) = user(false);
        let other = Uuid::new_v4();
        assert!(!allows_object(&member, Action::Update, other));
        assert!(!allows_object(&member, Action::Delete, other));
    }

    #[test]
    fn moderators_update_anything_but_never_delete() {
        let (_, moderator) = user(true);
        let other = Uuid::new_v4();
        assert!(allows_object(&moderator, Action::Update, other));
        assert!(!allows_object(&moderator, Action::Delete, other));
    }

    #[test]
    fn course_visibility_per_role() {
        let (id, member) = user(false);
        let (_, moderator) = user(true);
        assert_eq!(course_scope(&Actor::Anonymous), Scope::All);
        assert_eq!(course_scope(&moderator), Scope::All);
        assert_eq!(course_scope(&member), Scope::OwnedBy(id));
    }

    #[test]
    fn anonymous_lesson_listing_is_empty() {
        assert_eq!(lesson_scope(&Actor::Anonymous), Scope::Nothing);
        let (id, member) = user(false);
        assert_eq!(lesson_scope(&member), Scope::OwnedBy(id));
        let (_, moderator) = user(true);
        assert_eq!(lesson_scope(&moderator), Scope::All);
    }

    #[test]
    fn scope_row_checks() {
        let owner = Uuid::new_v4();
        assert!(Scope::All.permits(owner));
        assert!(Scope::OwnedBy(owner).permits(owner));
        assert!(!Scope::OwnedBy(Uuid::new_v4()).permits(owner));
        assert!(!Scope::Nothing.permits(owner));
        assert_eq!(Scope::All.owner_filter(), None);
        assert_eq!(Scope::OwnedBy(owner).owner_filter(), Some(owner));
    }
}
