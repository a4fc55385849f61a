//! Access policy: which capability each protected operation requires

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::user::UserClaims;

/// Named permission granted to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Librarian capability: renew loans, see every borrowed copy, manage authors
    CanMarkReturned,
    AddBook,
    ChangeBook,
    DeleteBook,
    AddGenre,
    ChangeGenre,
    DeleteGenre,
    AddPublisher,
    ChangePublisher,
    DeletePublisher,
    AddLanguage,
    AddBookinstance,
    ChangeBookinstance,
    DeleteBookinstance,
}

impl Capability {
    pub const ALL: [Capability; 14] = [
        Capability::CanMarkReturned,
        Capability::AddBook,
        Capability::ChangeBook,
        Capability::DeleteBook,
        Capability::AddGenre,
        Capability::ChangeGenre,
        Capability::DeleteGenre,
        Capability::AddPublisher,
        Capability::ChangePublisher,
        Capability::DeletePublisher,
        Capability::AddLanguage,
        Capability::AddBookinstance,
        Capability::ChangeBookinstance,
        Capability::DeleteBookinstance,
    ];

    pub fn codename(&self) -> &'static str {
        match self {
            Capability::CanMarkReturned => "can_mark_returned",
            Capability::AddBook => "add_book",
            Capability::ChangeBook => "change_book",
            Capability::DeleteBook => "delete_book",
            Capability::AddGenre => "add_genre",
            Capability::ChangeGenre => "change_genre",
            Capability::DeleteGenre => "delete_genre",
            Capability::AddPublisher => "add_publisher",
            Capability::ChangePublisher => "change_publisher",
            Capability::DeletePublisher => "delete_publisher",
            Capability::AddLanguage => "add_language",
            Capability::AddBookinstance => "add_bookinstance",
            Capability::ChangeBookinstance => "change_bookinstance",
            Capability::DeleteBookinstance => "delete_bookinstance",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.codename())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.codename() == s)
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

/// What an operation demands of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Capability(Capability),
    Superuser,
}

/// Every protected operation of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RenewInstance,
    CreateAuthor,
    UpdateAuthor,
    DeleteAuthor,
    CreateBook,
    UpdateBook,
    DeleteBook,
    CreateGenre,
    UpdateGenre,
    DeleteGenre,
    CreatePublisher,
    UpdatePublisher,
    DeletePublisher,
    CreateLanguage,
    CreateInstance,
    UpdateInstance,
    DeleteInstance,
    ViewMyBorrowed,
    ViewAllBorrowed,
    ViewProfile,
    ManageCapabilities,
}

impl Operation {
    pub fn requirement(self) -> Requirement {
        use Capability as C;
        use Requirement::Capability as Needs;

        match self {
            Operation::RenewInstance
            | Operation::ViewAllBorrowed
            | Operation::CreateAuthor
            | Operation::UpdateAuthor
            | Operation::DeleteAuthor => Needs(C::CanMarkReturned),
            Operation::CreateBook => Needs(C::AddBook),
            Operation::UpdateBook => Needs(C::ChangeBook),
            Operation::DeleteBook => Needs(C::DeleteBook),
            Operation::CreateGenre => Needs(C::AddGenre),
            Operation::UpdateGenre => Needs(C::ChangeGenre),
            Operation::DeleteGenre => Needs(C::DeleteGenre),
            Operation::CreatePublisher => Needs(C::AddPublisher),
            Operation::UpdatePublisher => Needs(C::ChangePublisher),
            Operation::DeletePublisher => Needs(C::DeletePublisher),
            Operation::CreateLanguage => Needs(C::AddLanguage),
            Operation::CreateInstance => Needs(C::AddBookinstance),
            Operation::UpdateInstance => Needs(C::ChangeBookinstance),
            Operation::DeleteInstance => Needs(C::DeleteBookinstance),
            Operation::ViewMyBorrowed | Operation::ViewProfile => Requirement::Authenticated,
            Operation::ManageCapabilities => Requirement::Superuser,
        }
    }
}

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Forbidden,
    RedirectToLogin,
}

/// Decide whether `identity` may perform `operation`.
///
/// Every protected operation needs a session; anonymous callers are sent to
/// login whatever the operation requires.
pub fn authorize(identity: Option<&UserClaims>, operation: Operation) -> Access {
    let Some(claims) = identity else {
        return Access::RedirectToLogin;
    };

    let allowed = match operation.requirement() {
        Requirement::Authenticated => true,
        Requirement::Capability(capability) => claims.has(capability),
        Requirement::Superuser => claims.is_superuser,
    };

    if allowed {
        Access::Allow
    } else {
        Access::Forbidden
    }
}

/// Login location carrying the original target as `next`
pub fn login_redirect(login_url: &str, next: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{}{}next={}", login_url, separator, urlencoding::encode(next))
}
