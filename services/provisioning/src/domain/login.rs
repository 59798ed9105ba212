//! Login-handle derivation.
//!
//! Teachers, students and parents are registered under handles derived from the
//! human-readable id the school gave them (`T-100` → `t-100@school.internal`).
//! Accounts provisioned with a raw email keep that email unchanged.

use campus_domain::role::Role;

/// Id-style fields a caller may supply; which one applies depends on the role.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginSource<'a> {
    pub email: Option<&'a str>,
    pub teacher_id: Option<&'a str>,
    pub student_id: Option<&'a str>,
    pub parent_id: Option<&'a str>,
}

impl<'a> LoginSource<'a> {
    fn id_for(&self, role: Role) -> Option<&'a str> {
        match role {
            Role::Teacher => self.teacher_id,
            Role::Student => self.student_id,
            Role::Parent => self.parent_id,
            Role::SchoolAdmin => None,
        }
    }
}

/// Lower-case and drop every whitespace character.
pub fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Derive the login handle for a new account, or `None` if nothing usable was supplied.
///
/// `domain` may be given with or without a leading `@`.
pub fn derive_login_handle(
    role: Option<Role>,
    source: &LoginSource<'_>,
    domain: &str,
) -> Option<String> {
    let domain = domain.trim().trim_start_matches('@');
    if let Some(id) = role.and_then(|r| source.id_for(r)) {
        let local = normalize_id(id);
        if !local.is_empty() {
            return Some(format!("{local}@{domain}"));
        }
    }
    source
        .email
        .filter(|email| !email.trim().is_empty())
        .map(str::to_owned)
}
