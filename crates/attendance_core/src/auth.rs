//! Administrator credential check.
//!
//! A single shared credential pair gates login and data reset. Session
//! issuance and expiry belong to the hosting layer.

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "1234";

/// Returns whether the pair matches the administrator credential.
///
/// The username comparison ignores case; the password must match exactly.
pub fn verify_admin(username: &str, password: &str) -> bool {
    username.to_lowercase() == ADMIN_USERNAME && password == ADMIN_PASSWORD
}

#[cfg(test)]
mod tests {
    use super::verify_admin;

    #[test]
    fn username_is_case_insensitive() {
        assert!(verify_admin("admin", "1234"));
        assert!(verify_admin("ADMIN", "1234"));
        assert!(verify_admin("Admin", "1234"));
    }

    #[test]
    fn password_is_exact() {
        assert!(!verify_admin("admin", "12345"));
        assert!(!verify_admin("admin", " 1234"));
        assert!(!verify_admin("admin", ""));
    }

    #[test]
    fn other_usernames_are_rejected() {
        assert!(!verify_admin("root", "1234"));
        assert!(!verify_admin(" admin", "1234"));
    }
}
