//! Self links embedded in API responses.

pub const USERS_PATH: &str = "/api/users";
pub const EMERGENCIES_PATH: &str = "/api/emergencies";

pub fn user_self(id: &str) -> String {
    format!("{USERS_PATH}/{id}")
}

pub fn emergency_self(id: &str) -> String {
    format!("{EMERGENCIES_PATH}/{id}")
}

/// Returns the last path segment of a self link, which is the resource id.
pub fn id_from_self(self_link: &str) -> &str {
    match self_link.rfind('/') {
        Some(idx) => &self_link[idx + 1..],
        None => self_link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_self_links() {
        assert_eq!(user_self("abc"), "/api/users/abc");
        assert_eq!(emergency_self("111"), "/api/emergencies/111");
    }

    #[test]
    fn extracts_id_from_self_link() {
        assert_eq!(id_from_self("/api/emergencies/111"), "111");
        assert_eq!(id_from_self("http://localhost:4000/api/users/xyz"), "xyz");
        assert_eq!(id_from_self("bare"), "bare");
        assert_eq!(id_from_self("/api/emergencies/"), "");
    }
}
