use serde::Serialize;

/// A person enrolled on the terminal.
///
/// `user_id` is the stable identifier assigned by the device. `name` and
/// `department` are local enrichment: once set (via `users set` or a roster
/// fetch filling an empty slot) a sync never overwrites them.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub user_id: i64,
    pub name: Option<String>,
    pub department: Option<String>,
    pub created_at: String,
    pub synced_at: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("--")
    }
}
