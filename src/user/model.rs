use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "user" => Some(Role::User),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Moderators and admins may act on other users' content
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReport {
    pub reporting_user_id: ObjectId,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub user_reports: Vec<UserReport>,
    #[serde(default)]
    pub is_banned: bool,
    pub created_at: DateTime,
}

impl User {
    /// Records a report against this user. Each reporter counts once;
    /// a repeat report leaves the list unchanged.
    pub fn register_report(&mut self, reporter: ObjectId, reason: String) -> bool {
        if self
            .user_reports
            .iter()
            .any(|r| r.reporting_user_id == reporter)
        {
            return false;
        }

        self.user_reports.push(UserReport {
            reporting_user_id: reporter,
            reason,
        });
        true
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct ReportUserRequest {
    pub reason: String,
}

#[derive(Deserialize)]
pub struct BanUserRequest {
    pub is_banned: bool,
}

/// Public profile shape; the password hash and report details stay server-side.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub bio: String,
    pub avatar: String,
    pub is_banned: bool,
    pub created_at: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username.clone(),
            role: user.role,
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
            is_banned: user.is_banned,
            created_at: user.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserReportView {
    pub reporting_user_id: String,
    pub reason: String,
}

/// Moderation shape served to staff: includes email, ban flag and the
/// reports filed against the user.
#[derive(Debug, Serialize)]
pub struct ModerationUserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_banned: bool,
    pub user_reports: Vec<UserReportView>,
    pub created_at: String,
}

impl From<&User> for ModerationUserView {
    fn from(user: &User) -> Self {
        ModerationUserView {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            is_banned: user.is_banned,
            user_reports: user
                .user_reports
                .iter()
                .map(|r| UserReportView {
                    reporting_user_id: r.reporting_user_id.to_hex(),
                    reason: r.reason.clone(),
                })
                .collect(),
            created_at: user.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, User};
    use mongodb::bson::{DateTime, oid::ObjectId};

    fn sample_user() -> User {
        User {
            id: Some(ObjectId::new()),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hash".to_string(),
            role: Role::User,
            bio: String::new(),
            avatar: String::new(),
            user_reports: Vec::new(),
            is_banned: false,
            created_at: DateTime::now(),
        }
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Moderator).unwrap(),
            "\"moderator\""
        );
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");

        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn role_parse_and_staff() {
        assert_eq!(Role::parse("moderator"), Some(Role::Moderator));
        assert_eq!(Role::parse("root"), None);
        assert!(Role::Moderator.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(!Role::User.is_staff());
    }

    #[test]
    fn duplicate_report_is_ignored() {
        let mut user = sample_user();
        let reporter = ObjectId::new();

        assert!(user.register_report(reporter, "spam".to_string()));
        assert!(!user.register_report(reporter, "spam again".to_string()));
        assert_eq!(user.user_reports.len(), 1);

        let other = ObjectId::new();
        assert!(user.register_report(other, "abuse".to_string()));
        assert_eq!(user.user_reports.len(), 2);
    }
}
