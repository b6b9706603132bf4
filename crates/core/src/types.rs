/// Users are keyed by an opaque random UUID generated at registration.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
