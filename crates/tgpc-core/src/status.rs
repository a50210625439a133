use crate::domain::UserStatus;

/// Human-readable "last seen" string for a presence status.
pub fn render_status(status: Option<&UserStatus>) -> String {
    match status {
        Some(UserStatus::Online) => "Currently online".to_string(),
        Some(UserStatus::Offline { was_online }) => {
            was_online.format("%Y-%m-%d %H:%M:%S %Z").to_string()
        }
        Some(UserStatus::Recently) => "Last seen recently".to_string(),
        Some(UserStatus::LastWeek) => "Last seen last week".to_string(),
        Some(UserStatus::LastMonth) => "Last seen last month".to_string(),
        Some(UserStatus::Empty) | None => "Unknown".to_string(),
    }
}
