//! User reports

use super::period::{PeriodSummary, Window};
use super::{EngagementError, EngagementService};
use crate::data::types::{DayUsers, MetricType};

impl EngagementService {
    /// Registrations per day in `window` against the prior window
    pub async fn new_users(&self, window: Window) -> Result<PeriodSummary, EngagementError> {
        self.period_report(MetricType::Users, window).await
    }

    /// Distinct users with a session on each day of `window`
    pub async fn active_users(&self, window: Window) -> Result<Vec<DayUsers>, EngagementError> {
        let days = self
            .database
            .analytics()
            .active_users_by_day(window.start_key(), window.end_key())
            .await?;
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::data::types::SessionRow;

    #[tokio::test]
    async fn test_new_users_counts_hooked_registrations() {
        let (database, service) = setup().await;
        let repo = database.repository();
        let alice = repo
            .create_user("alice", None, &["user".to_string()])
            .await
            .unwrap()
            .unwrap();
        service.handle_user_created(&alice).await.unwrap();

        let today = chrono::Utc::now().date_naive();
        let window = Window::ending_at(today, 7);
        let report = service.new_users(window).await.unwrap();

        assert_eq!(report.period.count, 1);
        assert_eq!(report.days.last().map(|(_, n)| *n), Some(1));
    }

    #[tokio::test]
    async fn test_active_users_per_day() {
        let (database, service) = setup().await;
        let analytics = database.analytics();
        for (user, id, hour) in [("u1", "s1", 8), ("u1", "s2", 9), ("u2", "s3", 10)] {
            analytics
                .open_session(&SessionRow {
                    user_id: user.to_string(),
                    session_id: id.to_string(),
                    year: 2024,
                    month: 3,
                    day: 12,
                    login_at: at(2024, 3, 12, hour),
                    closed_at: None,
                    device_type: "browser".to_string(),
                })
                .await
                .unwrap();
        }

        let window = Window::new(date(2024, 3, 8), date(2024, 3, 14)).unwrap();
        let days = service.active_users(window).await.unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].users, 2);
    }
}
