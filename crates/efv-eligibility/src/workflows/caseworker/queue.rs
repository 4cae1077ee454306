use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueStatus {
    Pending,
    InReview,
    Verified,
    RequiresAction,
}

/// Submitted application awaiting case-worker review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedApplication {
    pub id: &'static str,
    pub applicant_name: &'static str,
    pub date_of_birth: &'static str,
    pub submitted_date: &'static str,
    pub program: &'static str,
    pub status: QueueStatus,
    pub completion_progress: u8,
    pub verified_factors: u8,
    pub total_factors: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub in_review: usize,
    pub requires_action: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationsQueue {
    applications: Vec<QueuedApplication>,
}

impl Default for ApplicationsQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationsQueue {
    pub fn new() -> Self {
        Self {
            applications: queued_applications(),
        }
    }

    pub fn applications(&self) -> &[QueuedApplication] {
        &self.applications
    }

    pub fn find(&self, id: &str) -> Option<&QueuedApplication> {
        self.applications.iter().find(|application| application.id == id)
    }

    pub fn stats(&self) -> QueueStats {
        let count = |status: QueueStatus| {
            self.applications
                .iter()
                .filter(|application| application.status == status)
                .count()
        };
        QueueStats {
            total: self.applications.len(),
            in_review: count(QueueStatus::InReview),
            requires_action: count(QueueStatus::RequiresAction),
            pending: count(QueueStatus::Pending),
        }
    }
}

fn queued_applications() -> Vec<QueuedApplication> {
    vec![
        QueuedApplication {
            id: "APP-2026-001",
            applicant_name: "Amina Ahmed",
            date_of_birth: "January 01, 1999",
            submitted_date: "January 12, 2026",
            program: "Disability Assistance Program",
            status: QueueStatus::InReview,
            completion_progress: 75,
            verified_factors: 2,
            total_factors: 4,
        },
        QueuedApplication {
            id: "APP-2026-002",
            applicant_name: "John Smith",
            date_of_birth: "March 15, 1985",
            submitted_date: "January 15, 2026",
            program: "Income Assistance Program",
            status: QueueStatus::Pending,
            completion_progress: 0,
            verified_factors: 0,
            total_factors: 4,
        },
        QueuedApplication {
            id: "APP-2026-003",
            applicant_name: "Sarah Johnson",
            date_of_birth: "July 22, 1992",
            submitted_date: "January 18, 2026",
            program: "Disability Assistance Program",
            status: QueueStatus::RequiresAction,
            completion_progress: 50,
            verified_factors: 1,
            total_factors: 4,
        },
        QueuedApplication {
            id: "APP-2026-004",
            applicant_name: "Michael Chen",
            date_of_birth: "November 08, 1978",
            submitted_date: "January 20, 2026",
            program: "Disability Assistance Program",
            status: QueueStatus::Verified,
            completion_progress: 100,
            verified_factors: 4,
            total_factors: 4,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_count_each_queue_status() {
        let stats = ApplicationsQueue::new().stats();
        assert_eq!(
            stats,
            QueueStats {
                total: 4,
                in_review: 1,
                requires_action: 1,
                pending: 1,
            }
        );
    }

    #[test]
    fn applications_are_found_by_id() {
        let queue = ApplicationsQueue::new();
        let found = queue.find("APP-2026-003").expect("queued");
        assert_eq!(found.applicant_name, "Sarah Johnson");
        assert!(queue.find("APP-2026-999").is_none());
    }
}
