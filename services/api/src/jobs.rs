//! Background jobs
//!
//! Jobs share nothing with request handlers except the database: the
//! deactivation sweep runs on a cron schedule, and the course-update email
//! fan-out is spawned after a catalog mutation.

use chrono::{Duration, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Start the periodic job scheduler
pub async fn start_scheduler(state: AppState) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let schedule = state.config.deactivation_schedule.clone();

    let job_state = state.clone();
    let job = Job::new_async(schedule.as_str(), move |_id, _lock| {
        let state = job_state.clone();
        Box::pin(async move {
            deactivate_inactive_users(&state).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Job scheduler started (deactivation schedule: {})", schedule);
    Ok(scheduler)
}

/// Flag users who have not logged in for the configured number of days as
/// inactive. Re-runnable; already-inactive users are untouched.
pub async fn deactivate_inactive_users(state: &AppState) {
    let cutoff = Utc::now() - Duration::days(state.config.inactivity_days);

    match state.user_repository.deactivate_inactive(cutoff).await {
        Ok(count) => info!("Deactivated {} inactive users", count),
        Err(e) => error!("Failed to deactivate inactive users: {}", e),
    }
}

/// Send the fixed course-update template to every subscriber of a course.
/// Delivery failures are logged and skipped; there is no retry.
pub async fn send_course_update_emails(state: AppState, course_id: Uuid) {
    let course = match state.course_repository.find_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            warn!("Course {} vanished before update emails went out", course_id);
            return;
        }
        Err(e) => {
            error!("Failed to load course {} for update emails: {}", course_id, e);
            return;
        }
    };

    let emails = match state
        .subscription_repository
        .subscriber_emails(course_id)
        .await
    {
        Ok(emails) => emails,
        Err(e) => {
            error!("Failed to load subscribers of course {}: {}", course_id, e);
            return;
        }
    };

    let body = format!("The course \"{}\" has been updated.", course.title);
    let mut sent = 0usize;

    for email in &emails {
        match state.mailer.send(email, "Course Updated", &body).await {
            Ok(()) => sent += 1,
            Err(e) => error!("Failed to send update email to {}: {}", email, e),
        }
    }

    info!(
        "Course {} update: notified {}/{} subscribers",
        course_id,
        sent,
        emails.len()
    );
}
