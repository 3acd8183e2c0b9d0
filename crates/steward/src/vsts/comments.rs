//! Managed pull request comment threads.
//!
//! A managed thread is one whose first comment starts with `### {subject}`.

use super::convert::pr_number;
use super::repo::VstsRepo;
use super::types::{CreateThread, NewComment, UpdateThread};
use crate::platform::{self, managed_comment_body, managed_comment_header};

/// Comment type code for plain text comments.
const COMMENT_TYPE_TEXT: &str = "text";

impl VstsRepo {
    /// Post a new thread headed `### {subject}`.
    ///
    /// Existing threads with the same subject are left alone, so repeated
    /// calls create repeated threads.
    pub async fn ensure_comment(
        &self,
        number: u64,
        subject: &str,
        content: &str,
    ) -> platform::Result<()> {
        let thread = CreateThread {
            comments: vec![NewComment {
                parent_comment_id: 0,
                content: managed_comment_body(subject, content),
                comment_type: COMMENT_TYPE_TEXT,
            }],
            status: "active",
        };
        self.client
            .create_thread(&self.repo_id, number, &thread)
            .await?;
        tracing::debug!("Added comment \"{}\" to pull request {}", subject, number);
        Ok(())
    }

    /// Close the first thread headed `### {subject}`, if there is one.
    pub async fn ensure_comment_removal(
        &self,
        number: Option<u64>,
        subject: &str,
    ) -> platform::Result<()> {
        let Some(number) = pr_number(number) else {
            return Ok(());
        };

        let header = managed_comment_header(subject);
        let threads = self.client.list_threads(&self.repo_id, number).await?;
        let managed = threads.iter().find(|thread| {
            thread
                .comments
                .first()
                .and_then(|c| c.content.as_deref())
                .is_some_and(|content| content.starts_with(&header))
        });

        if let Some(thread) = managed {
            self.client
                .update_thread(
                    &self.repo_id,
                    number,
                    thread.id,
                    &UpdateThread { status: "closed" },
                )
                .await?;
            tracing::debug!(
                "Closed comment thread {} (\"{}\") on pull request {}",
                thread.id,
                subject,
                number
            );
        }
        Ok(())
    }
}
