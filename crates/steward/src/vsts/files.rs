//! File listing and content.

use super::convert::{file_paths, item_content};
use super::repo::VstsRepo;
use crate::platform::{self, Advisory, PlatformError};

impl VstsRepo {
    /// Paths of every file on the base branch.
    ///
    /// The first successful listing is cached for the life of the handle (or
    /// until the base branch changes); failures are not cached.
    pub async fn get_file_list(&self) -> Advisory<Vec<String>> {
        let result = self
            .file_list
            .get_or_try_init(|| async {
                let items = self
                    .client
                    .list_items(&self.repo_id, &self.base_branch)
                    .await?;
                let paths = file_paths(&items);
                tracing::debug!(
                    "Listed {} file(s) on {} ({} tree entries)",
                    paths.len(),
                    self.base_branch,
                    items.len()
                );
                Ok::<_, PlatformError>(paths)
            })
            .await
            .cloned();
        Advisory::from_result(result, "get_file_list")
    }

    /// Content of `path` on `branch` (default: the base branch), or `None`
    /// when the file does not exist there.
    pub async fn get_file(
        &self,
        path: &str,
        branch: Option<&str>,
    ) -> platform::Result<Option<String>> {
        let branch = branch.unwrap_or(&self.base_branch);
        let Some(item) = self.client.get_item(&self.repo_id, path, branch).await? else {
            return Ok(None);
        };
        Ok(item_content(&item)?)
    }
}
