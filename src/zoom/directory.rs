use super::models::{Account, UserPage};
use super::{parse_json, ZoomClient};
use crate::error::{ArchiveError, ArchiveResult};
use tracing::{info, warn};

/// Accounts collected from every readable page, plus the pages that failed.
#[derive(Debug, Default)]
pub struct AccountListing {
    pub accounts: Vec<Account>,
    pub failed_pages: Vec<ArchiveError>,
}

pub struct UserDirectory<'a> {
    client: &'a ZoomClient,
    page_size: u32,
}

impl<'a> UserDirectory<'a> {
    pub fn new(client: &'a ZoomClient, page_size: u32) -> Self {
        Self { client, page_size }
    }

    /// Fetch every organization account in server order.
    ///
    /// A rejected first page is fatal. Later pages that fail are skipped and
    /// reported in `failed_pages`.
    pub async fn list_accounts(&self) -> ArchiveResult<AccountListing> {
        let response = self.client.get("/users", &self.page_query(1)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::FatalAuth { status });
        }
        let first: UserPage = parse_json(response).await?;
        let page_count = first.page_count.max(1);
        info!("User directory reports {} page(s)", page_count);

        let mut listing = AccountListing {
            accounts: first.users.into_iter().map(Account::from).collect(),
            failed_pages: Vec::new(),
        };

        for page in 2..=page_count {
            match self.fetch_page(page).await {
                Ok(users) => listing.accounts.extend(users),
                Err(err) => {
                    warn!("Skipping user page {}: {}", page, err);
                    listing.failed_pages.push(err);
                }
            }
        }

        info!("Found {} account(s)", listing.accounts.len());
        Ok(listing)
    }

    async fn fetch_page(&self, page: u32) -> ArchiveResult<Vec<Account>> {
        let page_result: ArchiveResult<UserPage> =
            self.client.get_json("/users", &self.page_query(page)).await;
        page_result
            .map(|body| body.users.into_iter().map(Account::from).collect())
            .map_err(|err| ArchiveError::PartialDirectoryFailure {
                page,
                reason: err.to_string(),
            })
    }

    fn page_query(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("page_number", page.to_string()),
            ("page_size", self.page_size.to_string()),
        ]
    }
}
