pub mod http;

use std::fmt;

use crate::error::{Error, Result};
use crate::records::{RawConversation, RawOrder, RawPurchase, RawRecords};

/// Session credentials for the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub csrf_token: String,
    /// Marketplace locale selector, e.g. `fr` or `co.uk`.
    pub domain: String,
}

impl Credentials {
    pub fn new(
        access_token: impl Into<String>,
        csrf_token: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<Self> {
        let access_token = access_token.into().trim().to_string();
        let csrf_token = csrf_token.into().trim().to_string();
        let domain = domain.into().trim().to_lowercase();
        if access_token.is_empty() {
            return Err(Error::Config("access token is empty".into()));
        }
        if csrf_token.is_empty() {
            return Err(Error::Config("CSRF token is empty".into()));
        }
        if domain.is_empty() {
            return Err(Error::Config("domain is empty".into()));
        }
        Ok(Self {
            access_token,
            csrf_token,
            domain,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Source of raw records for an authenticated session.
#[allow(async_fn_in_trait)]
pub trait Provider {
    async fn orders(&self, credentials: &Credentials) -> Result<Vec<RawOrder>>;
    async fn purchases(&self, credentials: &Credentials) -> Result<Vec<RawPurchase>>;
    async fn conversations(&self, credentials: &Credentials) -> Result<Vec<RawConversation>>;
}

/// Which record set a retrieval is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Orders,
    Purchases,
    Conversations,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Orders => "orders",
            Resource::Purchases => "purchases",
            Resource::Conversations => "conversations",
        };
        f.write_str(name)
    }
}

/// Loading state shown to the user: `Idle → Loading → {Ready, Failed}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Callbacks for fetch progress.
pub trait FetchProgress {
    fn on_phase(&self, _phase: &FetchPhase) {}
    fn on_records_fetched(&self, _resource: Resource, _count: usize) {}
}

/// Progress reporter that ignores everything.
pub struct NoopProgress;

impl FetchProgress for NoopProgress {}

/// Retrieve orders, purchases and conversations together.
///
/// The three retrievals run concurrently and all of them must succeed; on
/// failure the first error in (orders, purchases, conversations) order is
/// returned and no records are. `Loading` is reported on entry and left
/// exactly once, for `Ready` or `Failed`.
pub async fn fetch_all<P: Provider>(
    provider: &P,
    credentials: &Credentials,
    progress: &dyn FetchProgress,
) -> Result<RawRecords> {
    progress.on_phase(&FetchPhase::Loading);
    log::info!("Fetching records for domain {}", credentials.domain);

    let (orders, purchases, conversations) = tokio::join!(
        provider.orders(credentials),
        provider.purchases(credentials),
        provider.conversations(credentials),
    );

    match collect(orders, purchases, conversations, progress) {
        Ok(records) => {
            log::info!(
                "Fetched {} orders, {} purchases, {} conversations",
                records.orders.len(),
                records.purchases.len(),
                records.conversations.len()
            );
            progress.on_phase(&FetchPhase::Ready);
            Ok(records)
        }
        Err(e) => {
            let message = e.to_string();
            log::error!("Fetch failed: {message}");
            progress.on_phase(&FetchPhase::Failed(message.clone()));
            Err(Error::Fetch(message))
        }
    }
}

fn collect(
    orders: Result<Vec<RawOrder>>,
    purchases: Result<Vec<RawPurchase>>,
    conversations: Result<Vec<RawConversation>>,
    progress: &dyn FetchProgress,
) -> Result<RawRecords> {
    let orders = orders?;
    progress.on_records_fetched(Resource::Orders, orders.len());
    let purchases = purchases?;
    progress.on_records_fetched(Resource::Purchases, purchases.len());
    let conversations = conversations?;
    progress.on_records_fetched(Resource::Conversations, conversations.len());
    Ok(RawRecords {
        orders,
        purchases,
        conversations,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Provider serving canned records, optionally failing one resource.
    #[derive(Default)]
    pub struct FakeProvider {
        pub orders: Vec<RawOrder>,
        pub purchases: Vec<RawPurchase>,
        pub conversations: Vec<RawConversation>,
        pub fail: Option<(Resource, String)>,
        pub calls: AtomicUsize,
    }

    impl FakeProvider {
        fn check(&self, resource: Resource) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail {
                Some((r, message)) if *r == resource => Err(Error::Fetch(message.clone())),
                _ => Ok(()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Provider for FakeProvider {
        async fn orders(&self, _credentials: &Credentials) -> Result<Vec<RawOrder>> {
            self.check(Resource::Orders)?;
            Ok(self.orders.clone())
        }

        async fn purchases(&self, _credentials: &Credentials) -> Result<Vec<RawPurchase>> {
            self.check(Resource::Purchases)?;
            Ok(self.purchases.clone())
        }

        async fn conversations(&self, _credentials: &Credentials) -> Result<Vec<RawConversation>> {
            self.check(Resource::Conversations)?;
            Ok(self.conversations.clone())
        }
    }

    /// Records every progress callback.
    #[derive(Default)]
    pub struct RecordingProgress {
        pub phases: RefCell<Vec<FetchPhase>>,
        pub fetched: RefCell<Vec<(Resource, usize)>>,
    }

    impl FetchProgress for RecordingProgress {
        fn on_phase(&self, phase: &FetchPhase) {
            self.phases.borrow_mut().push(phase.clone());
        }

        fn on_records_fetched(&self, resource: Resource, count: usize) {
            self.fetched.borrow_mut().push((resource, count));
        }
    }

    pub fn credentials() -> Credentials {
        Credentials::new("access", "csrf", "fr").unwrap()
    }
}
