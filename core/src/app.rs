//! The wired application: one repository, one flag store, five services.
//!
//! RULES:
//!   - `App` is built once at startup and shared by reference; it is
//!     `Send + Sync` and every handler takes `&self`.
//!   - Requests outside the deployed service's surface are `NotFound`.
//!   - Every request except `health` authenticates first.

use crate::{
    access::{Authenticator, Caller, HeaderAuthenticator, RequestHeaders},
    account_service::AccountService,
    alert_service::AlertService,
    config::{Service, ServiceConfig},
    error::{LoadResult, QueryError, QueryResult},
    flags::{FeatureFlags, Flag, FlagSet},
    insight_service::InsightService,
    request::{AdminCommand, HealthReport, Reply, Request},
    snapshot::Snapshot,
    store::EntityStore,
    transaction_service::TransactionService,
    types::EntityKind,
    user_service::UserService,
};
use std::sync::Arc;

pub struct App {
    service:      Service,
    store:        Arc<EntityStore>,
    flags:        Arc<FeatureFlags>,
    auth:         Box<dyn Authenticator>,
    users:        UserService,
    accounts:     AccountService,
    transactions: TransactionService,
    insights:     InsightService,
    alerts:       AlertService,
}

impl App {
    /// Load the configured snapshot and wire every service.
    pub fn build(config: &ServiceConfig) -> anyhow::Result<Self> {
        let snapshot = Snapshot::load(&config.data_dir, config.service.datasets())?;
        let app = Self::from_snapshot(config.service, snapshot, config.flags.clone())?;
        log::info!(
            "Service ready: service={} data_dir={}",
            config.service,
            config.data_dir.display()
        );
        Ok(app)
    }

    pub fn from_snapshot(service: Service, snapshot: Snapshot, flags: FlagSet) -> LoadResult<Self> {
        let store = Arc::new(EntityStore::from_snapshot(snapshot)?);
        let flags = Arc::new(FeatureFlags::new(flags));
        let auth = Box::new(HeaderAuthenticator::new(Arc::clone(&store)));
        Ok(Self {
            service,
            users:        UserService::new(Arc::clone(&store)),
            accounts:     AccountService::new(Arc::clone(&store), Arc::clone(&flags)),
            transactions: TransactionService::new(Arc::clone(&store), Arc::clone(&flags)),
            insights:     InsightService::new(Arc::clone(&store), Arc::clone(&flags)),
            alerts:       AlertService::new(Arc::clone(&store), Arc::clone(&flags)),
            auth,
            store,
            flags,
        })
    }

    /// Every service, default flags, over `Snapshot::default_test()`.
    pub fn build_test() -> LoadResult<Self> {
        Self::from_snapshot(Service::All, Snapshot::default_test(), FlagSet::new())
    }

    /// Swap the authenticator, e.g. for a gateway with its own scheme.
    pub fn with_authenticator(mut self, auth: Box<dyn Authenticator>) -> Self {
        self.auth = auth;
        self
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    /// Serve one request.
    pub fn handle(&self, headers: &RequestHeaders, request: &Request) -> QueryResult<Reply> {
        if !self.service.serves(request) {
            log::warn!(
                "Request outside service surface: service={} op={}",
                self.service,
                request.op_name()
            );
            return Err(QueryError::not_found(EntityKind::Route, request.op_name()));
        }

        let mut caller = None;
        let result = match request {
            Request::Health => self.health(),
            _ => self
                .auth
                .authenticate(headers)
                .inspect_err(|_| log::warn!("Unauthenticated request: op={}", request.op_name()))
                .and_then(|c| self.dispatch(caller.insert(c), request)),
        };

        if let Err(QueryError::Internal(context)) = &result {
            log::error!(
                "Request failed: op={} user_id={} target_id={} {context}",
                request.op_name(),
                caller.as_ref().map_or("-", |c| c.user_id.as_str()),
                request.target_id().unwrap_or("-"),
            );
        }
        result
    }

    pub fn admin(&self, command: &AdminCommand) -> QueryResult<Reply> {
        match command {
            AdminCommand::SetFlag { flag, enabled } => {
                let flag: Flag = flag.parse()?;
                self.flags.set(flag, *enabled)?;
            }
            AdminCommand::ReplaceFlags { flags } => self.flags.replace(flags.clone())?,
            AdminCommand::Flags => {}
        }
        Ok(Reply::Flags(self.flags.snapshot()?.effective()))
    }

    pub fn health(&self) -> QueryResult<Reply> {
        Ok(Reply::Health(HealthReport {
            status:    "ok",
            service:   self.service,
            timestamp: chrono::Utc::now(),
            counts:    self.store.counts()?,
        }))
    }

    fn dispatch(&self, caller: &Caller, request: &Request) -> QueryResult<Reply> {
        let reply = match request {
            Request::Health => return self.health(),
            Request::Me => Reply::User(self.users.current_user(caller)?),
            Request::ListAccounts => Reply::Accounts(self.accounts.list_for_caller(caller)?),
            Request::GetAccount { account_id } => {
                Reply::Account(self.accounts.get_for_caller(caller, account_id)?)
            }
            Request::ListTransactions(params) => {
                Reply::Transactions(self.transactions.list_with_params(caller, params)?)
            }
            Request::GetTransaction { transaction_id } => {
                Reply::Transaction(self.transactions.get(caller, transaction_id)?)
            }
            Request::ListInsights => Reply::Insights(self.insights.list_for_caller(caller)?),
            Request::GetInsight { insight_id } => {
                Reply::Insight(self.insights.get_for_caller(caller, insight_id)?)
            }
            Request::ListAlerts => Reply::Alerts(self.alerts.list_for_caller(caller)?),
        };
        Ok(reply)
    }
}
