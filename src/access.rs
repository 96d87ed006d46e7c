use std::{collections::BTreeSet, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ContextError;

/// The environment variable holding a single email with unlimited access.
pub const ADMIN_EMAIL_VARIABLE: &str = "ADMIN_EMAIL";
/// The environment variable holding a comma separated list of emails with unlimited access.
pub const ADMIN_EMAILS_VARIABLE: &str = "ADMIN_EMAILS";

/// The subscription plan of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Lifetime,
}

impl FromStr for Plan {
    type Err = ContextError;

    fn from_str(plan: &str) -> Result<Self, Self::Err> {
        match plan.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            "lifetime" => Ok(Plan::Lifetime),
            _ => Err(ContextError::with_context(format!("Unknown plan {:?}", plan))),
        }
    }
}

/// What the caller knows about the plan of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanState {
    pub plan: Plan,
    /// The number of reports already completed for the user.
    pub completed_reports: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserIdentity {
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn with_email<S: Into<String>>(email: S) -> Self {
        UserIdentity {
            email: Some(email.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    FreePlanLimitReached,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::FreePlanLimitReached => write!(formatter, "Free plan limit reached"),
        }
    }
}

/// Whether a new report may be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    Allowed,
    Denied(DenialReason),
}

/// Decides who may start a new report.
///
/// The policy is built once per process and passed around by reference, nothing in it is
/// read from the environment after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Lower-cased emails which are never limited.
    unlimited_emails: BTreeSet<String>,
    /// How many completed reports the free plan includes.
    pub free_report_limit: usize,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        AccessPolicy {
            unlimited_emails: BTreeSet::new(),
            free_report_limit: 1,
        }
    }
}

impl AccessPolicy {
    pub fn new<I, S>(unlimited_emails: I, free_report_limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AccessPolicy {
            unlimited_emails: unlimited_emails
                .into_iter()
                .filter_map(|email| normalize_email(email.as_ref()))
                .collect(),
            free_report_limit,
        }
    }

    /// Reads the unlimited emails from `ADMIN_EMAIL` and `ADMIN_EMAILS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|variable| std::env::var(variable).ok())
    }

    /// Builds the policy from the given variable lookup, with the same rules as `from_env`.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut unlimited_emails = Vec::new();
        if let Some(email) = lookup(ADMIN_EMAIL_VARIABLE) {
            unlimited_emails.push(email);
        }
        if let Some(emails) = lookup(ADMIN_EMAILS_VARIABLE) {
            unlimited_emails.extend(emails.split(',').map(str::to_string));
        }
        let access_policy = AccessPolicy::new(unlimited_emails, 1);
        log::debug!(
            "Loaded an access policy with {} unlimited emails",
            access_policy.unlimited_emails.len()
        );

        access_policy
    }

    pub fn has_unlimited_access(&self, user: &UserIdentity) -> bool {
        user.email
            .as_deref()
            .and_then(normalize_email)
            .is_some_and(|email| self.unlimited_emails.contains(&email))
    }

    /// Unlimited users and paid plans are always allowed, the free plan only until its
    /// completed reports reach the limit.
    pub fn allowance(&self, user: &UserIdentity, plan_state: &PlanState) -> Allowance {
        if self.has_unlimited_access(user) {
            return Allowance::Allowed;
        }
        match plan_state.plan {
            Plan::Pro | Plan::Lifetime => Allowance::Allowed,
            Plan::Free if plan_state.completed_reports >= self.free_report_limit => {
                Allowance::Denied(DenialReason::FreePlanLimitReached)
            }
            Plan::Free => Allowance::Allowed,
        }
    }
}

fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    (!email.is_empty()).then_some(email)
}
