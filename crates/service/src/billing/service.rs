use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use common::metrics::{PAYMENT_ATTEMPTS_TOTAL, PAYMENT_FAILURES_TOTAL};
use common::pagination::Pagination;
use common::types::Page;
use models::{payment, subscription, PaymentStatus, PlanTier, SubscriptionStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::gateway::{ChargeRequest, PaymentGateway};
use super::plans::{self, ensure_fits, Plan, Usage};
use super::repository::BillingRepository;
use super::retry::RetryPolicy;
use crate::errors::ServiceError;

pub const BILLING_PERIOD_DAYS: i64 = 30;

/// Fresh basic subscription for a newly onboarded vendor.
pub fn initial_subscription(vendor_id: Uuid, currency: &str, now: DateTime<Utc>) -> subscription::Model {
    let basic = plans::plan(PlanTier::Basic);
    subscription::Model {
        id: Uuid::new_v4(),
        vendor_id,
        tier: basic.tier.as_str().to_string(),
        status: SubscriptionStatus::Active.as_str().to_string(),
        amount_cents: basic.price_cents,
        currency: currency.to_string(),
        current_period_start: now.into(),
        current_period_end: (now + Duration::days(BILLING_PERIOD_DAYS)).into(),
        cancel_at_period_end: false,
        payment_source: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn start_period(sub: &mut subscription::Model, plan: &Plan, now: DateTime<Utc>) {
    sub.tier = plan.tier.as_str().to_string();
    sub.amount_cents = plan.price_cents;
    sub.status = SubscriptionStatus::Active.as_str().to_string();
    sub.cancel_at_period_end = false;
    sub.current_period_start = now.into();
    sub.current_period_end = (now + Duration::days(BILLING_PERIOD_DAYS)).into();
    sub.updated_at = now.into();
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePlanInput {
    pub tier: PlanTier,
    /// Opaque gateway token; falls back to the stored one when omitted.
    #[serde(default)]
    pub payment_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub subscription: subscription::Model,
    pub plan: Plan,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanChange {
    pub subscription: subscription::Model,
    pub payment: Option<payment::Model>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenewalReport {
    pub renewed: u32,
    pub reverted: u32,
    pub pending: u32,
    pub past_due: u32,
}

/// Subscription workflow over a billing store `R` and a payment gateway `G`.
pub struct SubscriptionService<R: BillingRepository, G: PaymentGateway + ?Sized> {
    repo: Arc<R>,
    gateway: Arc<G>,
    retry: RetryPolicy,
    currency: String,
}

impl<R: BillingRepository, G: PaymentGateway + ?Sized> SubscriptionService<R, G> {
    pub fn new(repo: Arc<R>, gateway: Arc<G>, retry: RetryPolicy, currency: impl Into<String>) -> Self {
        Self { repo, gateway, retry, currency: currency.into() }
    }

    pub fn currency(&self) -> &str { &self.currency }

    async fn load(&self, vendor_id: Uuid) -> Result<subscription::Model, ServiceError> {
        self.repo.get_subscription(vendor_id).await?.ok_or_else(|| ServiceError::not_found("subscription"))
    }

    pub async fn current(&self, vendor_id: Uuid) -> Result<SubscriptionView, ServiceError> {
        let subscription = self.load(vendor_id).await?;
        let plan = *plans::plan(subscription.tier()?);
        let usage = self.repo.usage(vendor_id).await?;
        Ok(SubscriptionView { subscription, plan, usage })
    }

    /// Write a pending payment, charge it through the gateway and store the
    /// outcome. Gateway errors that survive retries end as a failed payment.
    async fn charge(&self, sub: &subscription::Model, plan: &Plan, source: &str, now: DateTime<Utc>) -> Result<payment::Model, ServiceError> {
        let mut pay = payment::Model {
            id: Uuid::new_v4(),
            vendor_id: sub.vendor_id,
            subscription_id: sub.id,
            tier: plan.tier.as_str().to_string(),
            amount_cents: plan.price_cents,
            currency: self.currency.clone(),
            status: PaymentStatus::Pending.as_str().to_string(),
            gateway_ref: None,
            failure_reason: None,
            idempotency_key: Uuid::new_v4().simple().to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        };
        pay = self.repo.insert_payment(pay).await?;

        let req = ChargeRequest {
            amount: plan.price_cents,
            currency: self.currency.clone(),
            source: source.to_string(),
            description: format!("{} plan, vendor {}", plan.name, sub.vendor_id),
            idempotency_key: pay.idempotency_key.clone(),
        };
        PAYMENT_ATTEMPTS_TOTAL.inc();
        match self.retry.run(|| self.gateway.charge(&req)).await {
            Ok(outcome) => {
                pay.status = outcome.status.as_str().to_string();
                pay.gateway_ref = Some(outcome.reference);
                pay.failure_reason = outcome.failure_reason;
            }
            Err(e) => {
                pay.status = PaymentStatus::Failed.as_str().to_string();
                pay.failure_reason = Some(e.to_string());
            }
        }
        if pay.status()? == PaymentStatus::Failed {
            PAYMENT_FAILURES_TOTAL.inc();
            warn!(payment_id = %pay.id, vendor_id = %pay.vendor_id, reason = ?pay.failure_reason, gateway = self.gateway.name(), "payment_failed");
        }
        pay.updated_at = Utc::now().into();
        self.repo.update_payment(pay).await
    }

    /// Move a vendor to another tier. Downgrades apply at once when usage
    /// fits; upgrades charge the full monthly price first.
    #[instrument(skip(self, input), fields(tier = %input.tier))]
    pub async fn change_plan(&self, vendor_id: Uuid, input: ChangePlanInput, now: DateTime<Utc>) -> Result<PlanChange, ServiceError> {
        let mut sub = self.load(vendor_id).await?;
        let current = sub.tier()?;
        if input.tier == current {
            return Err(ServiceError::Conflict(format!("already on the {current} plan")));
        }
        if sub.status()? == SubscriptionStatus::Pending {
            return Err(ServiceError::Conflict("a plan change is awaiting payment".into()));
        }
        let target = plans::plan(input.tier);

        if input.tier < current {
            let usage = self.repo.usage(vendor_id).await?;
            ensure_fits(&target.limits, &usage)?;
            sub.tier = target.tier.as_str().to_string();
            sub.amount_cents = target.price_cents;
            sub.status = SubscriptionStatus::Active.as_str().to_string();
            sub.cancel_at_period_end = false;
            sub.updated_at = now.into();
            let sub = self.repo.save_subscription(sub).await?;
            info!(vendor_id = %vendor_id, from = %current, to = %target.tier, "subscription_downgraded");
            return Ok(PlanChange { subscription: sub, payment: None });
        }

        let source = input
            .payment_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| sub.payment_source.clone())
            .ok_or_else(|| ServiceError::Validation("payment_token required for paid plans".into()))?;
        let pay = self.charge(&sub, target, &source, now).await?;
        match pay.status()? {
            PaymentStatus::Succeeded => {
                start_period(&mut sub, target, now);
                sub.payment_source = Some(source);
                let sub = self.repo.save_subscription(sub).await?;
                info!(vendor_id = %vendor_id, from = %current, to = %target.tier, payment_id = %pay.id, "subscription_upgraded");
                Ok(PlanChange { subscription: sub, payment: Some(pay) })
            }
            PaymentStatus::Pending => {
                sub.status = SubscriptionStatus::Pending.as_str().to_string();
                sub.payment_source = Some(source);
                sub.updated_at = now.into();
                let sub = self.repo.save_subscription(sub).await?;
                info!(vendor_id = %vendor_id, payment_id = %pay.id, "subscription_payment_pending");
                Ok(PlanChange { subscription: sub, payment: Some(pay) })
            }
            PaymentStatus::Failed => Err(ServiceError::Payment(
                pay.failure_reason.unwrap_or_else(|| "payment declined".into()),
            )),
        }
    }

    /// Resolve a pending payment reported back by the gateway.
    #[instrument(skip(self))]
    pub async fn settle_payment(&self, payment_id: Uuid, status: PaymentStatus, now: DateTime<Utc>) -> Result<PlanChange, ServiceError> {
        if status == PaymentStatus::Pending {
            return Err(ServiceError::Validation("settlement status must be succeeded or failed".into()));
        }
        let mut pay = self.repo.get_payment(payment_id).await?.ok_or_else(|| ServiceError::not_found("payment"))?;
        if pay.status()? != PaymentStatus::Pending {
            return Err(ServiceError::Conflict("payment is already settled".into()));
        }
        pay.status = status.as_str().to_string();
        pay.updated_at = now.into();
        let pay = self.repo.update_payment(pay).await?;

        let mut sub = self.load(pay.vendor_id).await?;
        if status == PaymentStatus::Succeeded {
            start_period(&mut sub, plans::plan(pay.tier()?), now);
        } else {
            PAYMENT_FAILURES_TOTAL.inc();
            sub.status = SubscriptionStatus::Active.as_str().to_string();
            sub.updated_at = now.into();
        }
        let sub = self.repo.save_subscription(sub).await?;
        info!(payment_id = %pay.id, vendor_id = %pay.vendor_id, status = %status, "payment_settled");
        Ok(PlanChange { subscription: sub, payment: Some(pay) })
    }

    /// Stop renewing; the paid tier stays until the period ends.
    #[instrument(skip(self))]
    pub async fn cancel(&self, vendor_id: Uuid, now: DateTime<Utc>) -> Result<subscription::Model, ServiceError> {
        let mut sub = self.load(vendor_id).await?;
        if sub.tier()? == PlanTier::Basic {
            return Err(ServiceError::Conflict("basic plan cannot be canceled".into()));
        }
        if sub.cancel_at_period_end {
            return Err(ServiceError::Conflict("subscription already canceled".into()));
        }
        sub.status = SubscriptionStatus::Canceled.as_str().to_string();
        sub.cancel_at_period_end = true;
        sub.updated_at = now.into();
        let sub = self.repo.save_subscription(sub).await?;
        info!(vendor_id = %vendor_id, period_end = %sub.current_period_end, "subscription_canceled");
        Ok(sub)
    }

    /// Roll every subscription whose period has ended.
    #[instrument(skip(self))]
    pub async fn renew_due(&self, now: DateTime<Utc>) -> Result<RenewalReport, ServiceError> {
        let mut report = RenewalReport::default();
        for mut sub in self.repo.due_subscriptions(now).await? {
            let status = sub.status()?;
            if status == SubscriptionStatus::Pending {
                continue;
            }
            if sub.cancel_at_period_end || status == SubscriptionStatus::Canceled {
                start_period(&mut sub, plans::plan(PlanTier::Basic), now);
                self.repo.save_subscription(sub).await?;
                report.reverted += 1;
                continue;
            }
            let plan = plans::plan(sub.tier()?);
            if plan.price_cents == 0 {
                start_period(&mut sub, plan, now);
                self.repo.save_subscription(sub).await?;
                report.renewed += 1;
                continue;
            }
            let Some(source) = sub.payment_source.clone() else {
                sub.status = SubscriptionStatus::PastDue.as_str().to_string();
                sub.updated_at = now.into();
                self.repo.save_subscription(sub).await?;
                report.past_due += 1;
                continue;
            };
            let pay = self.charge(&sub, plan, &source, now).await?;
            match pay.status()? {
                PaymentStatus::Succeeded => {
                    start_period(&mut sub, plan, now);
                    report.renewed += 1;
                }
                PaymentStatus::Pending => {
                    sub.status = SubscriptionStatus::Pending.as_str().to_string();
                    sub.updated_at = now.into();
                    report.pending += 1;
                }
                PaymentStatus::Failed => {
                    sub.status = SubscriptionStatus::PastDue.as_str().to_string();
                    sub.updated_at = now.into();
                    report.past_due += 1;
                }
            }
            self.repo.save_subscription(sub).await?;
        }
        info!(renewed = report.renewed, reverted = report.reverted, pending = report.pending, past_due = report.past_due, "renewal_run_finished");
        Ok(report)
    }

    pub async fn list_payments(&self, vendor_id: Uuid, p: Pagination) -> Result<Page<payment::Model>, ServiceError> {
        let (items, total) = self.repo.list_payments(Some(vendor_id), p).await?;
        Ok(Page { items, page: p.page.max(1), per_page: p.normalize().1 as u32, total })
    }

    pub async fn list_all_payments(&self, p: Pagination) -> Result<Page<payment::Model>, ServiceError> {
        let (items, total) = self.repo.list_payments(None, p).await?;
        Ok(Page { items, page: p.page.max(1), per_page: p.normalize().1 as u32, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::gateway::{MockPaymentGateway, MockStep};
    use crate::billing::repository::mock::MockBillingRepository;

    struct Fixture {
        repo: Arc<MockBillingRepository>,
        gateway: Arc<MockPaymentGateway>,
        svc: SubscriptionService<MockBillingRepository, MockPaymentGateway>,
        vendor_id: Uuid,
    }

    fn fixture(steps: Vec<MockStep>) -> Fixture {
        let repo = Arc::new(MockBillingRepository::default());
        let gateway = Arc::new(MockPaymentGateway::with_script(steps));
        let vendor_id = Uuid::new_v4();
        repo.put_subscription(initial_subscription(vendor_id, "USD", Utc::now()));
        let retry = RetryPolicy::new(3, std::time::Duration::from_millis(1), std::time::Duration::from_millis(2));
        let svc = SubscriptionService::new(repo.clone(), gateway.clone(), retry, "USD");
        Fixture { repo, gateway, svc, vendor_id }
    }

    fn upgrade(tier: PlanTier) -> ChangePlanInput {
        ChangePlanInput { tier, payment_token: Some("tok_test".into()) }
    }

    #[tokio::test]
    async fn successful_upgrade_switches_tier_and_restarts_period() {
        let f = fixture(vec![]);
        let now = Utc::now();
        let change = f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), now).await.unwrap();
        assert_eq!(change.subscription.tier().unwrap(), PlanTier::Premium);
        assert_eq!(change.subscription.status().unwrap(), SubscriptionStatus::Active);
        assert_eq!(change.subscription.amount_cents, 2900);
        assert_eq!(change.subscription.current_period_end.with_timezone(&Utc), now + Duration::days(30));
        let pay = change.payment.unwrap();
        assert_eq!(pay.status().unwrap(), PaymentStatus::Succeeded);
        assert!(pay.gateway_ref.is_some());
        assert_eq!(f.gateway.charges()[0].amount, 2900);
    }

    #[tokio::test]
    async fn same_tier_is_a_conflict() {
        let f = fixture(vec![]);
        let res = f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Basic), Utc::now()).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));
        assert!(f.gateway.charges().is_empty());
    }

    #[tokio::test]
    async fn declined_charge_leaves_subscription_untouched() {
        let f = fixture(vec![MockStep::Decline("card declined".into())]);
        let res = f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Enterprise), Utc::now()).await;
        assert!(matches!(res, Err(ServiceError::Payment(m)) if m == "card declined"));
        let view = f.svc.current(f.vendor_id).await.unwrap();
        assert_eq!(view.subscription.tier().unwrap(), PlanTier::Basic);
        let payments = f.repo.payments();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status().unwrap(), PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn transient_gateway_errors_are_retried() {
        let f = fixture(vec![MockStep::Unavailable, MockStep::Unavailable]);
        let change = f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), Utc::now()).await.unwrap();
        assert_eq!(change.subscription.tier().unwrap(), PlanTier::Premium);
        let charges = f.gateway.charges();
        assert_eq!(charges.len(), 3);
        assert!(charges.iter().all(|c| c.idempotency_key == charges[0].idempotency_key));
    }

    #[tokio::test]
    async fn pending_charge_marks_subscription_pending_until_settled() {
        let f = fixture(vec![MockStep::Pending]);
        let now = Utc::now();
        let change = f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), now).await.unwrap();
        assert_eq!(change.subscription.status().unwrap(), SubscriptionStatus::Pending);
        assert_eq!(change.subscription.tier().unwrap(), PlanTier::Basic);

        let again = f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Enterprise), now).await;
        assert!(matches!(again, Err(ServiceError::Conflict(_))));

        let pay_id = change.payment.unwrap().id;
        let settled = f.svc.settle_payment(pay_id, PaymentStatus::Succeeded, now).await.unwrap();
        assert_eq!(settled.subscription.tier().unwrap(), PlanTier::Premium);
        assert_eq!(settled.subscription.status().unwrap(), SubscriptionStatus::Active);
        assert!(matches!(
            f.svc.settle_payment(pay_id, PaymentStatus::Failed, now).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn upgrade_requires_payment_token() {
        let f = fixture(vec![]);
        let res = f.svc.change_plan(f.vendor_id, ChangePlanInput { tier: PlanTier::Premium, payment_token: None }, Utc::now()).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn downgrade_only_when_usage_fits() {
        let f = fixture(vec![]);
        let now = Utc::now();
        f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), now).await.unwrap();
        f.repo.set_usage(f.vendor_id, Usage { listings: 25, staff: 1, seats: 40 });
        let res = f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Basic), now).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));

        f.repo.set_usage(f.vendor_id, Usage { listings: 20, staff: 1, seats: 40 });
        let change = f.svc.change_plan(f.vendor_id, ChangePlanInput { tier: PlanTier::Basic, payment_token: None }, now).await.unwrap();
        assert_eq!(change.subscription.tier().unwrap(), PlanTier::Basic);
        assert!(change.payment.is_none());
        assert_eq!(f.gateway.charges().len(), 1);
    }

    #[tokio::test]
    async fn renewal_charges_reverts_and_flags_past_due() {
        let f = fixture(vec![]);
        let start = Utc::now();
        f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), start).await.unwrap();

        let canceled_vendor = Uuid::new_v4();
        let mut canceled = initial_subscription(canceled_vendor, "USD", start);
        canceled.tier = PlanTier::Enterprise.as_str().into();
        canceled.status = SubscriptionStatus::Canceled.as_str().into();
        canceled.cancel_at_period_end = true;
        f.repo.put_subscription(canceled);

        let later = start + Duration::days(31);
        let report = f.svc.renew_due(later).await.unwrap();
        assert_eq!(report.renewed, 1);
        assert_eq!(report.reverted, 1);
        let reverted = f.svc.current(canceled_vendor).await.unwrap().subscription;
        assert_eq!(reverted.tier().unwrap(), PlanTier::Basic);
        assert!(!reverted.cancel_at_period_end);
        assert_eq!(f.gateway.charges().len(), 2);
    }

    #[tokio::test]
    async fn failed_renewal_is_past_due() {
        let f = fixture(vec![MockStep::Succeed, MockStep::Decline("expired card".into())]);
        let start = Utc::now();
        f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), start).await.unwrap();
        let report = f.svc.renew_due(start + Duration::days(30)).await.unwrap();
        assert_eq!(report.past_due, 1);
        let sub = f.svc.current(f.vendor_id).await.unwrap().subscription;
        assert_eq!(sub.status().unwrap(), SubscriptionStatus::PastDue);
        assert_eq!(sub.tier().unwrap(), PlanTier::Premium);
    }

    #[tokio::test]
    async fn cancel_keeps_tier_until_period_end() {
        let f = fixture(vec![]);
        assert!(matches!(f.svc.cancel(f.vendor_id, Utc::now()).await, Err(ServiceError::Conflict(_))));
        f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), Utc::now()).await.unwrap();
        let sub = f.svc.cancel(f.vendor_id, Utc::now()).await.unwrap();
        assert!(sub.cancel_at_period_end);
        assert_eq!(sub.tier().unwrap(), PlanTier::Premium);
        assert_eq!(sub.status().unwrap(), SubscriptionStatus::Canceled);
    }

    #[tokio::test]
    async fn payments_are_listed_per_vendor() {
        let f = fixture(vec![MockStep::Decline("no".into())]);
        let _ = f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), Utc::now()).await;
        f.svc.change_plan(f.vendor_id, upgrade(PlanTier::Premium), Utc::now()).await.unwrap();
        let page = f.svc.list_payments(f.vendor_id, Pagination::default()).await.unwrap();
        assert_eq!(page.total, 2);
        let other = f.svc.list_payments(Uuid::new_v4(), Pagination::default()).await.unwrap();
        assert_eq!(other.total, 0);
        assert_eq!(f.svc.list_all_payments(Pagination::default()).await.unwrap().total, 2);
    }
}
