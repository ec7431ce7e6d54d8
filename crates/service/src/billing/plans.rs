use models::PlanTier;
use serde::Serialize;

use crate::errors::ServiceError;

/// Resource dimensions a plan caps. `None` limits mean unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub max_listings: Option<u64>,
    pub max_staff: Option<u64>,
    pub max_seats: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub tier: PlanTier,
    pub name: &'static str,
    /// Monthly price in cents.
    pub price_cents: i64,
    pub limits: PlanLimits,
}

pub static PLANS: [Plan; 3] = [
    Plan {
        tier: PlanTier::Basic,
        name: "Basic",
        price_cents: 0,
        limits: PlanLimits { max_listings: Some(20), max_staff: Some(2), max_seats: Some(100) },
    },
    Plan {
        tier: PlanTier::Premium,
        name: "Premium",
        price_cents: 2900,
        limits: PlanLimits { max_listings: Some(200), max_staff: Some(10), max_seats: Some(1000) },
    },
    Plan {
        tier: PlanTier::Enterprise,
        name: "Enterprise",
        price_cents: 9900,
        limits: PlanLimits { max_listings: None, max_staff: None, max_seats: None },
    },
];

pub fn catalog() -> &'static [Plan] { &PLANS }

pub fn plan(tier: PlanTier) -> &'static Plan {
    match tier {
        PlanTier::Basic => &PLANS[0],
        PlanTier::Premium => &PLANS[1],
        PlanTier::Enterprise => &PLANS[2],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Rooms, inventory items or buses depending on the service type.
    Listings,
    Staff,
    /// Room or bus capacity summed over the vendor.
    Seats,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Listings => "listings",
            Resource::Staff => "staff",
            Resource::Seats => "seats",
        }
    }
}

impl PlanLimits {
    pub fn max(&self, resource: Resource) -> Option<u64> {
        match resource {
            Resource::Listings => self.max_listings,
            Resource::Staff => self.max_staff,
            Resource::Seats => self.max_seats,
        }
    }
}

/// Current consumption of every limited resource for one vendor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub listings: u64,
    pub staff: u64,
    pub seats: u64,
}

impl Usage {
    pub fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Listings => self.listings,
            Resource::Staff => self.staff,
            Resource::Seats => self.seats,
        }
    }
}

/// Fails with `LimitExceeded` when `current + adding` passes the plan cap.
pub fn check_limit(limits: &PlanLimits, resource: Resource, current: u64, adding: u64) -> Result<(), ServiceError> {
    let Some(max) = limits.max(resource) else { return Ok(()) };
    let wanted = current.saturating_add(adding);
    if wanted > max {
        return Err(ServiceError::LimitExceeded(format!(
            "{} limit is {max} (in use {current}, requested {adding}); upgrade your plan",
            resource.as_str()
        )));
    }
    Ok(())
}

/// Whether existing usage fits inside `limits`; used before downgrades.
pub fn ensure_fits(limits: &PlanLimits, usage: &Usage) -> Result<(), ServiceError> {
    for resource in [Resource::Listings, Resource::Staff, Resource::Seats] {
        if let Some(max) = limits.max(resource) {
            let used = usage.get(resource);
            if used > max {
                return Err(ServiceError::Conflict(format!(
                    "{} in use ({used}) exceeds the target plan limit ({max})",
                    resource.as_str()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_ordered_by_price() {
        let prices: Vec<i64> = catalog().iter().map(|p| p.price_cents).collect();
        assert_eq!(prices, vec![0, 2900, 9900]);
        for p in catalog() {
            assert_eq!(plan(p.tier).tier, p.tier);
        }
    }

    #[test]
    fn limit_is_inclusive() {
        let basic = plan(PlanTier::Basic).limits;
        assert!(check_limit(&basic, Resource::Listings, 19, 1).is_ok());
        assert!(matches!(check_limit(&basic, Resource::Listings, 20, 1), Err(ServiceError::LimitExceeded(_))));
        assert!(matches!(check_limit(&basic, Resource::Seats, 90, 11), Err(ServiceError::LimitExceeded(_))));
        assert!(check_limit(&basic, Resource::Staff, 0, 2).is_ok());
    }

    #[test]
    fn enterprise_is_unlimited() {
        let ent = plan(PlanTier::Enterprise).limits;
        assert!(check_limit(&ent, Resource::Seats, u64::MAX - 1, 10).is_ok());
    }

    #[test]
    fn downgrade_requires_fitting_usage() {
        let basic = plan(PlanTier::Basic).limits;
        assert!(ensure_fits(&basic, &Usage { listings: 20, staff: 2, seats: 100 }).is_ok());
        assert!(matches!(ensure_fits(&basic, &Usage { listings: 21, staff: 0, seats: 0 }), Err(ServiceError::Conflict(_))));
    }
}
