//! Organization membership checks.
//!
//! Every organization scoped request needs the caller's membership, so
//! resolved memberships are kept for a short time in a [MembershipCache].

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::BillingError;
use crate::{models::organization::Membership, repo};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CachedMembership {
    membership: Membership,
    expires_at: DateTime<Utc>,
}

/// Memberships by `(organization_id, user_id)`, each kept for `ttl`.
///
/// Only existing memberships are cached, a user added to an organization
/// is recognized on the next request.
pub struct MembershipCache {
    ttl: TimeDelta,
    clock: Box<dyn Clock>,
    entries: RwLock<HashMap<(Uuid, Uuid), CachedMembership>>,
}

impl MembershipCache {
    pub fn new(ttl: TimeDelta, clock: Box<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_system_clock(ttl_secs: i64) -> Self {
        Self::new(TimeDelta::seconds(ttl_secs), Box::new(SystemClock))
    }

    pub async fn get(
        &self,
        repo: &repo::ImplAppRepo,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Membership>> {
        let key = (organization_id, user_id);
        let now = self.clock.now();

        {
            let entries = self.entries.read().await;
            if let Some(cached) = entries.get(&key).filter(|cached| cached.expires_at > now) {
                return Ok(Some(cached.membership.clone()));
            }
        }

        let membership = repo.get_membership(organization_id, user_id).await?;

        let mut entries = self.entries.write().await;
        entries.retain(|_, cached| cached.expires_at > now);
        match &membership {
            Some(membership) => {
                entries.insert(
                    key,
                    CachedMembership {
                        membership: membership.clone(),
                        expires_at: now + self.ttl,
                    },
                );
            }
            None => {
                entries.remove(&key);
            }
        }

        Ok(membership)
    }
}

pub async fn require_member(
    cache: &MembershipCache,
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Membership, BillingError> {
    cache
        .get(repo, organization_id, user_id)
        .await?
        .ok_or(BillingError::NotAMember)
}

/// Membership of an owner or admin, the roles allowed to change billing data
pub async fn require_billing_member(
    cache: &MembershipCache,
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Membership, BillingError> {
    let membership = require_member(cache, repo, organization_id, user_id).await?;

    if !membership.can_manage_billing() {
        return Err(BillingError::Forbidden);
    }

    Ok(membership)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::organization::MemberRole, repo::MockAppRepo};
    use chrono::TimeZone;
    use mockall::predicate::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct FakeClock(Arc<Mutex<DateTime<Utc>>>);

    impl FakeClock {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(
                Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap(),
            )))
        }

        fn advance(&self, delta: TimeDelta) {
            *self.0.lock().unwrap() += delta;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn membership(organization_id: Uuid, user_id: Uuid, role: MemberRole) -> Membership {
        Membership {
            organization_id,
            user_id,
            role,
        }
    }

    #[ntex::test]
    async fn test_membership_is_cached_until_ttl() {
        let (organization_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());
        let clock = FakeClock::new();
        let cache = MembershipCache::new(TimeDelta::seconds(60), Box::new(clock.clone()));

        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_membership()
            .with(eq(organization_id), eq(user_id))
            .times(2)
            .returning(move |o, u| Ok(Some(membership(o, u, MemberRole::Admin))));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        // first lookup hits the repo, the next one within the ttl does not
        for _ in 0..2 {
            let cached = cache.get(&mock_repo, organization_id, user_id).await.unwrap();
            assert_eq!(cached.map(|m| m.role), Some(MemberRole::Admin));
            clock.advance(TimeDelta::seconds(30));
        }

        clock.advance(TimeDelta::seconds(1));
        let refreshed = cache.get(&mock_repo, organization_id, user_id).await.unwrap();
        assert!(refreshed.is_some());
    }

    #[ntex::test]
    async fn test_missing_membership_is_not_cached() {
        let cache = MembershipCache::new(TimeDelta::seconds(60), Box::new(FakeClock::new()));

        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_membership()
            .times(2)
            .returning(|_, _| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let (organization_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(
            require_member(&cache, &mock_repo, organization_id, user_id).await,
            Err(BillingError::NotAMember)
        ));
        assert!(matches!(
            require_member(&cache, &mock_repo, organization_id, user_id).await,
            Err(BillingError::NotAMember)
        ));
    }

    #[ntex::test]
    async fn test_require_billing_member() {
        let cache = MembershipCache::new(TimeDelta::seconds(60), Box::new(FakeClock::new()));
        let organization_id = Uuid::new_v4();
        let (owner_id, member_id) = (Uuid::new_v4(), Uuid::new_v4());

        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_membership()
            .returning(move |o, u| {
                let role = if u == owner_id {
                    MemberRole::Owner
                } else {
                    MemberRole::Member
                };
                Ok(Some(membership(o, u, role)))
            });
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let owner = require_billing_member(&cache, &mock_repo, organization_id, owner_id).await;
        assert!(owner.is_ok_and(|m| m.role == MemberRole::Owner));

        let member = require_billing_member(&cache, &mock_repo, organization_id, member_id).await;
        assert!(matches!(member, Err(BillingError::Forbidden)));

        // plain members still pass the membership check
        assert!(
            require_member(&cache, &mock_repo, organization_id, member_id)
                .await
                .is_ok()
        );
    }
}
