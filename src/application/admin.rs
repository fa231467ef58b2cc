use super::marketplace::{Marketplace, Principal};
use crate::domain::money::Money;
use crate::domain::page::{PageRequest, Paginated};
use crate::domain::user::{User, UserAction, UserId, UserRole, UserStatus, UserUpdate, UserView};
use crate::error::{MarketError, Result};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::info;

/// A user with activity counts, as shown in the admin directory.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserDirectoryEntry {
    #[serde(flatten)]
    pub user: UserView,
    pub order_count: usize,
    pub product_count: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceStats {
    pub total_users: usize,
    pub total_orders: usize,
    pub monthly_revenue: Money,
    pub pending_approvals: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

impl Marketplace {
    /// Every user, newest first, with order counts.
    pub async fn admin_users(&self, principal: &Principal) -> Result<Vec<UserDirectoryEntry>> {
        principal.require(&[UserRole::Admin])?;
        let mut users = self.stores.users.get_all().await?;
        users.sort_by_key(|u| Reverse(u.created_at));
        self.directory(users).await
    }

    /// Applies `approve`, `suspend` or `activate` to an account.
    pub async fn admin_user_action(
        &self,
        principal: &Principal,
        id: UserId,
        action: &str,
    ) -> Result<UserView> {
        principal.require(&[UserRole::Admin])?;
        let action: UserAction = action.parse()?;
        let mut user = self.load_user(id).await?;
        user.set_status(action.resulting_status());
        self.stores.users.store(user.clone()).await?;
        info!(user_id = %user.id, action = ?action, status = ?user.status, "user status changed");
        Ok(user.view())
    }

    pub async fn admin_stats(&self, principal: &Principal) -> Result<MarketplaceStats> {
        principal.require(&[UserRole::Admin])?;
        let users = self.stores.users.get_all().await?;
        let orders = self.stores.orders.get_all().await?;
        let month_start = start_of_month(Utc::now());

        Ok(MarketplaceStats {
            total_users: users.len(),
            total_orders: orders.len(),
            monthly_revenue: orders
                .iter()
                .filter(|o| o.status.is_revenue() && o.created_at >= month_start)
                .map(|o| o.total_amount)
                .sum(),
            pending_approvals: users
                .iter()
                .filter(|u| u.status == UserStatus::Pending)
                .count(),
        })
    }

    /// Searchable user directory.
    pub async fn list_users(
        &self,
        principal: &Principal,
        query: &UserQuery,
        page: PageRequest,
    ) -> Result<Paginated<UserDirectoryEntry>> {
        principal.require(&[UserRole::Admin])?;
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut users: Vec<User> = self
            .stores
            .users
            .get_all()
            .await?
            .into_iter()
            .filter(|u| query.role.is_none_or(|r| u.role == r))
            .filter(|u| needle.as_deref().is_none_or(|n| user_matches(u, n)))
            .collect();
        users.sort_by_key(|u| Reverse(u.created_at));

        let page = page.paginate(users);
        Ok(Paginated {
            items: self.directory(page.items).await?,
            pagination: page.pagination,
        })
    }

    pub async fn get_user(&self, principal: &Principal, id: UserId) -> Result<UserDirectoryEntry> {
        principal.require(&[UserRole::Admin])?;
        let user = self.load_user(id).await?;
        let mut entries = self.directory(vec![user]).await?;
        entries
            .pop()
            .ok_or_else(|| MarketError::not_found("User not found"))
    }

    pub async fn update_user(
        &self,
        principal: &Principal,
        id: UserId,
        update: UserUpdate,
    ) -> Result<UserView> {
        principal.require(&[UserRole::Admin])?;
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(MarketError::validation("Name is required"));
        }
        let mut user = self.load_user(id).await?;
        user.apply(update);
        self.stores.users.store(user.clone()).await?;
        Ok(user.view())
    }

    /// Soft delete: the account stays for order history but can no longer sign in.
    pub async fn deactivate_user(&self, principal: &Principal, id: UserId) -> Result<()> {
        principal.require(&[UserRole::Admin])?;
        if id == principal.id() {
            return Err(MarketError::validation("You cannot deactivate your own account"));
        }
        let mut user = self.load_user(id).await?;
        user.apply(UserUpdate {
            is_active: Some(false),
            ..Default::default()
        });
        self.stores.users.store(user).await?;
        info!(user_id = %id, "deactivated user");
        Ok(())
    }

    async fn directory(&self, users: Vec<User>) -> Result<Vec<UserDirectoryEntry>> {
        let mut orders: HashMap<UserId, usize> = HashMap::new();
        for order in self.stores.orders.get_all().await? {
            *orders.entry(order.user_id).or_default() += 1;
        }
        let mut products: HashMap<UserId, usize> = HashMap::new();
        for product in self.stores.products.get_all().await? {
            *products.entry(product.supplier_id).or_default() += 1;
        }

        Ok(users
            .into_iter()
            .map(|user| UserDirectoryEntry {
                order_count: orders.get(&user.id).copied().unwrap_or_default(),
                product_count: products.get(&user.id).copied().unwrap_or_default(),
                user: user.view(),
            })
            .collect())
    }
}

fn user_matches(user: &User, needle: &str) -> bool {
    user.name.to_lowercase().contains(needle)
        || user.email.contains(needle)
        || user
            .company
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(needle))
}

/// Midnight UTC on the first day of `now`'s month.
fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::marketplace::testing::{category, draft, marketplace, principal};
    use crate::domain::order::{OrderDraft, OrderLine};
    use rust_decimal_macros::dec;

    #[test]
    fn test_start_of_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 17, 15, 4, 5).unwrap();
        assert_eq!(
            start_of_month(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_approval_flow_unblocks_supplier() {
        let (market, _) = marketplace();
        let admin = principal(&market, UserRole::Admin).await;
        let office = category(&market, "Office").await;
        let mut supplier = principal(&market, UserRole::Supplier).await;
        supplier.user.set_status(UserStatus::Pending);
        market.stores.users.store(supplier.user.clone()).await.unwrap();

        let stats = market.admin_stats(&admin).await.unwrap();
        assert_eq!(stats.pending_approvals, 1);

        assert!(matches!(
            market.admin_user_action(&admin, supplier.id(), "promote").await,
            Err(MarketError::Validation(_))
        ));
        assert!(matches!(
            market
                .admin_user_action(&admin, uuid::Uuid::new_v4(), "approve")
                .await,
            Err(MarketError::NotFound(_))
        ));
        let approved = market
            .admin_user_action(&admin, supplier.id(), "approve")
            .await
            .unwrap();
        assert_eq!(approved.status, UserStatus::Active);

        supplier.user = market.load_user(supplier.id()).await.unwrap();
        assert!(
            market
                .create_product(&supplier, draft(&office, "OK-1", dec!(1), 1))
                .await
                .is_ok()
        );
        assert!(matches!(
            market.admin_stats(&supplier).await,
            Err(MarketError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_stats_count_confirmed_revenue() {
        let (market, _) = marketplace();
        let admin = principal(&market, UserRole::Admin).await;
        let buyer = principal(&market, UserRole::Buyer).await;
        let office = category(&market, "Office").await;
        let product = market
            .create_product(&admin, draft(&office, "REV", dec!(40), 10))
            .await
            .unwrap();
        let place = |quantity| OrderDraft {
            items: vec![OrderLine {
                product_id: product.product.id,
                quantity,
            }],
            shipping_address: "Kano".into(),
            notes: None,
        };
        let paid = market.place_order(&buyer, place(2)).await.unwrap();
        market.place_order(&buyer, place(1)).await.unwrap();
        market
            .admin_order_action(&admin, paid.order.id, "approve")
            .await
            .unwrap();

        let stats = market.admin_stats(&admin).await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.monthly_revenue, Money::new(dec!(80)));
    }

    #[tokio::test]
    async fn test_directory_search_update_and_deactivate() {
        let (market, _) = marketplace();
        let admin = principal(&market, UserRole::Admin).await;
        let mut buyer = principal(&market, UserRole::Buyer).await;
        buyer.user.company = Some("Lagoon Hospital".into());
        market.stores.users.store(buyer.user.clone()).await.unwrap();

        let query = UserQuery {
            role: None,
            search: Some("lagoon".into()),
        };
        let found = market
            .list_users(&admin, &query, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].user.id, buyer.id());

        let suppliers = UserQuery {
            role: Some(UserRole::Supplier),
            search: None,
        };
        let none = market
            .list_users(&admin, &suppliers, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(none.pagination.total, 0);

        let updated = market
            .update_user(
                &admin,
                buyer.id(),
                UserUpdate {
                    city: Some("Lagos".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.city.as_deref(), Some("Lagos"));

        assert!(matches!(
            market.deactivate_user(&admin, admin.id()).await,
            Err(MarketError::Validation(_))
        ));
        market.deactivate_user(&admin, buyer.id()).await.unwrap();
        let entry = market.get_user(&admin, buyer.id()).await.unwrap();
        assert!(!entry.user.is_active);
        assert!(matches!(
            market.list_users(&buyer, &UserQuery::default(), PageRequest::default()).await,
            Err(MarketError::Forbidden)
        ));
    }
}
