use crate::{
    db_types::{Plan, ProvisioningConfig},
    traits::StoreError,
};

/// Read access to the hosting catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    /// Fetches the plan with the given id, whether or not it is enabled.
    async fn fetch_plan(&self, plan_id: i64) -> Result<Option<Plan>, StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait ProvisioningConfigStore {
    /// Fetches the panel build parameters for a plan. `None` is a legitimate answer: such plans are sold but
    /// provisioned by hand.
    async fn fetch_provisioning_config(&self, plan_id: i64) -> Result<Option<ProvisioningConfig>, StoreError>;
}
