use chrono::{DateTime, Utc};
use mockall::mock;
use provisioning_engine::{
    db_types::{
        ActivatedServer,
        NewOrder,
        NewUserServer,
        Order,
        OrderStatusType,
        Plan,
        ProvisioningConfig,
        ServerStatus,
        UserServer,
    },
    traits::{
        CaptureReceipt,
        CatalogStore,
        InstanceSpec,
        NewPanelAccount,
        OrderManagement,
        PanelAccount,
        PanelAllocation,
        PanelInstance,
        PayableOrder,
        PayableOrderCreated,
        PaymentGateway,
        PaymentGatewayError,
        ProvisioningConfigStore,
        ProvisioningGateway,
        ProvisioningGatewayError,
        ServerManagement,
        StoreError,
    },
};

mock! {
    pub Store {}
    impl CatalogStore for Store {
        async fn fetch_plan(&self, plan_id: i64) -> Result<Option<Plan>, StoreError>;
    }
    impl ProvisioningConfigStore for Store {
        async fn fetch_provisioning_config(&self, plan_id: i64) -> Result<Option<ProvisioningConfig>, StoreError>;
    }
    impl OrderManagement for Store {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, StoreError>;
        async fn fetch_order_for_user(&self, gateway_order_id: &str, user_id: &str) -> Result<Option<Order>, StoreError>;
        async fn mark_order_paid(&self, order_id: i64, capture_id: Option<String>) -> Result<Option<Order>, StoreError>;
        async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, StoreError>;
        async fn link_order_to_server(&self, order_id: i64, user_server_id: i64) -> Result<Order, StoreError>;
        async fn fetch_latest_order_for_server(&self, user_server_id: i64) -> Result<Option<Order>, StoreError>;
    }
    impl ServerManagement for Store {
        async fn insert_user_server(&self, server: NewUserServer) -> Result<UserServer, StoreError>;
        async fn fetch_user_server(&self, id: i64) -> Result<Option<UserServer>, StoreError>;
        async fn fetch_latest_pending_server(&self, user_id: &str, plan_id: i64) -> Result<Option<UserServer>, StoreError>;
        async fn fetch_servers_for_user(&self, user_id: &str) -> Result<Vec<UserServer>, StoreError>;
        async fn update_server_status(&self, id: i64, status: ServerStatus) -> Result<UserServer, StoreError>;
        async fn start_provisioning(&self, id: i64) -> Result<bool, StoreError>;
        async fn activate_server(&self, id: i64, activation: ActivatedServer) -> Result<UserServer, StoreError>;
        async fn extend_server_expiry(&self, id: i64, expires_at: DateTime<Utc>) -> Result<UserServer, StoreError>;
    }
}

mock! {
    pub Payments {}
    impl PaymentGateway for Payments {
        async fn create_payable_order(&self, order: PayableOrder) -> Result<PayableOrderCreated, PaymentGatewayError>;
        async fn capture_order(&self, gateway_order_id: &str) -> Result<CaptureReceipt, PaymentGatewayError>;
        async fn fetch_capture(&self, gateway_order_id: &str) -> Result<CaptureReceipt, PaymentGatewayError>;
    }
}

mock! {
    pub Panel {}
    impl ProvisioningGateway for Panel {
        async fn find_account_by_email(&self, email: &str) -> Result<Option<PanelAccount>, ProvisioningGatewayError>;
        async fn create_account(&self, account: NewPanelAccount) -> Result<PanelAccount, ProvisioningGatewayError>;
        async fn find_free_allocation(&self, node_id: i64) -> Result<Option<PanelAllocation>, ProvisioningGatewayError>;
        async fn create_instance(&self, spec: InstanceSpec) -> Result<PanelInstance, ProvisioningGatewayError>;
        fn server_url(&self, identifier: &str) -> String;
    }
}
