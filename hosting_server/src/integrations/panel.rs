use std::collections::HashMap;

use log::*;
use panel_tools::{
    data_objects::AllocationRef,
    Egg,
    FeatureLimits,
    Limits,
    NewAccount,
    NewServer,
    PanelApi,
    PanelApiError,
    PanelConfig,
};
use provisioning_engine::{
    db_types::ProvisioningConfig,
    traits::{
        InstanceSpec,
        NewPanelAccount,
        PanelAccount,
        PanelAllocation,
        PanelInstance,
        ProvisioningGateway,
        ProvisioningGatewayError,
    },
};

const DEFAULT_IO_WEIGHT: i64 = 500;

/// Builds customer servers on the game panel.
#[derive(Clone)]
pub struct PanelGateway {
    api: PanelApi,
}

impl PanelGateway {
    pub fn new(config: PanelConfig) -> Result<Self, PanelApiError> {
        let api = PanelApi::new(config)?;
        Ok(Self { api })
    }

    async fn fetch_egg(&self, nest_id: i64, egg_id: i64) -> Result<Egg, ProvisioningGatewayError> {
        let eggs = self.api.list_eggs(nest_id).await.map_err(gateway_error)?;
        eggs.into_iter().find(|e| e.id == egg_id).ok_or_else(|| ProvisioningGatewayError::Http {
            status: 404,
            message: format!("Egg {egg_id} does not exist in nest {nest_id}"),
        })
    }
}

impl ProvisioningGateway for PanelGateway {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<PanelAccount>, ProvisioningGatewayError> {
        let account = self.api.find_account_by_email(email).await.map_err(gateway_error)?;
        Ok(account.map(|a| PanelAccount { id: a.id, username: a.username, email: a.email }))
    }

    async fn create_account(&self, account: NewPanelAccount) -> Result<PanelAccount, ProvisioningGatewayError> {
        let request = NewAccount {
            email: account.email,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            password: account.password,
        };
        let created = self.api.create_account(&request).await.map_err(gateway_error)?;
        Ok(PanelAccount { id: created.id, username: created.username, email: created.email })
    }

    async fn find_free_allocation(&self, node_id: i64) -> Result<Option<PanelAllocation>, ProvisioningGatewayError> {
        let allocation = self.api.find_free_allocation(node_id).await.map_err(gateway_error)?;
        Ok(allocation.map(|a| PanelAllocation { id: a.id, address: a.address() }))
    }

    async fn create_instance(&self, spec: InstanceSpec) -> Result<PanelInstance, ProvisioningGatewayError> {
        let egg = self.fetch_egg(spec.config.nest_id, spec.config.egg_id).await?;
        let server = new_server_request(&spec, &egg);
        let server = self.api.create_server(&server).await.map_err(gateway_error)?;
        Ok(PanelInstance { id: server.id, identifier: server.identifier })
    }

    fn server_url(&self, identifier: &str) -> String {
        self.api.config().server_url(identifier)
    }
}

/// The panel insists on an image, a startup command and a value for every egg variable. The plan's own settings win;
/// the egg fills in whatever the plan leaves out.
pub fn new_server_request(spec: &InstanceSpec, egg: &Egg) -> NewServer {
    let config: &ProvisioningConfig = &spec.config;
    let mut environment: HashMap<String, String> = egg.default_environment();
    environment.extend(config.environment());
    trace!("🖥️ Launch environment for '{}': {environment:?}", spec.name);
    NewServer {
        name: spec.name.clone(),
        user: spec.panel_user_id,
        egg: config.egg_id,
        docker_image: config.docker_image.clone().unwrap_or_else(|| egg.docker_image.clone()),
        startup: config.startup.clone().unwrap_or_else(|| egg.startup.clone()),
        environment,
        limits: Limits {
            memory: config.memory_mb,
            swap: 0,
            disk: config.disk_mb,
            io: DEFAULT_IO_WEIGHT,
            cpu: config.cpu_percent,
        },
        feature_limits: FeatureLimits {
            databases: config.databases,
            allocations: config.allocations,
            backups: config.backups,
        },
        allocation: AllocationRef { default: spec.allocation_id },
        start_on_completion: true,
    }
}

pub fn gateway_error(e: PanelApiError) -> ProvisioningGatewayError {
    match e {
        PanelApiError::QueryError { status, message } => ProvisioningGatewayError::Http { status, message },
        PanelApiError::RestResponseError(s) | PanelApiError::Initialization(s) => {
            ProvisioningGatewayError::Transport(s)
        },
        PanelApiError::JsonError(s) => ProvisioningGatewayError::MalformedResponse(s),
    }
}
