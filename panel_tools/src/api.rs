use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::PanelConfig,
    data_objects::{first_unassigned, Envelope, ListEnvelope},
    Account,
    Allocation,
    Egg,
    Nest,
    NewAccount,
    NewServer,
    Node,
    PanelApiError,
    Server,
};

#[derive(Clone)]
pub struct PanelApi {
    config: PanelConfig,
    client: Arc<Client>,
}

impl PanelApi {
    pub fn new(config: PanelConfig) -> Result<Self, PanelApiError> {
        config.validate()?;
        let mut headers = HeaderMap::with_capacity(3);
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.reveal()))
            .map_err(|e| PanelApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", auth);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PanelApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/application{path}", self.config.url)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, PanelApiError> {
        let url = self.url(path);
        trace!("🖥️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PanelApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🖥️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| PanelApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| PanelApiError::RestResponseError(e.to_string()))?;
            Err(PanelApiError::from_response(status, &body))
        }
    }

    /// Deletes are the one call where success carries no body. Anything other than 204 is an error.
    pub async fn rest_delete(&self, path: &str) -> Result<(), PanelApiError> {
        let url = self.url(path);
        trace!("🖥️ Sending REST delete: {url}");
        let response =
            self.client.delete(url).send().await.map_err(|e| PanelApiError::RestResponseError(e.to_string()))?;
        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| PanelApiError::RestResponseError(e.to_string()))?;
            Err(PanelApiError::from_response(status, &body))
        }
    }

    //------------------------------------------   Accounts  ------------------------------------------------

    pub async fn list_accounts(&self, email: Option<&str>) -> Result<Vec<Account>, PanelApiError> {
        let params = email.map(|e| vec![("filter[email]", e)]).unwrap_or_default();
        let result = self.rest_query::<ListEnvelope<Account>, ()>(Method::GET, "/users", &params, None).await?;
        Ok(result.into_inner())
    }

    /// The panel's email filter is a substring match, so the result is narrowed to exact (case-insensitive) matches.
    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, PanelApiError> {
        debug!("🖥️ Looking up panel account for {email}");
        let accounts = self.list_accounts(Some(email)).await?;
        Ok(accounts.into_iter().find(|a| a.email.eq_ignore_ascii_case(email)))
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<Account, PanelApiError> {
        debug!("🖥️ Creating panel account {} for {}", account.username, account.email);
        let result = self.rest_query::<Envelope<Account>, _>(Method::POST, "/users", &[], Some(account)).await?;
        info!("🖥️ Created panel account #{} ({})", result.attributes.id, result.attributes.username);
        Ok(result.attributes)
    }

    pub async fn delete_account(&self, account_id: i64) -> Result<(), PanelApiError> {
        self.rest_delete(&format!("/users/{account_id}")).await?;
        info!("🖥️ Deleted panel account #{account_id}");
        Ok(())
    }

    //------------------------------------------   Servers  ------------------------------------------------

    pub async fn list_servers(&self) -> Result<Vec<Server>, PanelApiError> {
        let result = self.rest_query::<ListEnvelope<Server>, ()>(Method::GET, "/servers", &[], None).await?;
        Ok(result.into_inner())
    }

    pub async fn create_server(&self, server: &NewServer) -> Result<Server, PanelApiError> {
        debug!("🖥️ Creating panel server '{}' for account #{}", server.name, server.user);
        let result = self.rest_query::<Envelope<Server>, _>(Method::POST, "/servers", &[], Some(server)).await?;
        info!("🖥️ Created panel server #{} ({})", result.attributes.id, result.attributes.identifier);
        Ok(result.attributes)
    }

    pub async fn delete_server(&self, server_id: i64) -> Result<(), PanelApiError> {
        self.rest_delete(&format!("/servers/{server_id}")).await?;
        info!("🖥️ Deleted panel server #{server_id}");
        Ok(())
    }

    //------------------------------------------   Infrastructure  ------------------------------------------------

    pub async fn list_nodes(&self) -> Result<Vec<Node>, PanelApiError> {
        let result = self.rest_query::<ListEnvelope<Node>, ()>(Method::GET, "/nodes", &[], None).await?;
        Ok(result.into_inner())
    }

    pub async fn list_nests(&self) -> Result<Vec<Nest>, PanelApiError> {
        let result = self.rest_query::<ListEnvelope<Nest>, ()>(Method::GET, "/nests", &[], None).await?;
        Ok(result.into_inner())
    }

    /// Lists the eggs of a nest, including each egg's variables.
    pub async fn list_eggs(&self, nest_id: i64) -> Result<Vec<Egg>, PanelApiError> {
        let path = format!("/nests/{nest_id}/eggs");
        let params = [("include", "variables")];
        let result = self.rest_query::<ListEnvelope<Egg>, ()>(Method::GET, &path, &params, None).await?;
        Ok(result.into_inner())
    }

    pub async fn list_allocations(&self, node_id: i64) -> Result<Vec<Allocation>, PanelApiError> {
        let path = format!("/nodes/{node_id}/allocations");
        let params = [("per_page", "100")];
        let result = self.rest_query::<ListEnvelope<Allocation>, ()>(Method::GET, &path, &params, None).await?;
        Ok(result.into_inner())
    }

    /// Returns the first unassigned allocation among the node's first 100, if there is one.
    ///
    /// Nothing is reserved. Another flow may take the same allocation before the server is created, in which case
    /// the panel rejects the create call.
    pub async fn find_free_allocation(&self, node_id: i64) -> Result<Option<Allocation>, PanelApiError> {
        let allocations = self.list_allocations(node_id).await?;
        let total = allocations.len();
        let free = first_unassigned(allocations);
        match &free {
            Some(a) => debug!("🖥️ Selected allocation #{} ({}) on node #{node_id}", a.id, a.address()),
            None => warn!("🖥️ All {total} allocations on node #{node_id} are assigned"),
        }
        Ok(free)
    }
}
