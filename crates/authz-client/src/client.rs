use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use authz_core::{
    DirectoryStore, Group, GroupList, NewGroup, NewPermission, NewRole, Permission, PermissionList,
    Role, RoleList, RoleUpdate, StoreError, StoreResult,
};

use crate::auth::AccessToken;
use crate::config::ClientConfig;

/// [`DirectoryStore`] over the authorization extension's REST API.
///
/// Every request carries the bearer token it was built with.
pub struct DirectoryClient {
    http: reqwest::Client,
    config: ClientConfig,
    token: AccessToken,
}

impl DirectoryClient {
    pub fn new(config: ClientConfig, token: AccessToken) -> StoreResult<Self> {
        let http = config
            .http_client()
            .map_err(|e| StoreError::transport(e.to_string()))?;
        Ok(Self::with_http_client(config, token, http))
    }

    #[must_use]
    pub fn with_http_client(config: ClientConfig, token: AccessToken, http: reqwest::Client) -> Self {
        Self {
            http,
            config,
            token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.config.endpoint(path);
        debug!(%method, %url, "Store request");
        self.http
            .request(method, url)
            .bearer_auth(self.token.as_str())
            .header("Accept", "application/json")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> StoreResult<T> {
        let resp = self.send(self.request(reqwest::Method::GET, path)).await?;
        decode(resp).await
    }

    async fn send_json<B, T>(&self, method: reqwest::Method, path: &str, body: &B) -> StoreResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(method, path).json(body)).await?;
        decode(resp).await
    }

    async fn send_json_no_content<B>(&self, method: reqwest::Method, path: &str, body: &B) -> StoreResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let resp = self.send(self.request(method, path).json(body)).await?;
        check_status(resp).await.map(|_| ())
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> StoreResult<reqwest::Response> {
        req.send()
            .await
            .map_err(|e| StoreError::transport(e.to_string()))
    }
}

#[async_trait]
impl DirectoryStore for DirectoryClient {
    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        let list: PermissionList = self.get("permissions").await?;
        Ok(list.permissions)
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let list: RoleList = self.get("roles").await?;
        Ok(list.roles)
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let list: GroupList = self.get("groups").await?;
        Ok(list.groups)
    }

    async fn create_permission(&self, permission: &NewPermission) -> StoreResult<Permission> {
        self.send_json(reqwest::Method::POST, "permissions", permission)
            .await
    }

    async fn create_role(&self, role: &NewRole) -> StoreResult<Role> {
        self.send_json(reqwest::Method::POST, "roles", role).await
    }

    async fn create_group(&self, group: &NewGroup) -> StoreResult<Group> {
        self.send_json(reqwest::Method::POST, "groups", group).await
    }

    async fn set_role_permissions(&self, role_id: &str, role: &RoleUpdate) -> StoreResult<()> {
        self.send_json_no_content(reqwest::Method::PUT, &format!("roles/{role_id}"), role)
            .await
    }

    async fn set_group_nesting(&self, group_id: &str, nested_group_ids: &[String]) -> StoreResult<()> {
        self.send_json_no_content(
            reqwest::Method::PATCH,
            &format!("groups/{group_id}/nested"),
            nested_group_ids,
        )
        .await
    }
}

/// Returns the body of a successful response, or the status error.
async fn check_status(resp: reqwest::Response) -> StoreResult<String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| StoreError::transport(format!("Failed to read response body: {e}")))?;
    if !status.is_success() {
        return Err(StoreError::status(status.as_u16(), body));
    }
    Ok(body)
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> StoreResult<T> {
    let body = check_status(resp).await?;
    serde_json::from_str(&body).map_err(|e| StoreError::decode(e.to_string()))
}
