//! HTTP-backed implementation of the cloud API.
//!
//! Thin request/response forwarding: build the URL, send with bearer
//! auth, check the status, deserialize. Pagination cursors travel in the
//! `opc-next-page` response header and the `page` query parameter;
//! asynchronous mutations answer with the driving work-request id in the
//! `opc-work-request-id` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::api::{CloudApi, InstanceFilter, VnicAttachmentFilter};
use crate::error::{Error, Result};
use crate::page::{Page, PageToken};
use crate::types::{
    AvailabilityDomain, BackendSet, BackendSetSpec, CompartmentId, Instance, ListenerSpec,
    LoadBalancer, LoadBalancerSpec, SecurityList, SecurityListUpdate, Subnet, Vnic,
    VnicAttachment, WorkRequest,
};

const NEXT_PAGE_HEADER: &str = "opc-next-page";
const WORK_REQUEST_HEADER: &str = "opc-work-request-id";

/// Connection settings for the cloud API endpoint.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    pub endpoint: String,

    /// Bearer token; an empty token sends no Authorization header.
    pub token: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Load connection settings from the environment.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("CLOUD_API_ENDPOINT")
            .map_err(|_| Error::InvalidArgument("CLOUD_API_ENDPOINT not set".to_string()))?;

        let token = std::env::var("CLOUD_API_TOKEN").unwrap_or_default();

        let timeout = std::env::var("CLOUD_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            endpoint,
            token,
            timeout,
        })
    }
}

/// Cloud API over HTTP.
pub struct HttpCloudApi {
    client: reqwest::Client,
    base: String,
    token: String,
}

impl HttpCloudApi {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base, path);
        debug!(method = %method, url = %url, "cloud api call");
        let mut req = self.client.request(method, url);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }
        req
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = Self::check(self.request(Method::GET, path).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        page: Option<PageToken>,
    ) -> Result<Page<T>> {
        let mut req = self.request(Method::GET, path).query(query);
        if let Some(token) = &page {
            req = req.query(&[("page", token.as_str())]);
        }

        let response = Self::check(req.send().await?).await?;
        let next = response
            .headers()
            .get(NEXT_PAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(PageToken::from);
        let items = response.json().await?;

        Ok(Page { items, next })
    }

    /// Extract the work-request id an asynchronous mutation answered
    /// with.
    fn work_request_id(response: &Response) -> Result<String> {
        response
            .headers()
            .get(WORK_REQUEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::MalformedData(format!("response missing {WORK_REQUEST_HEADER} header"))
            })
    }

    async fn send_for_work_request(&self, req: RequestBuilder) -> Result<String> {
        let response = Self::check(req.send().await?).await?;
        Self::work_request_id(&response)
    }
}

#[async_trait]
impl CloudApi for HttpCloudApi {
    async fn list_availability_domains(
        &self,
        compartment: &CompartmentId,
    ) -> Result<Vec<AvailabilityDomain>> {
        let response = Self::check(
            self.request(Method::GET, "/availabilityDomains")
                .query(&[("compartmentId", compartment.as_str())])
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn list_instances(
        &self,
        compartment: &CompartmentId,
        filter: InstanceFilter,
        page: Option<PageToken>,
    ) -> Result<Page<Instance>> {
        let mut query = vec![("compartmentId", compartment.as_str())];
        if let Some(display_name) = filter.display_name.as_deref() {
            query.push(("displayName", display_name));
        }
        self.get_page("/instances", &query, page).await
    }

    async fn get_instance(&self, id: &str) -> Result<Instance> {
        self.get_json(&format!("/instances/{id}")).await
    }

    async fn list_vnic_attachments(
        &self,
        compartment: &CompartmentId,
        filter: VnicAttachmentFilter,
        page: Option<PageToken>,
    ) -> Result<Page<VnicAttachment>> {
        let mut query = vec![("compartmentId", compartment.as_str())];
        if let Some(instance_id) = filter.instance_id.as_deref() {
            query.push(("instanceId", instance_id));
        }
        self.get_page("/vnicAttachments", &query, page).await
    }

    async fn get_vnic(&self, id: &str) -> Result<Vnic> {
        self.get_json(&format!("/vnics/{id}")).await
    }

    async fn get_subnet(&self, id: &str) -> Result<Subnet> {
        self.get_json(&format!("/subnets/{id}")).await
    }

    async fn get_security_list(&self, id: &str) -> Result<SecurityList> {
        self.get_json(&format!("/securityLists/{id}")).await
    }

    async fn update_security_list(
        &self,
        id: &str,
        update: &SecurityListUpdate,
    ) -> Result<SecurityList> {
        let response = Self::check(
            self.request(Method::PUT, &format!("/securityLists/{id}"))
                .json(update)
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn get_work_request(&self, id: &str) -> Result<WorkRequest> {
        self.get_json(&format!("/loadBalancerWorkRequests/{id}")).await
    }

    async fn list_load_balancers(
        &self,
        compartment: &CompartmentId,
        page: Option<PageToken>,
    ) -> Result<Page<LoadBalancer>> {
        self.get_page(
            "/loadBalancers",
            &[("compartmentId", compartment.as_str())],
            page,
        )
        .await
    }

    async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer> {
        self.get_json(&format!("/loadBalancers/{id}")).await
    }

    async fn create_load_balancer(
        &self,
        compartment: &CompartmentId,
        spec: &LoadBalancerSpec,
    ) -> Result<String> {
        let body = json!({
            "compartmentId": compartment.as_str(),
            "displayName": spec.display_name,
            "shapeName": spec.shape_name,
            "subnetIds": spec.subnet_ids,
        });
        self.send_for_work_request(self.request(Method::POST, "/loadBalancers").json(&body))
            .await
    }

    async fn delete_load_balancer(&self, id: &str) -> Result<String> {
        self.send_for_work_request(self.request(Method::DELETE, &format!("/loadBalancers/{id}")))
            .await
    }

    async fn get_backend_set(&self, load_balancer_id: &str, name: &str) -> Result<BackendSet> {
        self.get_json(&format!(
            "/loadBalancers/{load_balancer_id}/backendSets/{name}"
        ))
        .await
    }

    async fn create_backend_set(
        &self,
        load_balancer_id: &str,
        spec: &BackendSetSpec,
    ) -> Result<String> {
        self.send_for_work_request(
            self.request(
                Method::POST,
                &format!("/loadBalancers/{load_balancer_id}/backendSets"),
            )
            .json(spec),
        )
        .await
    }

    async fn delete_backend_set(&self, load_balancer_id: &str, name: &str) -> Result<String> {
        self.send_for_work_request(self.request(
            Method::DELETE,
            &format!("/loadBalancers/{load_balancer_id}/backendSets/{name}"),
        ))
        .await
    }

    async fn create_listener(
        &self,
        load_balancer_id: &str,
        spec: &ListenerSpec,
    ) -> Result<String> {
        self.send_for_work_request(
            self.request(
                Method::POST,
                &format!("/loadBalancers/{load_balancer_id}/listeners"),
            )
            .json(spec),
        )
        .await
    }

    async fn delete_listener(&self, load_balancer_id: &str, name: &str) -> Result<String> {
        self.send_for_work_request(self.request(
            Method::DELETE,
            &format!("/loadBalancers/{load_balancer_id}/listeners/{name}"),
        ))
        .await
    }

    async fn create_backend(
        &self,
        load_balancer_id: &str,
        backend_set_name: &str,
        ip_address: &str,
        port: u16,
    ) -> Result<String> {
        let body = json!({
            "ipAddress": ip_address,
            "port": port,
        });
        self.send_for_work_request(
            self.request(
                Method::POST,
                &format!("/loadBalancers/{load_balancer_id}/backendSets/{backend_set_name}/backends"),
            )
            .json(&body),
        )
        .await
    }

    async fn delete_backend(
        &self,
        load_balancer_id: &str,
        backend_set_name: &str,
        backend_name: &str,
    ) -> Result<String> {
        self.send_for_work_request(self.request(
            Method::DELETE,
            &format!(
                "/loadBalancers/{load_balancer_id}/backendSets/{backend_set_name}/backends/{backend_name}"
            ),
        ))
        .await
    }
}
