//! The composing client handle.
//!
//! [`CloudClient`] owns a transport handle and an immutable compartment
//! scope, and stitches the resolver, pager and awaiter components into
//! the operations the control plane calls. Concurrent callers can share
//! one client freely; deriving a handle for another compartment creates
//! a new value instead of mutating shared state.

use std::sync::Arc;

use tracing::{debug, info};

use crate::addresses::{self, NodeAddress};
use crate::api::CloudApi;
use crate::error::{Error, Result};
use crate::page;
use crate::resolver::InstanceResolver;
use crate::subnets;
use crate::types::{
    BackendSet, BackendSetSpec, CompartmentId, Instance, ListenerSpec, LoadBalancer,
    LoadBalancerSpec, SecurityList, SecurityListUpdate, Subnet, Vnic, WorkRequest,
};
use crate::workrequest::{PollPolicy, WorkRequestAwaiter};

/// Client for compute and load-balancer operations, bound to one
/// compartment.
#[derive(Clone)]
pub struct CloudClient {
    api: Arc<dyn CloudApi>,
    compartment: CompartmentId,
    poll: PollPolicy,
}

impl CloudClient {
    pub fn new(api: Arc<dyn CloudApi>, compartment: CompartmentId) -> Self {
        Self {
            api,
            compartment,
            poll: PollPolicy::default(),
        }
    }

    /// Replace the work-request poll schedule.
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Derive a client scoped to a different compartment. The original
    /// handle is untouched, so in-flight calls never observe a scope
    /// change.
    pub fn with_compartment(&self, compartment: CompartmentId) -> Self {
        Self {
            api: Arc::clone(&self.api),
            compartment,
            poll: self.poll,
        }
    }

    pub fn compartment(&self) -> &CompartmentId {
        &self.compartment
    }

    /// Fail-fast connectivity probe: one cheap authenticated call.
    pub async fn validate(&self) -> Result<()> {
        self.api
            .list_availability_domains(&self.compartment)
            .await?;
        Ok(())
    }

    /// Fetch an instance by OCID.
    pub async fn instance(&self, id: &str) -> Result<Instance> {
        if id.is_empty() {
            return Err(Error::InvalidArgument(
                "blank instance id passed to instance".to_string(),
            ));
        }
        self.api.get_instance(id).await
    }

    /// Resolve a node name to its running instance. See
    /// [`InstanceResolver`] for the two-stage strategy.
    pub async fn instance_by_node_name(&self, node_name: &str) -> Result<Instance> {
        InstanceResolver::new(self.api.as_ref(), &self.compartment)
            .resolve(node_name)
            .await
    }

    /// The available vnics attached to an instance.
    pub async fn attached_vnics(&self, instance_id: &str) -> Result<Vec<Vnic>> {
        addresses::attached_vnics(self.api.as_ref(), &self.compartment, instance_id).await
    }

    /// Typed node addresses of an instance.
    pub async fn node_addresses(&self, instance_id: &str) -> Result<Vec<NodeAddress>> {
        addresses::node_addresses(self.api.as_ref(), &self.compartment, instance_id).await
    }

    /// Poll a work request to a terminal state under this client's poll
    /// policy. Wrap in `tokio::time::timeout` to impose an outer
    /// deadline.
    pub async fn await_work_request(&self, id: &str) -> Result<WorkRequest> {
        WorkRequestAwaiter::new(self.api.as_ref(), self.poll)
            .await_completion(id)
            .await
    }

    /// Create a load balancer and block until it is materialized.
    ///
    /// The work request does not carry the full resource body, so a
    /// follow-up read fetches the created load balancer.
    pub async fn create_and_await_load_balancer(
        &self,
        spec: LoadBalancerSpec,
    ) -> Result<LoadBalancer> {
        info!(name = %spec.display_name, shape = %spec.shape_name, "creating load balancer");
        let wr_id = self
            .api
            .create_load_balancer(&self.compartment, &spec)
            .await?;

        let wr = self.await_work_request(&wr_id).await?;
        let lb_id = wr.load_balancer_id.ok_or_else(|| {
            Error::MalformedData(format!(
                "work request {} succeeded without a load balancer id",
                wr.id
            ))
        })?;

        self.api.get_load_balancer(&lb_id).await
    }

    /// Fetch a load balancer by its display name, stopping the listing at
    /// the first match.
    pub async fn load_balancer_by_name(&self, name: &str) -> Result<LoadBalancer> {
        let api = self.api.as_ref();
        let compartment = &self.compartment;
        let found = page::find(
            move |cursor| api.list_load_balancers(compartment, cursor),
            |lb: &LoadBalancer| lb.display_name == name,
        )
        .await?;

        found.ok_or_else(|| Error::NotFound {
            resource: "load balancer",
            query: name.to_string(),
        })
    }

    /// Fetch a load balancer by OCID.
    pub async fn load_balancer(&self, id: &str) -> Result<LoadBalancer> {
        self.api.get_load_balancer(id).await
    }

    /// Create a backend set and block until it is materialized.
    pub async fn create_and_await_backend_set(
        &self,
        load_balancer_id: &str,
        spec: BackendSetSpec,
    ) -> Result<BackendSet> {
        info!(load_balancer_id, name = %spec.name, "creating backend set");
        let wr_id = self.api.create_backend_set(load_balancer_id, &spec).await?;
        self.await_work_request(&wr_id).await?;
        self.api.get_backend_set(load_balancer_id, &spec.name).await
    }

    /// Create a listener and block until the backend finishes. The
    /// backend exposes no listener read, so nothing is fetched back.
    pub async fn create_and_await_listener(
        &self,
        load_balancer_id: &str,
        spec: ListenerSpec,
    ) -> Result<()> {
        info!(load_balancer_id, name = %spec.name, "creating listener");
        let wr_id = self.api.create_listener(load_balancer_id, &spec).await?;
        self.await_work_request(&wr_id).await?;
        Ok(())
    }

    /// Fetch the subnets with the given OCIDs, in order.
    pub async fn subnets(&self, ids: &[String]) -> Result<Vec<Subnet>> {
        subnets::subnets(self.api.as_ref(), ids).await
    }

    /// The distinct subnets in which the given internal IPs reside.
    pub async fn subnets_for_internal_ips(&self, ips: &[String]) -> Result<Vec<Subnet>> {
        subnets::subnets_for_internal_ips(self.api.as_ref(), &self.compartment, ips).await
    }

    /// The default (oldest) security list of a subnet.
    pub async fn default_security_list(&self, subnet: &Subnet) -> Result<SecurityList> {
        subnets::default_security_list(self.api.as_ref(), subnet).await
    }

    /// Replace the rule sets of a security list.
    pub async fn update_security_list(
        &self,
        id: &str,
        update: &SecurityListUpdate,
    ) -> Result<SecurityList> {
        info!(security_list_id = %id, "updating security list");
        self.api.update_security_list(id, update).await
    }

    /// Add a backend to a backend set. Returns the driving work-request
    /// id without awaiting it.
    pub async fn create_backend(
        &self,
        load_balancer_id: &str,
        backend_set_name: &str,
        ip_address: &str,
        port: u16,
    ) -> Result<String> {
        debug!(load_balancer_id, backend_set_name, ip_address, port, "creating backend");
        self.api
            .create_backend(load_balancer_id, backend_set_name, ip_address, port)
            .await
    }

    /// Remove a backend. Returns the work-request id without awaiting.
    pub async fn delete_backend(
        &self,
        load_balancer_id: &str,
        backend_set_name: &str,
        backend_name: &str,
    ) -> Result<String> {
        self.api
            .delete_backend(load_balancer_id, backend_set_name, backend_name)
            .await
    }

    /// Remove a backend set. Returns the work-request id without
    /// awaiting.
    pub async fn delete_backend_set(
        &self,
        load_balancer_id: &str,
        name: &str,
    ) -> Result<String> {
        self.api.delete_backend_set(load_balancer_id, name).await
    }

    /// Remove a listener. Returns the work-request id without awaiting.
    pub async fn delete_listener(&self, load_balancer_id: &str, name: &str) -> Result<String> {
        self.api.delete_listener(load_balancer_id, name).await
    }

    /// Remove a load balancer. Returns the work-request id without
    /// awaiting.
    pub async fn delete_load_balancer(&self, id: &str) -> Result<String> {
        info!(load_balancer_id = %id, "deleting load balancer");
        self.api.delete_load_balancer(id).await
    }
}
