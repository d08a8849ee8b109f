//! The cloud API boundary.
//!
//! [`CloudApi`] is the full surface this crate consumes from the cloud
//! backend: list operations returning `(items, optional cursor)`,
//! get-by-id reads, and mutating calls that hand back a work-request id.
//! Everything above it ([`crate::client::CloudClient`] and the resolver,
//! pager and awaiter components) is written against this trait, so tests
//! substitute a programmable implementation and production code uses the
//! HTTP-backed [`crate::http::HttpCloudApi`].

use async_trait::async_trait;

use crate::error::Result;
use crate::page::{Page, PageToken};
use crate::types::{
    AvailabilityDomain, BackendSet, BackendSetSpec, CompartmentId, Instance, ListenerSpec,
    LoadBalancer, LoadBalancerSpec, SecurityList, SecurityListUpdate, Subnet, Vnic,
    VnicAttachment, WorkRequest,
};

/// Server-side filters for instance listing.
#[derive(Debug, Clone, Default)]
pub struct InstanceFilter {
    /// Exact display-name match.
    pub display_name: Option<String>,
}

/// Server-side filters for vnic-attachment listing.
#[derive(Debug, Clone, Default)]
pub struct VnicAttachmentFilter {
    /// Restrict to attachments of one instance.
    pub instance_id: Option<String>,
}

/// Operations this crate requires from the cloud backend.
///
/// All calls are one-shot request/response; retry and polling policy live
/// in the layers above. Mutating calls return the id of the work request
/// driving the change, except deletes of sub-resources which the backend
/// also tracks via work requests.
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// List availability domains. Used only as a connectivity probe.
    async fn list_availability_domains(
        &self,
        compartment: &CompartmentId,
    ) -> Result<Vec<AvailabilityDomain>>;

    async fn list_instances(
        &self,
        compartment: &CompartmentId,
        filter: InstanceFilter,
        page: Option<PageToken>,
    ) -> Result<Page<Instance>>;

    async fn get_instance(&self, id: &str) -> Result<Instance>;

    async fn list_vnic_attachments(
        &self,
        compartment: &CompartmentId,
        filter: VnicAttachmentFilter,
        page: Option<PageToken>,
    ) -> Result<Page<VnicAttachment>>;

    async fn get_vnic(&self, id: &str) -> Result<Vnic>;

    async fn get_subnet(&self, id: &str) -> Result<Subnet>;

    async fn get_security_list(&self, id: &str) -> Result<SecurityList>;

    async fn update_security_list(
        &self,
        id: &str,
        update: &SecurityListUpdate,
    ) -> Result<SecurityList>;

    async fn get_work_request(&self, id: &str) -> Result<WorkRequest>;

    async fn list_load_balancers(
        &self,
        compartment: &CompartmentId,
        page: Option<PageToken>,
    ) -> Result<Page<LoadBalancer>>;

    async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer>;

    /// Returns the work-request id driving the creation.
    async fn create_load_balancer(
        &self,
        compartment: &CompartmentId,
        spec: &LoadBalancerSpec,
    ) -> Result<String>;

    async fn delete_load_balancer(&self, id: &str) -> Result<String>;

    async fn get_backend_set(&self, load_balancer_id: &str, name: &str) -> Result<BackendSet>;

    async fn create_backend_set(
        &self,
        load_balancer_id: &str,
        spec: &BackendSetSpec,
    ) -> Result<String>;

    async fn delete_backend_set(&self, load_balancer_id: &str, name: &str) -> Result<String>;

    async fn create_listener(&self, load_balancer_id: &str, spec: &ListenerSpec)
        -> Result<String>;

    async fn delete_listener(&self, load_balancer_id: &str, name: &str) -> Result<String>;

    async fn create_backend(
        &self,
        load_balancer_id: &str,
        backend_set_name: &str,
        ip_address: &str,
        port: u16,
    ) -> Result<String>;

    async fn delete_backend(
        &self,
        load_balancer_id: &str,
        backend_set_name: &str,
        backend_name: &str,
    ) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Programmable in-memory backend for unit tests.
    //!
    //! List endpoints serve their configured pages in order, one page per
    //! call, ignoring filters; tests stage pages that already reflect the
    //! filter they exercise. Call counters let tests assert which paths
    //! were taken.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::Error;
    use crate::types::WorkRequestState;

    #[derive(Default)]
    pub struct MockApi {
        pub instance_pages: Mutex<Vec<Page<Instance>>>,
        pub attachment_pages: Mutex<Vec<Page<VnicAttachment>>>,
        pub load_balancer_pages: Mutex<Vec<Page<LoadBalancer>>>,
        pub instances: Mutex<HashMap<String, Instance>>,
        pub vnics: Mutex<HashMap<String, Vnic>>,
        pub subnets: Mutex<HashMap<String, Subnet>>,
        pub security_lists: Mutex<HashMap<String, SecurityList>>,
        pub load_balancers: Mutex<HashMap<String, LoadBalancer>>,
        pub backend_sets: Mutex<HashMap<(String, String), BackendSet>>,
        /// Work-request snapshots served per poll; the last entry repeats.
        pub work_requests: Mutex<Vec<WorkRequest>>,
        /// Id returned from create/delete calls.
        pub work_request_id: Mutex<String>,
        pub list_instances_calls: AtomicUsize,
        pub list_attachments_calls: AtomicUsize,
        pub get_vnic_calls: AtomicUsize,
        pub get_instance_calls: AtomicUsize,
        pub get_subnet_calls: AtomicUsize,
        pub get_work_request_calls: AtomicUsize,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self {
                work_request_id: Mutex::new("wr-1".to_string()),
                ..Self::default()
            }
        }

        pub fn push_instance_page(&self, page: Page<Instance>) {
            self.instance_pages.lock().unwrap().push(page);
        }

        pub fn push_attachment_page(&self, page: Page<VnicAttachment>) {
            self.attachment_pages.lock().unwrap().push(page);
        }

        pub fn push_work_request(&self, state: WorkRequestState, message: Option<&str>) {
            self.work_requests.lock().unwrap().push(WorkRequest {
                id: self.work_request_id.lock().unwrap().clone(),
                state,
                message: message.map(str::to_string),
                load_balancer_id: None,
            });
        }

        fn next_page<T>(pages: &Mutex<Vec<Page<T>>>) -> Page<T> {
            let mut pages = pages.lock().unwrap();
            if pages.is_empty() {
                Page::empty()
            } else {
                pages.remove(0)
            }
        }

        fn lookup<T: Clone>(
            map: &Mutex<HashMap<String, T>>,
            resource: &'static str,
            id: &str,
        ) -> Result<T> {
            map.lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    resource,
                    query: id.to_string(),
                })
        }
    }

    #[async_trait]
    impl CloudApi for MockApi {
        async fn list_availability_domains(
            &self,
            _compartment: &CompartmentId,
        ) -> Result<Vec<AvailabilityDomain>> {
            Ok(vec![AvailabilityDomain {
                name: "AD-1".to_string(),
            }])
        }

        async fn list_instances(
            &self,
            _compartment: &CompartmentId,
            _filter: InstanceFilter,
            _page: Option<PageToken>,
        ) -> Result<Page<Instance>> {
            self.list_instances_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::next_page(&self.instance_pages))
        }

        async fn get_instance(&self, id: &str) -> Result<Instance> {
            self.get_instance_calls.fetch_add(1, Ordering::SeqCst);
            Self::lookup(&self.instances, "instance", id)
        }

        async fn list_vnic_attachments(
            &self,
            _compartment: &CompartmentId,
            _filter: VnicAttachmentFilter,
            _page: Option<PageToken>,
        ) -> Result<Page<VnicAttachment>> {
            self.list_attachments_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::next_page(&self.attachment_pages))
        }

        async fn get_vnic(&self, id: &str) -> Result<Vnic> {
            self.get_vnic_calls.fetch_add(1, Ordering::SeqCst);
            Self::lookup(&self.vnics, "vnic", id)
        }

        async fn get_subnet(&self, id: &str) -> Result<Subnet> {
            self.get_subnet_calls.fetch_add(1, Ordering::SeqCst);
            Self::lookup(&self.subnets, "subnet", id)
        }

        async fn get_security_list(&self, id: &str) -> Result<SecurityList> {
            Self::lookup(&self.security_lists, "security list", id)
        }

        async fn update_security_list(
            &self,
            id: &str,
            update: &SecurityListUpdate,
        ) -> Result<SecurityList> {
            let mut list = Self::lookup(&self.security_lists, "security list", id)?;
            list.ingress_security_rules = update.ingress_security_rules.clone();
            list.egress_security_rules = update.egress_security_rules.clone();
            self.security_lists
                .lock()
                .unwrap()
                .insert(id.to_string(), list.clone());
            Ok(list)
        }

        async fn get_work_request(&self, id: &str) -> Result<WorkRequest> {
            self.get_work_request_calls.fetch_add(1, Ordering::SeqCst);
            let mut seq = self.work_requests.lock().unwrap();
            if seq.len() > 1 {
                Ok(seq.remove(0))
            } else {
                seq.first().cloned().ok_or_else(|| Error::NotFound {
                    resource: "work request",
                    query: id.to_string(),
                })
            }
        }

        async fn list_load_balancers(
            &self,
            _compartment: &CompartmentId,
            _page: Option<PageToken>,
        ) -> Result<Page<LoadBalancer>> {
            Ok(Self::next_page(&self.load_balancer_pages))
        }

        async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer> {
            Self::lookup(&self.load_balancers, "load balancer", id)
        }

        async fn create_load_balancer(
            &self,
            _compartment: &CompartmentId,
            _spec: &LoadBalancerSpec,
        ) -> Result<String> {
            Ok(self.work_request_id.lock().unwrap().clone())
        }

        async fn delete_load_balancer(&self, _id: &str) -> Result<String> {
            Ok(self.work_request_id.lock().unwrap().clone())
        }

        async fn get_backend_set(
            &self,
            load_balancer_id: &str,
            name: &str,
        ) -> Result<BackendSet> {
            self.backend_sets
                .lock()
                .unwrap()
                .get(&(load_balancer_id.to_string(), name.to_string()))
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    resource: "backend set",
                    query: name.to_string(),
                })
        }

        async fn create_backend_set(
            &self,
            _load_balancer_id: &str,
            _spec: &BackendSetSpec,
        ) -> Result<String> {
            Ok(self.work_request_id.lock().unwrap().clone())
        }

        async fn delete_backend_set(
            &self,
            _load_balancer_id: &str,
            _name: &str,
        ) -> Result<String> {
            Ok(self.work_request_id.lock().unwrap().clone())
        }

        async fn create_listener(
            &self,
            _load_balancer_id: &str,
            _spec: &ListenerSpec,
        ) -> Result<String> {
            Ok(self.work_request_id.lock().unwrap().clone())
        }

        async fn delete_listener(&self, _load_balancer_id: &str, _name: &str) -> Result<String> {
            Ok(self.work_request_id.lock().unwrap().clone())
        }

        async fn create_backend(
            &self,
            _load_balancer_id: &str,
            _backend_set_name: &str,
            _ip_address: &str,
            _port: u16,
        ) -> Result<String> {
            Ok(self.work_request_id.lock().unwrap().clone())
        }

        async fn delete_backend(
            &self,
            _load_balancer_id: &str,
            _backend_set_name: &str,
            _backend_name: &str,
        ) -> Result<String> {
            Ok(self.work_request_id.lock().unwrap().clone())
        }
    }
}
