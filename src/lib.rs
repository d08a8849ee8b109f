//! # cloudnode
//!
//! Resilient client layer over a cloud infrastructure API, used by an
//! orchestration control plane to map compute nodes to cloud instances
//! and to provision load-balancing resources.
//!
//! The per-call wrappers are thin; the substance is three cross-cutting
//! concerns:
//!
//! - **Instance resolution** ([`resolver::InstanceResolver`]): a node
//!   name is matched against instance display names first, then against
//!   vnic public IPs and hostname labels via a full compartment scan.
//! - **Work-request polling** ([`workrequest::WorkRequestAwaiter`]):
//!   asynchronous cloud mutations are driven to a terminal state with
//!   bounded exponential backoff.
//! - **Pagination** ([`page`]): list endpoints are iterated to
//!   completion with cursor feedback, with a repeated cursor treated as a
//!   fatal protocol violation.
//!
//! All operations run on the caller's task against an immutable
//! compartment scope; there is no background scheduler and no shared
//! mutable cache. The transport is the [`api::CloudApi`] trait, with an
//! HTTP implementation in [`http`] and everything above it testable
//! against an in-memory backend.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cloudnode::{ApiConfig, CloudClient, CompartmentId, HttpCloudApi};
//!
//! # async fn run() -> cloudnode::Result<()> {
//! let api = Arc::new(HttpCloudApi::new(ApiConfig::from_env()?)?);
//! let client = CloudClient::new(api, CompartmentId::from("ocid1.compartment.oc1..a"));
//! client.validate().await?;
//!
//! let instance = client.instance_by_node_name("worker-1").await?;
//! let addresses = client.node_addresses(&instance.id).await?;
//! # let _ = addresses;
//! # Ok(())
//! # }
//! ```

pub mod addresses;
pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod page;
pub mod resolver;
pub mod subnets;
pub mod types;
pub mod workrequest;

pub use addresses::{AddressKind, NodeAddress};
pub use api::{CloudApi, InstanceFilter, VnicAttachmentFilter};
pub use client::CloudClient;
pub use error::{Error, Result};
pub use http::{ApiConfig, HttpCloudApi};
pub use page::{Page, PageToken};
pub use resolver::InstanceResolver;
pub use types::{
    AttachmentState, AvailabilityDomain, Backend, BackendSet, BackendSetSpec, CompartmentId,
    Instance, InstanceState, ListenerSpec, LoadBalancer, LoadBalancerSpec, SecurityList,
    SecurityListUpdate, Subnet, Vnic, VnicAttachment, VnicState, WorkRequest, WorkRequestState,
    DEFAULT_LOAD_BALANCER_POLICY,
};
pub use workrequest::{PollPolicy, WorkRequestAwaiter};
