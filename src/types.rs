//! Wire types for the cloud compute and load-balancer APIs.
//!
//! Everything here is a read-only snapshot of backend state. Lifecycle
//! enums carry an `Unknown` catch-all so a new backend state deserializes
//! instead of failing the whole response; every filter in this crate
//! treats `Unknown` as non-matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Load-balancing policy used when a backend-set spec does not name one.
pub const DEFAULT_LOAD_BALANCER_POLICY: &str = "ROUND_ROBIN";

/// Compartment scope for list operations.
///
/// A client handle is bound to exactly one compartment at construction;
/// there is no mutable "active compartment" state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompartmentId(String);

impl CompartmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CompartmentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Lifecycle state of a compute instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    Provisioning,
    Running,
    Starting,
    Stopping,
    Stopped,
    Terminating,
    Terminated,
    #[serde(other)]
    Unknown,
}

/// A compute instance. Identity is the OCID; the display name is neither
/// unique nor stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub display_name: String,
    pub compartment_id: String,
    pub lifecycle_state: InstanceState,
    #[serde(default)]
    pub availability_domain: Option<String>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
}

/// Lifecycle state of a vnic attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentState {
    Attaching,
    Attached,
    Detaching,
    Detached,
    #[serde(other)]
    Unknown,
}

/// Relation between an instance and a vnic. Only `Attached` attachments
/// are considered live; `vnic_id` may be absent while still attaching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnicAttachment {
    pub id: String,
    pub instance_id: String,
    #[serde(default)]
    pub vnic_id: Option<String>,
    pub lifecycle_state: AttachmentState,
}

/// Lifecycle state of a vnic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VnicState {
    Provisioning,
    Available,
    Terminating,
    Terminated,
    #[serde(other)]
    Unknown,
}

/// A virtual network interface. Blank IP strings are treated the same as
/// absent fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vnic {
    pub id: String,
    pub subnet_id: String,
    pub lifecycle_state: VnicState,
    #[serde(default)]
    pub hostname_label: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
}

/// A network partition owning one or more security lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub cidr_block: Option<String>,
    #[serde(default)]
    pub security_list_ids: Vec<String>,
}

/// A security list attached to a subnet. Rule bodies are passed through
/// opaquely; this client never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityList {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub time_created: DateTime<Utc>,
    #[serde(default)]
    pub ingress_security_rules: Vec<Value>,
    #[serde(default)]
    pub egress_security_rules: Vec<Value>,
}

/// Replacement rule sets for a security list update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityListUpdate {
    pub ingress_security_rules: Vec<Value>,
    pub egress_security_rules: Vec<Value>,
}

/// State of an asynchronous cloud mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkRequestState {
    Accepted,
    InProgress,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl WorkRequestState {
    /// True if no further state transitions will occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkRequestState::Succeeded | WorkRequestState::Failed)
    }
}

/// Handle to an asynchronous cloud mutation. The only entity in this
/// crate whose state is observed to change between reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    pub id: String,
    #[serde(rename = "lifecycleState")]
    pub state: WorkRequestState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub load_balancer_id: Option<String>,
}

/// A provisioned load balancer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub shape_name: Option<String>,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
}

/// A backend server within a backend set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backend {
    #[serde(default)]
    pub name: Option<String>,
    pub ip_address: String,
    pub port: u16,
    #[serde(default)]
    pub weight: Option<u32>,
}

/// A named set of backends with a balancing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendSet {
    pub name: String,
    pub policy: String,
    #[serde(default)]
    pub backends: Vec<Backend>,
    #[serde(default)]
    pub health_checker: Option<Value>,
}

/// Parameters for creating a load balancer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    pub display_name: String,
    pub shape_name: String,
    pub subnet_ids: Vec<String>,
}

/// Parameters for creating a backend set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendSetSpec {
    pub name: String,
    pub policy: String,
    pub backends: Vec<Backend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_checker: Option<Value>,
}

impl BackendSetSpec {
    /// Backend-set spec with the default balancing policy.
    pub fn new(name: impl Into<String>, backends: Vec<Backend>) -> Self {
        Self {
            name: name.into(),
            policy: DEFAULT_LOAD_BALANCER_POLICY.to_string(),
            backends,
            health_checker: None,
        }
    }
}

/// Parameters for creating a listener.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerSpec {
    pub name: String,
    pub default_backend_set_name: String,
    pub protocol: String,
    pub port: u16,
}

/// An availability domain, used only by the fail-fast connectivity probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDomain {
    pub name: String,
}
