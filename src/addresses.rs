//! Node address extraction from instance vnics.

use std::net::IpAddr;

use tracing::debug;

use crate::api::{CloudApi, VnicAttachmentFilter};
use crate::error::{Error, Result};
use crate::page;
use crate::types::{AttachmentState, CompartmentId, Vnic, VnicState};

/// Whether an address is reachable only inside the VCN or publicly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Internal,
    External,
}

/// A typed network address of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAddress {
    pub kind: AddressKind,
    pub address: IpAddr,
}

/// Enumerate the available vnics attached to an instance.
///
/// Pages through the instance's attachments, keeps only `Attached` ones,
/// fetches each vnic and keeps only `Available` ones, in enumeration
/// order.
pub async fn attached_vnics(
    api: &dyn CloudApi,
    compartment: &CompartmentId,
    instance_id: &str,
) -> Result<Vec<Vnic>> {
    if instance_id.is_empty() {
        return Err(Error::InvalidArgument(
            "blank instance id passed to attached_vnics".to_string(),
        ));
    }

    let filter = VnicAttachmentFilter {
        instance_id: Some(instance_id.to_string()),
    };
    let attachments = page::collect(move |cursor| {
        api.list_vnic_attachments(compartment, filter.clone(), cursor)
    })
    .await?;

    let mut vnics = Vec::new();
    for attachment in attachments {
        if attachment.lifecycle_state != AttachmentState::Attached {
            continue;
        }
        let Some(vnic_id) = attachment.vnic_id.as_deref() else {
            continue;
        };

        let vnic = api.get_vnic(vnic_id).await?;
        if vnic.lifecycle_state == VnicState::Available {
            vnics.push(vnic);
        }
    }
    Ok(vnics)
}

/// Derive the typed addresses of an instance from its available vnics.
///
/// Order follows vnic enumeration order; no further sorting.
pub async fn node_addresses(
    api: &dyn CloudApi,
    compartment: &CompartmentId,
    instance_id: &str,
) -> Result<Vec<NodeAddress>> {
    if instance_id.is_empty() {
        return Err(Error::InvalidArgument(
            "blank instance id passed to node_addresses".to_string(),
        ));
    }
    debug!(instance_id, "extracting node addresses");

    let vnics = attached_vnics(api, compartment, instance_id).await?;

    let mut addresses = Vec::new();
    for vnic in &vnics {
        addresses.extend(addresses_from_vnic(vnic)?);
    }
    debug!(instance_id, count = addresses.len(), "node addresses extracted");
    Ok(addresses)
}

/// Extract up to two address records from one vnic.
///
/// An absent or blank IP field simply produces no record; a present but
/// unparseable one is a hard error, because silently dropping malformed
/// backend data would leave the node with fewer addresses than it has.
pub fn addresses_from_vnic(vnic: &Vnic) -> Result<Vec<NodeAddress>> {
    let mut addresses = Vec::new();

    if let Some(private) = vnic.private_ip.as_deref().filter(|s| !s.is_empty()) {
        let address: IpAddr = private.parse().map_err(|_| {
            Error::MalformedData(format!(
                "vnic {} has invalid private address {private:?}",
                vnic.id
            ))
        })?;
        addresses.push(NodeAddress {
            kind: AddressKind::Internal,
            address,
        });
    }

    if let Some(public) = vnic.public_ip.as_deref().filter(|s| !s.is_empty()) {
        let address: IpAddr = public.parse().map_err(|_| {
            Error::MalformedData(format!(
                "vnic {} has invalid public address {public:?}",
                vnic.id
            ))
        })?;
        addresses.push(NodeAddress {
            kind: AddressKind::External,
            address,
        });
    }

    Ok(addresses)
}
