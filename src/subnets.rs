//! Subnet resolution and default security-list selection, supporting
//! security-group reconciliation.

use std::collections::HashSet;

use tracing::debug;

use crate::api::{CloudApi, VnicAttachmentFilter};
use crate::error::{Error, Result};
use crate::page;
use crate::types::{AttachmentState, CompartmentId, SecurityList, Subnet};

/// Fetch the subnets with the given OCIDs, in order.
pub async fn subnets(api: &dyn CloudApi, ids: &[String]) -> Result<Vec<Subnet>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        out.push(api.get_subnet(id).await?);
    }
    Ok(out)
}

/// Return the distinct subnets in which the given internal IPs reside.
///
/// Scans every vnic attachment in the compartment (there is no
/// server-side filter for this query), resolving each touched subnet
/// exactly once, first seen wins. Deduplication is by subnet OCID, not by
/// IP. Empty input or no matches yields an empty result, not an error.
pub async fn subnets_for_internal_ips(
    api: &dyn CloudApi,
    compartment: &CompartmentId,
    ips: &[String],
) -> Result<Vec<Subnet>> {
    let wanted: HashSet<&str> = ips.iter().map(String::as_str).collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }
    debug!(ip_count = wanted.len(), "resolving subnets for internal ips");

    let attachments = page::collect(move |cursor| {
        api.list_vnic_attachments(compartment, VnicAttachmentFilter::default(), cursor)
    })
    .await?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for attachment in attachments {
        if attachment.lifecycle_state != AttachmentState::Attached {
            continue;
        }
        let Some(vnic_id) = attachment.vnic_id.as_deref() else {
            continue;
        };

        let vnic = api.get_vnic(vnic_id).await?;
        let Some(private) = vnic.private_ip.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        if !wanted.contains(private) || seen.contains(vnic.subnet_id.as_str()) {
            continue;
        }

        let subnet = api.get_subnet(&vnic.subnet_id).await?;
        seen.insert(subnet.id.clone());
        out.push(subnet);
    }
    Ok(out)
}

/// Return the default security list of a subnet.
///
/// The default is the oldest one: it is created automatically with the
/// subnet and cannot be deleted, so a subnet with zero security lists is
/// a backend integrity problem, not an empty result.
pub async fn default_security_list(api: &dyn CloudApi, subnet: &Subnet) -> Result<SecurityList> {
    let mut lists = Vec::with_capacity(subnet.security_list_ids.len());
    for id in &subnet.security_list_ids {
        lists.push(api.get_security_list(id).await?);
    }

    lists
        .into_iter()
        .min_by_key(|list| list.time_created)
        .ok_or_else(|| {
            Error::MalformedData(format!("subnet {} has no security lists", subnet.id))
        })
}
