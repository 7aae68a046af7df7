//! DNS record reconciliation
//!
//! Keeps exactly one unproxied A record per server name pointing at the
//! server's primary IP.

use crate::config::Settings;
use crate::error::{CloudVpnError, ConsistencyError, Result};
use crate::provider::{DnsApi, DnsRecord, RecordParams};
use crate::vps::ProvisionedServer;

/// TTL applied to created and updated records
pub const RECORD_TTL: u32 = 60;

/// Point the server's DNS name at its primary IP
///
/// Updates the existing record when there is one, otherwise creates it.
pub async fn configure(
    dns: &dyn DnsApi,
    settings: &Settings,
    server: &ProvisionedServer,
) -> Result<()> {
    let fqdn = &settings.server.fqdn;
    let zone_id = zone_id(dns, &settings.cloudflare.zone).await?;
    let existing = find_record(dns, &settings.cloudflare.zone, &zone_id, fqdn).await?;

    let params = RecordParams {
        record_type: "A".to_string(),
        name: fqdn.clone(),
        content: server.ip.clone(),
        ttl: RECORD_TTL,
        proxied: false,
    };

    let result = match existing {
        Some(record) => {
            tracing::debug!("Updating record {} for {}", record.id, fqdn);
            dns.update_record(&zone_id, &record.id, &params).await
        }
        None => {
            tracing::debug!("Creating record for {}", fqdn);
            dns.create_record(&zone_id, &params).await
        }
    };

    result.map_err(CloudVpnError::dns("set dns record"))?;
    Ok(())
}

/// Current content of the record for `fqdn`
pub async fn retrieve(dns: &dyn DnsApi, settings: &Settings, fqdn: &str) -> Result<String> {
    let zone_id = zone_id(dns, &settings.cloudflare.zone).await?;

    find_record(dns, &settings.cloudflare.zone, &zone_id, fqdn)
        .await?
        .map(|record| record.content)
        .ok_or_else(|| {
            ConsistencyError::RecordNotFound {
                name: fqdn.to_string(),
            }
            .into()
        })
}

/// True when the record for `fqdn` exists and holds exactly `ip`
///
/// Lookup failures count as out of sync.
pub async fn in_sync(dns: &dyn DnsApi, settings: &Settings, fqdn: &str, ip: &str) -> bool {
    match retrieve(dns, settings, fqdn).await {
        Ok(content) => content == ip,
        Err(e) => {
            tracing::debug!("DNS lookup for {} failed: {}", fqdn, e);
            false
        }
    }
}

async fn zone_id(dns: &dyn DnsApi, zone: &str) -> Result<String> {
    let zones = dns
        .list_zones(zone)
        .await
        .map_err(CloudVpnError::dns("list dns zones"))?;

    zones
        .into_iter()
        .find(|z| z.name.eq_ignore_ascii_case(zone))
        .map(|z| z.id)
        .ok_or_else(|| {
            ConsistencyError::ZoneNotFound {
                zone: zone.to_string(),
            }
            .into()
        })
}

async fn find_record(
    dns: &dyn DnsApi,
    zone: &str,
    zone_id: &str,
    fqdn: &str,
) -> Result<Option<DnsRecord>> {
    let records = dns
        .list_records(zone_id, fqdn)
        .await
        .map_err(CloudVpnError::dns(format!("list dns records for {}", zone)))?;

    Ok(records
        .into_iter()
        .find(|record| record.name.eq_ignore_ascii_case(fqdn)))
}
