// Issued-certificate listing for HTTPS ingestion endpoints

use anyhow::Result;
use aws_sdk_acm::types::CertificateStatus;
use clickstack_core::paginate::{fetch_all_pages, Page};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub arn: String,
    pub domain: String,
}

/// List every issued certificate in the client's region.
pub async fn list_issued_certificates(
    client: &aws_sdk_acm::Client,
) -> Result<Vec<CertificateInfo>> {
    let summaries = fetch_all_pages(|token: Option<String>| async move {
        let output = client
            .list_certificates()
            .set_next_token(token)
            .certificate_statuses(CertificateStatus::Issued)
            .send()
            .await?;
        Ok::<_, anyhow::Error>(Page::new(
            output.certificate_summary_list().to_vec(),
            output.next_token().map(str::to_string),
        ))
    })
    .await?;

    let certificates: Vec<CertificateInfo> = summaries
        .into_iter()
        .filter_map(|summary| {
            summary.certificate_arn().map(|arn| CertificateInfo {
                arn: arn.to_string(),
                domain: summary.domain_name().unwrap_or_default().to_string(),
            })
        })
        .collect();
    info!("listed {} issued certificates", certificates.len());
    Ok(certificates)
}
