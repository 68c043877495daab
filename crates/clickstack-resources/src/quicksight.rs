// BI service lookups: user listing and account subscription state

use anyhow::Result;
use clickstack_core::paginate::{fetch_all_pages, Page};
use tracing::info;

const BI_NAMESPACE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiUser {
    pub user_name: String,
    pub arn: String,
    pub email: String,
    pub role: String,
    pub active: bool,
}

/// List every BI user in the account's default namespace.
pub async fn list_bi_users(
    client: &aws_sdk_quicksight::Client,
    account_id: &str,
) -> Result<Vec<BiUser>> {
    let users = fetch_all_pages(|token: Option<String>| async move {
        let output = client
            .list_users()
            .aws_account_id(account_id)
            .namespace(BI_NAMESPACE)
            .set_next_token(token)
            .send()
            .await?;
        Ok::<_, anyhow::Error>(Page::new(
            output.user_list().to_vec(),
            output.next_token().map(str::to_string),
        ))
    })
    .await?;

    info!("listed {} BI users in namespace {BI_NAMESPACE}", users.len());
    Ok(users
        .into_iter()
        .map(|user| BiUser {
            user_name: user.user_name().unwrap_or_default().to_string(),
            arn: user.arn().unwrap_or_default().to_string(),
            email: user.email().unwrap_or_default().to_string(),
            role: user
                .role()
                .map(|role| role.as_str().to_string())
                .unwrap_or_default(),
            active: user.active(),
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiAccountInfo {
    pub account_name: String,
    pub edition: String,
    pub notification_email: String,
    pub authentication_type: String,
    pub account_subscription_status: String,
}

/// Subscription details; None when the account has never subscribed or the
/// subscription has lapsed.
pub async fn describe_account_subscription(
    client: &aws_sdk_quicksight::Client,
    account_id: &str,
) -> Result<Option<BiAccountInfo>> {
    let output = match client
        .describe_account_subscription()
        .aws_account_id(account_id)
        .send()
        .await
    {
        Ok(output) => output,
        Err(err) => {
            let service_err = err.into_service_error();
            if service_err.is_resource_not_found_exception() {
                return Ok(None);
            }
            return Err(service_err.into());
        }
    };

    let Some(info) = output.account_info() else {
        return Ok(None);
    };
    if info.account_subscription_status() == Some("UNSUBSCRIBED") {
        return Ok(None);
    }
    Ok(Some(BiAccountInfo {
        account_name: info.account_name().unwrap_or_default().to_string(),
        edition: info
            .edition()
            .map(|edition| edition.as_str().to_string())
            .unwrap_or_default(),
        notification_email: info.notification_email().unwrap_or_default().to_string(),
        authentication_type: info.authentication_type().unwrap_or_default().to_string(),
        account_subscription_status: info
            .account_subscription_status()
            .unwrap_or_default()
            .to_string(),
    }))
}

/// True when the account holds an active BI subscription.
pub async fn ping(client: &aws_sdk_quicksight::Client, account_id: &str) -> Result<bool> {
    Ok(describe_account_subscription(client, account_id)
        .await?
        .is_some())
}
