// IAM role association reconciled against remote warehouse state
//
// Planning is a pure function over the fetched state; only the hosts talk
// to the managed APIs. Invocations recompute from current remote state, so
// redelivery after a failure is safe.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{error, info};

/// The role change implied by one lifecycle event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssociation {
    pub associate: Option<String>,
    pub disassociate: Option<String>,
}

impl RoleAssociation {
    /// Create event: associate the requested role
    pub fn create(role_arn: impl Into<String>) -> Self {
        Self {
            associate: Some(role_arn.into()),
            disassociate: None,
        }
    }

    /// Update event: associate the new role, drop the previous one if known
    pub fn update(role_arn: impl Into<String>, previous_role_arn: Option<String>) -> Self {
        Self {
            associate: Some(role_arn.into()),
            disassociate: previous_role_arn,
        }
    }

    /// Delete event: drop the requested role
    pub fn delete(role_arn: impl Into<String>) -> Self {
        Self {
            associate: None,
            disassociate: Some(role_arn.into()),
        }
    }
}

/// Associated roles plus the default role of a warehouse target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleState {
    pub roles: Vec<String>,
    pub default_role: Option<String>,
}

/// Compute the desired state from the current remote state and the change.
///
/// The disassociated role is removed from the list and, when it was the
/// default, from the default as well. The associated role ends up in the
/// list exactly once. The new default resolves in priority order: the role
/// being associated (when none is set), the surviving current default, or
/// the first remaining associated role.
pub fn plan_role_update(mut current: RoleState, change: &RoleAssociation) -> RoleState {
    if let Some(removed) = &change.disassociate {
        current.roles.retain(|role| role != removed);
        if current.default_role.as_deref() == Some(removed.as_str()) {
            current.default_role = None;
        }
    }
    if let Some(added) = &change.associate {
        if !current.roles.contains(added) {
            current.roles.push(added.clone());
        }
        if current.default_role.is_none() {
            current.default_role = Some(added.clone());
        }
    }
    if current.default_role.is_none() {
        current.default_role = current.roles.first().cloned();
    }
    current
}

/// A warehouse whose role associations can be fetched and updated.
/// `apply` receives both the change and the planned state because the
/// provisioned API takes add/remove deltas while the serverless API takes
/// the whole list.
#[async_trait]
pub trait RoleHost: Send + Sync {
    async fn fetch(&self) -> Result<RoleState>;

    async fn apply(&self, change: &RoleAssociation, desired: &RoleState) -> Result<()>;
}

/// Fetch, plan, apply. Errors are logged and re-thrown; the provider
/// surfaces them and retries the whole event.
pub async fn reconcile_roles(host: &dyn RoleHost, change: &RoleAssociation) -> Result<()> {
    let current = match host.fetch().await {
        Ok(state) => state,
        Err(err) => {
            error!("failed to fetch current role state: {err:#}");
            return Err(err);
        }
    };
    let desired = plan_role_update(current, change);
    info!(
        "updating role associations: roles={:?} default={:?}",
        desired.roles, desired.default_role
    );
    if let Err(err) = host.apply(change, &desired).await {
        error!("failed to apply role associations: {err:#}");
        return Err(err);
    }
    Ok(())
}

/// Role entry of a serverless namespace, rendered by the service as
/// `IamRole(applyStatus=in-sync, iamRoleArn=arn:...)`.
fn parse_namespace_role(raw: &str) -> Result<(String, String)> {
    let inner = raw
        .strip_prefix("IamRole(")
        .and_then(|rest| rest.strip_suffix(')'))
        .with_context(|| format!("invalid IamRole string: {raw}"))?;
    let mut apply_status = None;
    let mut role_arn = None;
    for part in inner.split(", ") {
        if let Some(value) = part.strip_prefix("applyStatus=") {
            apply_status = Some(value.to_string());
        } else if let Some(value) = part.strip_prefix("iamRoleArn=") {
            role_arn = Some(value.to_string());
        }
    }
    match (apply_status, role_arn) {
        (Some(status), Some(arn)) => Ok((status, arn)),
        _ => anyhow::bail!("invalid IamRole string: {raw}"),
    }
}

/// Serverless namespace host. The workgroup resolves to its namespace once
/// at construction; fetch and apply then address the namespace directly.
pub struct ServerlessRoleHost {
    client: aws_sdk_redshiftserverless::Client,
    namespace_name: String,
}

impl ServerlessRoleHost {
    pub async fn discover(
        client: aws_sdk_redshiftserverless::Client,
        workgroup_name: &str,
    ) -> Result<Self> {
        let output = client
            .get_workgroup()
            .workgroup_name(workgroup_name)
            .send()
            .await?;
        let namespace_name = output
            .workgroup()
            .and_then(|wg| wg.namespace_name())
            .with_context(|| format!("workgroup {workgroup_name} has no namespace"))?
            .to_string();
        Ok(Self {
            client,
            namespace_name,
        })
    }
}

#[async_trait]
impl RoleHost for ServerlessRoleHost {
    async fn fetch(&self) -> Result<RoleState> {
        let output = self
            .client
            .get_namespace()
            .namespace_name(&self.namespace_name)
            .send()
            .await?;
        let namespace = output
            .namespace()
            .with_context(|| format!("namespace {} not found", self.namespace_name))?;

        let mut roles = Vec::new();
        for raw in namespace.iam_roles() {
            let (apply_status, role_arn) = parse_namespace_role(raw)?;
            if apply_status != "removing" {
                roles.push(role_arn);
            }
        }
        let default_role = namespace
            .default_iam_role_arn()
            .filter(|arn| !arn.is_empty())
            .map(str::to_string);
        Ok(RoleState {
            roles,
            default_role,
        })
    }

    async fn apply(&self, _change: &RoleAssociation, desired: &RoleState) -> Result<()> {
        self.client
            .update_namespace()
            .namespace_name(&self.namespace_name)
            .set_iam_roles(Some(desired.roles.clone()))
            .default_iam_role_arn(desired.default_role.clone().unwrap_or_default())
            .send()
            .await?;
        Ok(())
    }
}

/// Provisioned cluster host
pub struct ClusterRoleHost {
    client: aws_sdk_redshift::Client,
    cluster_identifier: String,
}

impl ClusterRoleHost {
    pub fn new(client: aws_sdk_redshift::Client, cluster_identifier: impl Into<String>) -> Self {
        Self {
            client,
            cluster_identifier: cluster_identifier.into(),
        }
    }
}

#[async_trait]
impl RoleHost for ClusterRoleHost {
    async fn fetch(&self) -> Result<RoleState> {
        let output = self
            .client
            .describe_clusters()
            .cluster_identifier(&self.cluster_identifier)
            .send()
            .await?;
        let cluster = output
            .clusters()
            .first()
            .with_context(|| format!("cluster {} not found", self.cluster_identifier))?;

        let roles = cluster
            .iam_roles()
            .iter()
            .filter(|role| role.apply_status() != Some("removing"))
            .filter_map(|role| role.iam_role_arn().map(str::to_string))
            .collect();
        let default_role = cluster
            .default_iam_role_arn()
            .filter(|arn| !arn.is_empty())
            .map(str::to_string);
        Ok(RoleState {
            roles,
            default_role,
        })
    }

    async fn apply(&self, change: &RoleAssociation, desired: &RoleState) -> Result<()> {
        self.client
            .modify_cluster_iam_roles()
            .cluster_identifier(&self.cluster_identifier)
            .set_add_iam_roles(Some(change.associate.iter().cloned().collect()))
            .set_remove_iam_roles(Some(change.disassociate.iter().cloned().collect()))
            .default_iam_role_arn(desired.default_role.clone().unwrap_or_default())
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const ROLE_A: &str = "arn:aws:iam::123456789012:role/role-a";
    const ROLE_B: &str = "arn:aws:iam::123456789012:role/role-b";
    const ROLE_C: &str = "arn:aws:iam::123456789012:role/role-c";

    fn state(roles: &[&str], default_role: Option<&str>) -> RoleState {
        RoleState {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            default_role: default_role.map(str::to_string),
        }
    }

    #[test]
    fn create_associates_and_becomes_default_when_unset() {
        let desired = plan_role_update(state(&[], None), &RoleAssociation::create(ROLE_A));
        assert_eq!(desired.roles, vec![ROLE_A]);
        assert_eq!(desired.default_role.as_deref(), Some(ROLE_A));
    }

    #[test]
    fn existing_default_is_kept() {
        let desired = plan_role_update(
            state(&[ROLE_B], Some(ROLE_B)),
            &RoleAssociation::create(ROLE_A),
        );
        assert_eq!(desired.roles, vec![ROLE_B, ROLE_A]);
        assert_eq!(desired.default_role.as_deref(), Some(ROLE_B));
    }

    #[test]
    fn update_swaps_roles_and_default_follows() {
        let desired = plan_role_update(
            state(&[ROLE_A, ROLE_B], Some(ROLE_A)),
            &RoleAssociation::update(ROLE_C, Some(ROLE_A.to_string())),
        );
        assert!(!desired.roles.contains(&ROLE_A.to_string()));
        assert_eq!(desired.roles, vec![ROLE_B, ROLE_C]);
        // old default was the disassociated role, so the associated role wins
        assert_eq!(desired.default_role.as_deref(), Some(ROLE_C));
    }

    #[test]
    fn delete_falls_back_to_first_remaining_role() {
        let desired = plan_role_update(
            state(&[ROLE_A, ROLE_B], Some(ROLE_A)),
            &RoleAssociation::delete(ROLE_A),
        );
        assert_eq!(desired.roles, vec![ROLE_B]);
        assert_eq!(desired.default_role.as_deref(), Some(ROLE_B));
    }

    #[test]
    fn delete_last_role_clears_default() {
        let desired = plan_role_update(
            state(&[ROLE_A], Some(ROLE_A)),
            &RoleAssociation::delete(ROLE_A),
        );
        assert!(desired.roles.is_empty());
        assert_eq!(desired.default_role, None);
    }

    #[test]
    fn associating_an_already_present_role_keeps_it_unique() {
        let desired = plan_role_update(
            state(&[ROLE_A, ROLE_B], Some(ROLE_B)),
            &RoleAssociation::create(ROLE_A),
        );
        assert_eq!(
            desired.roles.iter().filter(|r| r.as_str() == ROLE_A).count(),
            1
        );
        assert_eq!(desired.default_role.as_deref(), Some(ROLE_B));
    }

    #[test]
    fn namespace_role_strings_parse() {
        let (status, arn) =
            parse_namespace_role(&format!("IamRole(applyStatus=in-sync, iamRoleArn={ROLE_A})"))
                .unwrap();
        assert_eq!(status, "in-sync");
        assert_eq!(arn, ROLE_A);

        assert!(parse_namespace_role("garbage").is_err());
        assert!(parse_namespace_role("IamRole(applyStatus=in-sync)").is_err());
    }

    struct FakeHost {
        current: RoleState,
        applied: Mutex<Option<(RoleAssociation, RoleState)>>,
    }

    #[async_trait]
    impl RoleHost for FakeHost {
        async fn fetch(&self) -> Result<RoleState> {
            Ok(self.current.clone())
        }

        async fn apply(&self, change: &RoleAssociation, desired: &RoleState) -> Result<()> {
            *self.applied.lock().unwrap() = Some((change.clone(), desired.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn reconcile_applies_the_planned_state() {
        let host = FakeHost {
            current: state(&[ROLE_A], Some(ROLE_A)),
            applied: Mutex::new(None),
        };
        let change = RoleAssociation::update(ROLE_B, Some(ROLE_A.to_string()));
        reconcile_roles(&host, &change).await.unwrap();

        let (applied_change, applied_state) = host.applied.lock().unwrap().clone().unwrap();
        assert_eq!(applied_change, change);
        assert_eq!(applied_state.roles, vec![ROLE_B]);
        assert_eq!(applied_state.default_role.as_deref(), Some(ROLE_B));
    }

    struct FailingHost;

    #[async_trait]
    impl RoleHost for FailingHost {
        async fn fetch(&self) -> Result<RoleState> {
            anyhow::bail!("throttled")
        }

        async fn apply(&self, _change: &RoleAssociation, _desired: &RoleState) -> Result<()> {
            unreachable!("apply must not run when fetch fails")
        }
    }

    #[tokio::test]
    async fn fetch_errors_propagate_unchanged() {
        let err = reconcile_roles(&FailingHost, &RoleAssociation::create(ROLE_A))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("throttled"));
    }
}
