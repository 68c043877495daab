// Addressing for the two warehouse deployment modes

use serde::{Deserialize, Serialize};

/// Serverless workgroup target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerlessProps {
    pub workgroup_name: String,
    pub database_name: String,
}

/// Provisioned cluster target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedProps {
    pub cluster_identifier: String,
    pub db_user: String,
    pub database_name: String,
}

/// Where statements execute: a serverless workgroup or a provisioned
/// cluster, each carrying the database to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarehouseTarget {
    Serverless(ServerlessProps),
    Provisioned(ProvisionedProps),
}

impl WarehouseTarget {
    pub fn database(&self) -> &str {
        match self {
            WarehouseTarget::Serverless(props) => &props.database_name,
            WarehouseTarget::Provisioned(props) => &props.database_name,
        }
    }

    /// Same target connected to a different database. Schema creation
    /// bootstraps through an existing database before the project database
    /// exists.
    pub fn with_database(&self, database_name: &str) -> Self {
        let mut target = self.clone();
        match &mut target {
            WarehouseTarget::Serverless(props) => {
                props.database_name = database_name.to_string();
            }
            WarehouseTarget::Provisioned(props) => {
                props.database_name = database_name.to_string();
            }
        }
        target
    }

    /// `target.database` identity string for log lines
    pub fn identity(&self) -> String {
        match self {
            WarehouseTarget::Serverless(props) => {
                format!("{}.{}", props.workgroup_name, props.database_name)
            }
            WarehouseTarget::Provisioned(props) => {
                format!("{}.{}", props.cluster_identifier, props.database_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serverless() -> WarehouseTarget {
        WarehouseTarget::Serverless(ServerlessProps {
            workgroup_name: "wg-analytics".into(),
            database_name: "proj_1".into(),
        })
    }

    #[test]
    fn identity_strings() {
        assert_eq!(serverless().identity(), "wg-analytics.proj_1");

        let provisioned = WarehouseTarget::Provisioned(ProvisionedProps {
            cluster_identifier: "warehouse-1".into(),
            db_user: "admin".into(),
            database_name: "proj_1".into(),
        });
        assert_eq!(provisioned.identity(), "warehouse-1.proj_1");
    }

    #[test]
    fn with_database_leaves_original_untouched() {
        let original = serverless();
        let bootstrap = original.with_database("dev");
        assert_eq!(bootstrap.database(), "dev");
        assert_eq!(original.database(), "proj_1");
    }
}
